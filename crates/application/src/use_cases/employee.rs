use tracing::info;

use backoffice_core::Validate;
use backoffice_parties::Employee;

use crate::context::RequestContext;
use crate::error::UseCaseError;
use crate::gateways::EmployeeGateway;
use crate::use_cases::read_failed;

pub const KEY: &str = "employee";
pub const ALREADY_EXISTS: &str = "Employee already exists";

#[derive(Clone)]
pub struct EmployeeUseCase {
    gateway: EmployeeGateway,
}

impl EmployeeUseCase {
    pub fn new(gateway: EmployeeGateway) -> Self {
        Self { gateway }
    }

    pub async fn register(
        &self,
        ctx: &RequestContext,
        employee: Option<Employee>,
        password: &str,
    ) -> Result<bool, UseCaseError> {
        let employee = employee.ok_or(UseCaseError::InvalidArgument("employee"))?;

        match self.gateway.exists(ctx, employee.id_typed(), Some(employee.email())).await {
            Ok(false) => {}
            Ok(true) => {
                ctx.notify(KEY, ALREADY_EXISTS);
                return Ok(false);
            }
            Err(err) => return Ok(read_failed(ctx, KEY, err, false)),
        }

        if let Err(errors) = employee.validate() {
            ctx.notify_violations(&errors);
            return Ok(false);
        }

        if self.gateway.register(ctx, &employee, password).await.is_completed() {
            info!(employee_id = %employee.id_typed(), "employee registered");
            return Ok(true);
        }

        ctx.notify(
            KEY,
            format!(
                "error registering employee with e-mail {}, this e-mail is already in use",
                employee.email()
            ),
        );
        Ok(false)
    }
}

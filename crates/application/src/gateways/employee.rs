use std::sync::Arc;

use tracing::instrument;

use backoffice_core::EmployeeId;
use backoffice_identity::{IdentityDirectory, NewIdentity, UserGroup};
use backoffice_infra::repository::{
    EmployeeFilter, Record, Repository, RepositoryError, UnitOfWork,
};
use backoffice_parties::{Customer, Employee};

use crate::context::RequestContext;
use crate::exclusivity::EmailExclusivity;
use crate::pipeline::{self, Outcome, cancellable};

/// Registration side of the employee aggregate. Mirrors
/// [`CustomerGateway`](crate::CustomerGateway) with the roles swapped and the
/// admin group assigned.
#[derive(Clone)]
pub struct EmployeeGateway {
    employees: Arc<dyn Repository<Employee>>,
    exclusivity: EmailExclusivity,
    directory: IdentityDirectory,
}

impl EmployeeGateway {
    pub fn new(
        employees: Arc<dyn Repository<Employee>>,
        customers: Arc<dyn Repository<Customer>>,
        directory: IdentityDirectory,
    ) -> Self {
        let exclusivity = EmailExclusivity::new(customers, employees.clone());
        Self {
            employees,
            exclusivity,
            directory,
        }
    }

    #[instrument(skip_all, fields(employee_id = %employee.id_typed()))]
    pub async fn register(&self, ctx: &RequestContext, employee: &Employee, password: &str) -> Outcome {
        match self.exclusivity.held_by_customer(ctx, employee.email()).await {
            Ok(false) => {}
            Ok(true) => {
                return Outcome::NotApplied(format!("e-mail {} belongs to a customer", employee.email()));
            }
            Err(err) => return Outcome::NotApplied(err.to_string()),
        }

        let identity = NewIdentity {
            email: employee.email().to_string(),
            password: password.to_string(),
            name: employee.name().to_string(),
            tax_id: None,
        };
        let commit = UnitOfWork::new().insert(employee.clone()).commit(&*self.employees);

        pipeline::commit_then_remote(ctx, Employee::KIND, employee.id_typed(), commit, || {
            self.directory.create_user(&identity, UserGroup::Admin)
        })
        .await
    }

    /// Whether an employee matches `id` or `email` while no customer shares
    /// the matched employee's e-mail.
    pub async fn exists(
        &self,
        ctx: &RequestContext,
        id: EmployeeId,
        email: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        let filter = EmployeeFilter::AnyOf {
            id,
            email: email.map(str::to_string),
        };
        let matches = cancellable(ctx, self.employees.find(&filter)).await?;
        let Some(found) = matches.first() else {
            return Ok(false);
        };
        Ok(!self.exclusivity.held_by_customer(ctx, found.email()).await?)
    }
}

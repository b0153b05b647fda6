//! Customer/employee e-mail exclusivity.
//!
//! An e-mail address belongs to at most one person, and that person is either
//! a customer or an employee. Both gateways consult the same checker, which
//! holds read capabilities on both repositories.
//!
//! The check runs before the insert and can race a concurrent registration;
//! the stores' own unique constraints only cover one table each.

use std::sync::Arc;

use backoffice_infra::repository::{CustomerFilter, EmployeeFilter, Repository, RepositoryError};
use backoffice_parties::{Customer, Employee};

use crate::context::RequestContext;
use crate::pipeline::cancellable;

#[derive(Clone)]
pub struct EmailExclusivity {
    customers: Arc<dyn Repository<Customer>>,
    employees: Arc<dyn Repository<Employee>>,
}

impl EmailExclusivity {
    pub fn new(
        customers: Arc<dyn Repository<Customer>>,
        employees: Arc<dyn Repository<Employee>>,
    ) -> Self {
        Self { customers, employees }
    }

    /// Whether an employee record uses `email` (case-exact).
    pub async fn held_by_employee(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<bool, RepositoryError> {
        let filter = EmployeeFilter::Email(email.to_string());
        let rows = cancellable(ctx, self.employees.find(&filter)).await?;
        Ok(!rows.is_empty())
    }

    /// Whether a customer record uses `email` (case-exact).
    pub async fn held_by_customer(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<bool, RepositoryError> {
        let filter = CustomerFilter::Email(email.to_string());
        let rows = cancellable(ctx, self.customers.find(&filter)).await?;
        Ok(!rows.is_empty())
    }
}

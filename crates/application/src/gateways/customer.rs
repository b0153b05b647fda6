use std::sync::Arc;

use tracing::instrument;

use backoffice_core::CustomerId;
use backoffice_identity::{IdentityDirectory, NewIdentity, UserGroup};
use backoffice_infra::repository::{
    CustomerFilter, Record, Repository, RepositoryError, UnitOfWork,
};
use backoffice_parties::{Customer, Employee};

use crate::context::RequestContext;
use crate::exclusivity::EmailExclusivity;
use crate::pipeline::{self, Outcome, cancellable};

#[derive(Clone)]
pub struct CustomerGateway {
    customers: Arc<dyn Repository<Customer>>,
    exclusivity: EmailExclusivity,
    directory: IdentityDirectory,
}

impl CustomerGateway {
    pub fn new(
        customers: Arc<dyn Repository<Customer>>,
        employees: Arc<dyn Repository<Employee>>,
        directory: IdentityDirectory,
    ) -> Self {
        let exclusivity = EmailExclusivity::new(customers.clone(), employees);
        Self {
            customers,
            exclusivity,
            directory,
        }
    }

    /// Insert and commit the customer, then create its identity in the
    /// customer group.
    ///
    /// Refused up front when an employee already owns the e-mail. A failed
    /// identity creation leaves the committed row in place.
    #[instrument(skip_all, fields(customer_id = %customer.id_typed()))]
    pub async fn register(&self, ctx: &RequestContext, customer: &Customer, password: &str) -> Outcome {
        match self.exclusivity.held_by_employee(ctx, customer.email()).await {
            Ok(false) => {}
            Ok(true) => {
                return Outcome::NotApplied(format!("e-mail {} belongs to an employee", customer.email()));
            }
            Err(err) => return Outcome::NotApplied(err.to_string()),
        }

        let identity = NewIdentity {
            email: customer.email().to_string(),
            password: password.to_string(),
            name: customer.name().to_string(),
            tax_id: Some(customer.tax_id().to_string()),
        };
        let commit = UnitOfWork::new().insert(customer.clone()).commit(&*self.customers);

        pipeline::commit_then_remote(ctx, Customer::KIND, customer.id_typed(), commit, || {
            self.directory.create_user(&identity, UserGroup::Customer)
        })
        .await
    }

    /// Commit the customer as given. The identity provider is not touched.
    #[instrument(skip_all, fields(customer_id = %customer.id_typed()))]
    pub async fn update(&self, ctx: &RequestContext, customer: &Customer) -> Outcome {
        let commit = UnitOfWork::new().update(customer.clone()).commit(&*self.customers);
        pipeline::commit_only(ctx, Customer::KIND, customer.id_typed(), commit).await
    }

    /// Delete by id and commit. The matching identity is left to the caller.
    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &RequestContext, id: CustomerId) -> Outcome {
        let commit = UnitOfWork::<Customer>::new().delete(id).commit(&*self.customers);
        pipeline::commit_only(ctx, Customer::KIND, id, commit).await
    }

    /// Whether any customer matching `id`, `tax_id` or `email` has an e-mail
    /// no employee shares.
    pub async fn exists(
        &self,
        ctx: &RequestContext,
        id: CustomerId,
        tax_id: Option<&str>,
        email: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        let filter = CustomerFilter::AnyOf {
            id,
            tax_id: tax_id.map(str::to_string),
            email: email.map(str::to_string),
        };
        let matches = cancellable(ctx, self.customers.find(&filter)).await?;
        for found in &matches {
            if !self.exclusivity.held_by_employee(ctx, found.email()).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// The stored customer, unless an employee shares its e-mail.
    pub async fn find_registered(
        &self,
        ctx: &RequestContext,
        id: CustomerId,
    ) -> Result<Option<Customer>, RepositoryError> {
        let Some(stored) = cancellable(ctx, self.customers.find_by_id(&id)).await? else {
            return Ok(None);
        };
        if self.exclusivity.held_by_employee(ctx, stored.email()).await? {
            return Ok(None);
        }
        Ok(Some(stored))
    }

    /// Active customers; empty when there are none.
    pub async fn list_all(&self, ctx: &RequestContext) -> Result<Vec<Customer>, RepositoryError> {
        cancellable(ctx, self.customers.find(&CustomerFilter::Active)).await
    }
}

use tracing::{info, warn};

use backoffice_core::{CustomerId, Validate};
use backoffice_identity::IdentityDirectory;
use backoffice_parties::{Customer, CustomerChanges};

use crate::context::RequestContext;
use crate::error::UseCaseError;
use crate::gateways::CustomerGateway;
use crate::use_cases::read_failed;

pub const KEY: &str = "customer";
pub const ALREADY_EXISTS: &str = "Customer already exists";
pub const DOES_NOT_EXIST: &str = "Customer does not exist";

#[derive(Clone)]
pub struct CustomerUseCase {
    gateway: CustomerGateway,
    directory: IdentityDirectory,
}

impl CustomerUseCase {
    pub fn new(gateway: CustomerGateway, directory: IdentityDirectory) -> Self {
        Self { gateway, directory }
    }

    pub async fn register(
        &self,
        ctx: &RequestContext,
        customer: Option<Customer>,
        password: &str,
    ) -> Result<bool, UseCaseError> {
        let customer = customer.ok_or(UseCaseError::InvalidArgument("customer"))?;

        let exists = self
            .gateway
            .exists(ctx, customer.id_typed(), Some(customer.tax_id()), Some(customer.email()))
            .await;
        match exists {
            Ok(false) => {}
            Ok(true) => {
                ctx.notify(KEY, ALREADY_EXISTS);
                return Ok(false);
            }
            Err(err) => return Ok(read_failed(ctx, KEY, err, false)),
        }

        if let Err(errors) = customer.validate() {
            ctx.notify_violations(&errors);
            return Ok(false);
        }

        if self.gateway.register(ctx, &customer, password).await.is_completed() {
            info!(customer_id = %customer.id_typed(), "customer registered");
            return Ok(true);
        }

        ctx.notify(
            KEY,
            format!(
                "error registering customer with e-mail {}, this e-mail is already in use",
                customer.email()
            ),
        );
        Ok(false)
    }

    /// Applies `changes` to the stored customer; e-mail and tax id always come
    /// from the stored record.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        changes: Option<CustomerChanges>,
    ) -> Result<bool, UseCaseError> {
        let changes = changes.ok_or(UseCaseError::InvalidArgument("customer"))?;

        let stored = match self.gateway.find_registered(ctx, changes.id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                ctx.notify(KEY, DOES_NOT_EXIST);
                return Ok(false);
            }
            Err(err) => return Ok(read_failed(ctx, KEY, err, false)),
        };

        let updated = stored.with_changes(&changes);
        if let Err(errors) = updated.validate() {
            ctx.notify_violations(&errors);
            return Ok(false);
        }

        if self.gateway.update(ctx, &updated).await.is_completed() {
            return Ok(true);
        }
        ctx.notify(KEY, format!("error updating customer {}", changes.id));
        Ok(false)
    }

    /// Deletes the local record, then removes the matching identity. The
    /// answer reflects the local delete only.
    pub async fn delete(&self, ctx: &RequestContext, id: CustomerId) -> Result<bool, UseCaseError> {
        let stored = match self.gateway.find_registered(ctx, id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                ctx.notify(KEY, DOES_NOT_EXIST);
                return Ok(false);
            }
            Err(err) => return Ok(read_failed(ctx, KEY, err, false)),
        };

        if !self.gateway.delete(ctx, id).await.is_completed() {
            ctx.notify(KEY, format!("error deleting customer {id}"));
            return Ok(false);
        }

        if !self.directory.delete_user(stored.email()).await {
            warn!(customer_id = %id, "customer deleted but its identity was not removed");
            ctx.notify(
                "identity",
                format!("identity for e-mail {} could not be removed", stored.email()),
            );
        }
        Ok(true)
    }

    pub async fn list_all(&self, ctx: &RequestContext) -> Vec<Customer> {
        match self.gateway.list_all(ctx).await {
            Ok(customers) => customers,
            Err(err) => read_failed(ctx, KEY, err, Vec::new()),
        }
    }
}

//! One use case per aggregate, plus identity.
//!
//! Order inside every mutation: argument check, existence check, validation,
//! gateway call. The first failing step records a notification and ends the
//! flow.

pub mod customer;
pub mod employee;
pub mod identity;
pub mod product;

pub use customer::CustomerUseCase;
pub use employee::EmployeeUseCase;
pub use identity::IdentityUseCase;
pub use product::ProductUseCase;

use backoffice_infra::repository::RepositoryError;

use crate::context::RequestContext;

/// Records a failed storage read and yields the flow's failure value.
pub(crate) fn read_failed<T>(ctx: &RequestContext, key: &str, err: RepositoryError, fallback: T) -> T {
    tracing::warn!(key, error = %err, "storage read failed");
    let message = match err {
        RepositoryError::Cancelled => "request cancelled".to_string(),
        _ => format!("could not read {key} records"),
    };
    ctx.notify(key, message);
    fallback
}

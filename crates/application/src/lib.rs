//! `backoffice-application`: gateways and use cases.
//!
//! Request flow: use case (argument check, existence check, validation) →
//! gateway (local commit, then the remote effect) → repositories, identity
//! directory and queue publisher from `backoffice-infra`.
//!
//! Use cases report expected failures as notifications on the
//! [`RequestContext`] and return `false`/`None`; the only error they return
//! is [`UseCaseError::InvalidArgument`].

pub mod context;
pub mod error;
pub mod exclusivity;
pub mod gateways;
pub mod pipeline;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod fixtures;

pub use context::{Notification, RequestContext};
pub use error::UseCaseError;
pub use exclusivity::EmailExclusivity;
pub use gateways::{CustomerGateway, EmployeeGateway, ProductGateway};
pub use pipeline::Outcome;
pub use use_cases::{CustomerUseCase, EmployeeUseCase, IdentityUseCase, ProductUseCase};

//! One gateway per aggregate.
//!
//! Gateways own storage access, the cross-aggregate checks and the
//! commit-then-remote sequencing (see [`crate::pipeline`]). Mutations answer
//! with an [`Outcome`](crate::Outcome); reads surface [`RepositoryError`]
//! unchanged and leave reporting to the use case.
//!
//! [`RepositoryError`]: backoffice_infra::repository::RepositoryError

pub mod customer;
pub mod employee;
pub mod product;

pub use customer::CustomerGateway;
pub use employee::EmployeeGateway;
pub use product::ProductGateway;

//! Infrastructure layer: storage, identity provider and queue adapters, config.
//!
//! Every adapter here implements a contract owned by a domain crate:
//! [`repository::Repository`] for storage, `IdentityProviderClient` for the
//! identity provider and `EventPublisher` for the event queues.

pub mod config;
pub mod identity;
pub mod queue;
pub mod repository;

pub use config::{ConfigError, PersistentStores, ProductQueues, Settings};

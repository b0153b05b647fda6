//! Integration events and the queue publishing contract.
//!
//! Aggregates describe *what happened* with types implementing [`Event`]; the
//! gateways wrap them in an [`EventEnvelope`] and hand them to an
//! [`EventPublisher`], which routes each event type to its own queue.

pub mod envelope;
pub mod event;
pub mod in_memory_publisher;
pub mod publisher;

pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_publisher::InMemoryEventPublisher;
pub use publisher::{EventPublisher, PublishError, QueueRoutes};

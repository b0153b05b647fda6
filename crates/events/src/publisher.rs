//! Queue publishing contract.
//!
//! Delivery is **at-least-attempted**: a publisher either hands the envelope to
//! the transport or reports a [`PublishError`]. It never retries on its own and
//! never rolls anything back; the caller decides what a failure means.
//!
//! Each event type is routed to its own queue through [`QueueRoutes`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::envelope::EventEnvelope;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("event serialization failed: {0}")]
    Serialization(String),

    /// The queue transport rejected the message or was unreachable.
    #[error("queue transport error: {0}")]
    Transport(String),
}

/// Event type → queue name mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueRoutes {
    routes: HashMap<String, String>,
}

impl QueueRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, event_type: impl Into<String>, queue: impl Into<String>) -> Self {
        self.routes.insert(event_type.into(), queue.into());
        self
    }

    /// Queue for `event_type`; unrouted types go to a queue named after the type.
    pub fn queue_for(&self, event_type: &str) -> String {
        self.routes
            .get(event_type)
            .cloned()
            .unwrap_or_else(|| event_type.to_string())
    }
}

/// Message queue publisher.
///
/// The trait requires `Send + Sync`; implementations are long-lived and shared
/// by every request flow.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, envelope: EventEnvelope<serde_json::Value>) -> Result<(), PublishError>;
}

#[async_trait]
impl<P> EventPublisher for Arc<P>
where
    P: EventPublisher + ?Sized,
{
    async fn publish(&self, envelope: EventEnvelope<serde_json::Value>) -> Result<(), PublishError> {
        (**self).publish(envelope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_resolve_with_type_name_fallback() {
        let routes = QueueRoutes::new().route("products.product.created", "produto-criado");
        assert_eq!(routes.queue_for("products.product.created"), "produto-criado");
        assert_eq!(routes.queue_for("products.product.deleted"), "products.product.deleted");
    }
}

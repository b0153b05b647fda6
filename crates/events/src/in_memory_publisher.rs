//! In-memory queue publisher for tests/dev.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::debug;

use crate::envelope::EventEnvelope;
use crate::publisher::{EventPublisher, PublishError, QueueRoutes};

/// A message recorded by [`InMemoryEventPublisher`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedMessage {
    pub queue: String,
    pub envelope: EventEnvelope<serde_json::Value>,
}

/// In-memory publisher.
///
/// - No IO
/// - Keeps every published message in publication order
/// - `set_unreachable(true)` simulates a queue outage
#[derive(Debug, Default)]
pub struct InMemoryEventPublisher {
    routes: QueueRoutes,
    messages: Mutex<Vec<QueuedMessage>>,
    unreachable: AtomicBool,
}

impl InMemoryEventPublisher {
    pub fn new(routes: QueueRoutes) -> Self {
        Self {
            routes,
            ..Self::default()
        }
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<QueuedMessage> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn messages_on(&self, queue: &str) -> Vec<QueuedMessage> {
        self.messages()
            .into_iter()
            .filter(|m| m.queue == queue)
            .collect()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, envelope: EventEnvelope<serde_json::Value>) -> Result<(), PublishError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(PublishError::Transport("queue unreachable".to_string()));
        }

        let queue = self.routes.queue_for(envelope.event_type());
        debug!(%queue, event_type = envelope.event_type(), "queued event");

        let mut messages = self
            .messages
            .lock()
            .map_err(|_| PublishError::Transport("publisher lock poisoned".to_string()))?;
        messages.push(QueuedMessage { queue, envelope });
        Ok(())
    }
}

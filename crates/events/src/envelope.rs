use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::Event;
use crate::publisher::PublishError;

/// Envelope for an event: the unit that is written to a queue.
///
/// `payload` is the event body; the surrounding fields let consumers dispatch
/// on `event_type` and evolve on `schema_version` without decoding the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    event_type: String,
    schema_version: u32,
    aggregate_id: Uuid,
    occurred_at: DateTime<Utc>,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn aggregate_id(&self) -> Uuid {
        self.aggregate_id
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

impl<E: Event> EventEnvelope<E> {
    pub fn new(aggregate_id: Uuid, payload: E) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_type: payload.event_type().to_string(),
            schema_version: payload.version(),
            aggregate_id,
            occurred_at: payload.occurred_at(),
            payload,
        }
    }

    /// Erase the payload type so the envelope can cross a `dyn` publisher.
    pub fn encode(self) -> Result<EventEnvelope<serde_json::Value>, PublishError> {
        let payload = serde_json::to_value(&self.payload)
            .map_err(|e| PublishError::Serialization(e.to_string()))?;
        Ok(EventEnvelope {
            event_id: self.event_id,
            event_type: self.event_type,
            schema_version: self.schema_version,
            aggregate_id: self.aggregate_id,
            occurred_at: self.occurred_at,
            payload,
        })
    }
}

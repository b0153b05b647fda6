//! Redis Streams-backed queue publisher.
//!
//! Every queue is one stream; [`QueueRoutes`] picks the stream from the event
//! type. Messages are appended with `XADD` and carry dispatch metadata next
//! to the JSON envelope so consumers can filter without decoding the body.
//!
//! Consumption (consumer groups, acknowledgement) is the consumers' business.

use std::fmt;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use backoffice_events::{EventEnvelope, EventPublisher, PublishError, QueueRoutes};

pub struct RedisStreamsPublisher {
    client: redis::Client,
    routes: QueueRoutes,
    /// Opened on first publish and shared afterwards.
    conn: OnceCell<MultiplexedConnection>,
    /// Approximate `MAXLEN` trim per stream; `None` keeps everything.
    max_len: Option<usize>,
}

impl fmt::Debug for RedisStreamsPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStreamsPublisher")
            .field("routes", &self.routes)
            .field("connected", &self.conn.initialized())
            .field("max_len", &self.max_len)
            .finish_non_exhaustive()
    }
}

impl RedisStreamsPublisher {
    /// Opening the client only parses the URL; no connection is made yet.
    pub fn new(redis_url: impl AsRef<str>, routes: QueueRoutes) -> Result<Self, PublishError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| PublishError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            routes,
            conn: OnceCell::new(),
            max_len: None,
        })
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    async fn connection(&self) -> Result<MultiplexedConnection, PublishError> {
        self.conn
            .get_or_try_init(|| async {
                self.client
                    .get_multiplexed_tokio_connection()
                    .await
                    .map_err(|e| PublishError::Transport(e.to_string()))
            })
            .await
            .cloned()
    }
}

/// Field/value pairs written for one message.
fn stream_fields(envelope: &EventEnvelope<serde_json::Value>) -> Result<Vec<(&'static str, String)>, PublishError> {
    let payload =
        serde_json::to_string(envelope).map_err(|e| PublishError::Serialization(e.to_string()))?;
    Ok(vec![
        ("event_id", envelope.event_id().to_string()),
        ("event_type", envelope.event_type().to_string()),
        ("schema_version", envelope.schema_version().to_string()),
        ("aggregate_id", envelope.aggregate_id().to_string()),
        ("payload", payload),
    ])
}

#[async_trait]
impl EventPublisher for RedisStreamsPublisher {
    #[instrument(
        skip(self, envelope),
        fields(event_type = %envelope.event_type(), aggregate_id = %envelope.aggregate_id()),
        err
    )]
    async fn publish(&self, envelope: EventEnvelope<serde_json::Value>) -> Result<(), PublishError> {
        let stream = self.routes.queue_for(envelope.event_type());
        let fields = stream_fields(&envelope)?;

        let mut cmd = redis::cmd("XADD");
        cmd.arg(&stream);
        if let Some(max_len) = self.max_len {
            cmd.arg("MAXLEN").arg("~").arg(max_len);
        }
        cmd.arg("*");
        for (field, value) in &fields {
            cmd.arg(*field).arg(value);
        }

        let mut conn = self.connection().await?;
        let id: String = cmd
            .query_async(&mut conn)
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        debug!(%stream, message_id = %id, "event appended");
        Ok(())
    }
}

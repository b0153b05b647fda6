//! Queue publishers.
//!
//! The in-memory publisher lives in `backoffice-events`; this module holds the
//! networked transports.

#[cfg(feature = "redis")]
pub mod redis_streams;

#[cfg(feature = "redis")]
pub use redis_streams::RedisStreamsPublisher;

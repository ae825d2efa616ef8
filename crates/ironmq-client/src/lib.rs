//! # IronMQ Client
//!
//! Async client for the IronMQ v3 HTTP API.
//!
//! This library provides:
//! - Enqueueing messages onto a queue
//! - Reserving (dequeueing) messages with a lease and optional long-poll
//! - Deleting reserved messages
//!
//! Each operation is a single HTTP exchange that can be aborted with a
//! [`tokio_util::sync::CancellationToken`]. The client does not retry;
//! [`MqError::is_transient`] helps callers build their own policy.
//!
//! ## Module Organization
//!
//! - [`error`] - Error types for all operations
//! - [`message`] - Messages, acknowledgements and bounded parameters
//! - [`config`] - Connection settings and layered loading
//! - [`transport`] - HTTP transport abstraction and the reqwest implementation
//! - [`client`] - The API client

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod transport;

// Re-export commonly used types at crate root for convenience
pub use client::{HttpClient, QueueClient};
pub use config::{ClientConfig, Scheme, DEFAULT_HOST};
pub use error::{ConfigurationError, MqError, TransportError, ValidationError};
pub use message::{
    Deleted, DequeuedMessage, Enqueued, MessageId, NewMessage, QueueName, ReservationId, Timeout,
    Wait,
};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use tokio_util::sync::CancellationToken;

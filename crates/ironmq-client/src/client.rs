//! IronMQ v3 API client.
//!
//! Every operation follows the same exchange: serialize a request struct to
//! JSON, send it through the [`HttpTransport`] while watching the caller's
//! [`CancellationToken`], then decode the JSON body into a typed result.
//! Each call makes exactly one attempt; retry policy belongs to the caller.

use crate::config::ClientConfig;
use crate::error::{ConfigurationError, MqError};
use crate::message::{
    Deleted, DequeuedMessage, Enqueued, MessageId, NewMessage, QueueName, ReservationId, Timeout,
    Wait,
};
use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

const APPLICATION_JSON: &str = "application/json";

/// Queue operations offered by the service
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Post messages to a queue
    async fn enqueue(
        &self,
        cancel: &CancellationToken,
        queue: &QueueName,
        messages: &[NewMessage],
    ) -> Result<Enqueued, MqError>;

    /// Reserve up to `count` messages from a queue
    async fn dequeue(
        &self,
        cancel: &CancellationToken,
        queue: &QueueName,
        count: u32,
        timeout: Timeout,
        wait: Wait,
        delete_on_reserve: bool,
    ) -> Result<Vec<DequeuedMessage>, MqError>;

    /// Delete a message held under a reservation
    async fn delete_reserved(
        &self,
        cancel: &CancellationToken,
        queue: &QueueName,
        message_id: &MessageId,
        reservation_id: &ReservationId,
    ) -> Result<Deleted, MqError>;
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct EnqueueRequest<'a> {
    messages: &'a [NewMessage],
}

#[derive(Debug, Serialize)]
struct DequeueRequest {
    n: u32,
    timeout: u32,
    wait: u32,
    delete: bool,
}

#[derive(Debug, Deserialize)]
struct DequeueResponse {
    #[serde(default)]
    messages: Vec<DequeuedMessage>,
}

#[derive(Debug, Serialize)]
struct DeleteReservedRequest<'a> {
    reservation_id: &'a ReservationId,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    msg: String,
}

// ============================================================================
// HTTP Client
// ============================================================================

/// Client for the IronMQ v3 REST API.
///
/// Cloning is cheap; clones share the same transport and connection pool.
///
/// # Examples
///
/// ```no_run
/// use ironmq_client::{CancellationToken, ClientConfig, HttpClient, NewMessage, QueueName};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::new("my-project").with_token("my-token");
/// let client = HttpClient::new(&config)?;
/// let queue = QueueName::new("jobs")?;
///
/// let enqueued = client
///     .enqueue(&CancellationToken::new(), &queue, &[NewMessage::new("hello")])
///     .await?;
/// println!("posted {:?}", enqueued.ids);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpClient {
    endpoint: Url,
    headers: HeaderMap,
    transport: Arc<dyn HttpTransport>,
}

impl HttpClient {
    /// Create a client using the reqwest transport
    pub fn new(config: &ClientConfig) -> Result<Self, MqError> {
        let transport = ReqwestTransport::new(config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client that sends requests through `transport`
    pub fn with_transport(
        config: &ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, MqError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("OAuth {}", token)).map_err(|_| {
                ConfigurationError::Invalid {
                    message: "token contains characters not allowed in a header".to_string(),
                }
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(Self {
            endpoint: config.endpoint()?,
            headers,
            transport,
        })
    }

    /// Project endpoint all queue paths are resolved against
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Post messages to a queue.
    ///
    /// The returned ids are in the same order as `messages`.
    #[instrument(skip(self, cancel, messages), fields(queue = %queue, count = messages.len()))]
    pub async fn enqueue(
        &self,
        cancel: &CancellationToken,
        queue: &QueueName,
        messages: &[NewMessage],
    ) -> Result<Enqueued, MqError> {
        let url = self.url(&["queues", queue.as_str(), "messages"])?;

        self.execute(cancel, Method::POST, url, &EnqueueRequest { messages })
            .await
    }

    /// Reserve up to `count` messages from a queue.
    ///
    /// `timeout` is the reservation lease and `wait` the long-poll duration.
    /// Out-of-range values are rejected before any request is sent. With
    /// `delete_on_reserve` the service deletes the messages as it returns them.
    #[instrument(skip(self, cancel), fields(queue = %queue))]
    pub async fn dequeue(
        &self,
        cancel: &CancellationToken,
        queue: &QueueName,
        count: u32,
        timeout: Timeout,
        wait: Wait,
        delete_on_reserve: bool,
    ) -> Result<Vec<DequeuedMessage>, MqError> {
        if !timeout.is_in_range() {
            return Err(MqError::TimeoutOutOfRange {
                value: timeout.as_secs(),
                min: Timeout::MIN,
                max: Timeout::MAX,
            });
        }
        if !wait.is_in_range() {
            return Err(MqError::WaitOutOfRange {
                value: wait.as_secs(),
                min: Wait::MIN,
                max: Wait::MAX,
            });
        }

        let url = self.url(&["queues", queue.as_str(), "reservations"])?;
        let body = DequeueRequest {
            n: count,
            timeout: timeout.as_secs(),
            wait: wait.as_secs(),
            delete: delete_on_reserve,
        };

        let response: DequeueResponse = self.execute(cancel, Method::POST, url, &body).await?;
        Ok(response.messages)
    }

    /// Delete a reserved message, releasing its reservation
    #[instrument(skip(self, cancel), fields(queue = %queue, message_id = %message_id))]
    pub async fn delete_reserved(
        &self,
        cancel: &CancellationToken,
        queue: &QueueName,
        message_id: &MessageId,
        reservation_id: &ReservationId,
    ) -> Result<Deleted, MqError> {
        let url = self.url(&["queues", queue.as_str(), "messages", message_id.as_str()])?;

        self.execute(
            cancel,
            Method::DELETE,
            url,
            &DeleteReservedRequest { reservation_id },
        )
        .await
    }

    fn url(&self, segments: &[&str]) -> Result<Url, MqError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ConfigurationError::Invalid {
                message: format!("endpoint '{}' cannot carry a path", self.endpoint),
            })?
            .extend(segments);
        Ok(url)
    }

    async fn execute<B, T>(
        &self,
        cancel: &CancellationToken,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T, MqError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_vec(body).map_err(MqError::Encode)?;

        debug!(method = %method, url = %url, bytes = body.len(), "Sending IronMQ request");

        let request = HttpRequest {
            method,
            url,
            headers: self.headers.clone(),
            body: Bytes::from(body),
        };

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("IronMQ request cancelled");
                return Err(MqError::Cancelled);
            }
            result = self.transport.send(request) => result?,
        };

        if !response.status.is_success() {
            let message = error_message(&response.body)
                .or_else(|| response.status.canonical_reason().map(str::to_string))
                .unwrap_or_default();
            warn!(status = response.status.as_u16(), message = %message, "IronMQ request failed");
            return Err(MqError::Api {
                status: response.status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&response.body).map_err(MqError::Decode)
    }
}

/// Extract the service's error text from a response body
fn error_message(body: &[u8]) -> Option<String> {
    if let Ok(error) = serde_json::from_slice::<ErrorBody>(body) {
        return Some(error.msg);
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("transport", &"<HttpTransport>")
            .finish()
    }
}

#[async_trait]
impl QueueClient for HttpClient {
    async fn enqueue(
        &self,
        cancel: &CancellationToken,
        queue: &QueueName,
        messages: &[NewMessage],
    ) -> Result<Enqueued, MqError> {
        HttpClient::enqueue(self, cancel, queue, messages).await
    }

    async fn dequeue(
        &self,
        cancel: &CancellationToken,
        queue: &QueueName,
        count: u32,
        timeout: Timeout,
        wait: Wait,
        delete_on_reserve: bool,
    ) -> Result<Vec<DequeuedMessage>, MqError> {
        HttpClient::dequeue(self, cancel, queue, count, timeout, wait, delete_on_reserve).await
    }

    async fn delete_reserved(
        &self,
        cancel: &CancellationToken,
        queue: &QueueName,
        message_id: &MessageId,
        reservation_id: &ReservationId,
    ) -> Result<Deleted, MqError> {
        HttpClient::delete_reserved(self, cancel, queue, message_id, reservation_id).await
    }
}

//! Message types and identifiers exchanged with the IronMQ v3 API.

use crate::error::ValidationError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

// ============================================================================
// Core Domain Identifiers
// ============================================================================

/// Name of a queue within a project
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QueueName(String);

impl QueueName {
    /// Create new queue name, rejecting empty names
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::Required {
                field: "queue_name".to_string(),
            });
        }

        if name.chars().any(|c| c.is_control()) {
            return Err(ValidationError::InvalidFormat {
                field: "queue_name".to_string(),
                message: "control characters are not allowed".to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Get queue name as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QueueName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for QueueName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QueueName> for String {
    fn from(value: QueueName) -> Self {
        value.0
    }
}

/// Server-assigned message identifier.
///
/// IronMQ encodes 64-bit ids as JSON strings; numeric ids are accepted on
/// decode and normalised to their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(id) => Ok(Self(id)),
            RawId::Number(id) => Ok(Self(id.to_string())),
        }
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "message_id".to_string(),
            });
        }

        Ok(Self(s.to_string()))
    }
}

/// Identifier of a reservation (lease) on a dequeued message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(String);

impl ReservationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReservationId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "reservation_id".to_string(),
            });
        }

        Ok(Self(s.to_string()))
    }
}

// ============================================================================
// Bounded Parameters
// ============================================================================

/// Reservation lease duration in seconds.
///
/// Any value can be held; `dequeue` rejects values outside
/// [`Timeout::MIN`]..=[`Timeout::MAX`] before contacting the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timeout(u32);

impl Timeout {
    pub const MIN: u32 = 30;
    pub const MAX: u32 = 86_400;

    pub const fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn as_secs(&self) -> u32 {
        self.0
    }

    pub fn is_in_range(&self) -> bool {
        (Self::MIN..=Self::MAX).contains(&self.0)
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self(60)
    }
}

impl From<u32> for Timeout {
    fn from(secs: u32) -> Self {
        Self(secs)
    }
}

impl std::fmt::Display for Timeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Long-poll duration in seconds; zero returns immediately.
///
/// Any value can be held; `dequeue` rejects values outside
/// [`Wait::MIN`]..=[`Wait::MAX`] before contacting the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wait(u32);

impl Wait {
    pub const MIN: u32 = 0;
    pub const MAX: u32 = 30;

    pub const fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn as_secs(&self) -> u32 {
        self.0
    }

    pub fn is_in_range(&self) -> bool {
        (Self::MIN..=Self::MAX).contains(&self.0)
    }
}

impl From<u32> for Wait {
    fn from(secs: u32) -> Self {
        Self(secs)
    }
}

impl std::fmt::Display for Wait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.0)
    }
}

// ============================================================================
// Message Types
// ============================================================================

/// A message to be posted to a queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub body: String,

    /// Seconds before the message becomes available for reservation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u32>,

    /// Seconds the message is retained before it expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u32>,

    /// Headers forwarded to subscribers of push queues
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_headers: Option<HashMap<String, String>>,
}

impl NewMessage {
    /// Create new message with body
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            delay: None,
            expires_in: None,
            push_headers: None,
        }
    }

    /// Delay availability of the message
    pub fn with_delay(mut self, secs: u32) -> Self {
        self.delay = Some(secs);
        self
    }

    /// Expire the message after the given number of seconds
    pub fn with_expires_in(mut self, secs: u32) -> Self {
        self.expires_in = Some(secs);
        self
    }

    /// Add a push header
    pub fn with_push_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }
}

/// A reserved message returned by the reservation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DequeuedMessage {
    pub id: MessageId,
    pub body: String,
    #[serde(default)]
    pub reserved_count: u32,
    /// Absent when the message was deleted on reservation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<ReservationId>,
}

/// Acknowledgement of an enqueue request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enqueued {
    /// Ids assigned to the posted messages, in request order
    pub ids: Vec<MessageId>,
    #[serde(default)]
    pub msg: String,
}

/// Acknowledgement of a delete request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    #[serde(default)]
    pub msg: String,
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;

//! Tests for error types.

use super::*;

#[test]
fn test_error_transience() {
    assert!(MqError::Api {
        status: 503,
        message: "unavailable".to_string(),
    }
    .is_transient());

    assert!(MqError::Api {
        status: 429,
        message: "slow down".to_string(),
    }
    .is_transient());

    assert!(!MqError::Api {
        status: 404,
        message: "Queue not found".to_string(),
    }
    .is_transient());

    assert!(MqError::Transport(TransportError::Timeout { source: None }).is_transient());
    assert!(MqError::Transport(TransportError::Connection {
        message: "refused".to_string(),
        source: None,
    })
    .is_transient());

    assert!(!MqError::Cancelled.is_transient());
    assert!(!MqError::TimeoutOutOfRange {
        value: 5,
        min: 30,
        max: 86400,
    }
    .is_transient());
}

#[test]
fn test_client_side_classification() {
    assert!(MqError::WaitOutOfRange {
        value: 31,
        min: 0,
        max: 30,
    }
    .is_client_side());

    assert!(MqError::Validation(ValidationError::Required {
        field: "queue_name".to_string(),
    })
    .is_client_side());

    assert!(!MqError::Cancelled.is_client_side());
    assert!(!MqError::Transport(TransportError::Timeout { source: None }).is_client_side());
}

#[test]
fn test_out_of_range_messages_name_bounds() {
    let err = MqError::TimeoutOutOfRange {
        value: 10,
        min: 30,
        max: 86400,
    };
    assert_eq!(
        err.to_string(),
        "Reservation timeout 10s is out of range (30-86400s)"
    );

    let err = MqError::WaitOutOfRange {
        value: 45,
        min: 0,
        max: 30,
    };
    assert_eq!(err.to_string(), "Long-poll wait 45s is out of range (0-30s)");
}

#[test]
fn test_decode_error_keeps_source() {
    let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err = MqError::Decode(json_err);

    assert!(err.to_string().starts_with("Response decoding failed:"));
    assert!(std::error::Error::source(&err).is_some());
}

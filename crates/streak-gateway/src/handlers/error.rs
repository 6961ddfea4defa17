//! Gateway error types

use crate::protocol::CloseCode;
use std::time::Duration;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Why a connection attempt ended
///
/// Every variant is retried by the supervisor; the variant only selects the delay.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// WebSocket transport failure
    #[error("Transport error: {0}")]
    Transport(#[source] Box<tungstenite::Error>),

    /// Opening the connection took too long
    #[error("Connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// The gateway closed the connection
    #[error("Connection closed (code: {code:?}, reason: {reason:?})")]
    Closed { code: Option<u16>, reason: String },

    /// JSON encode/decode failure
    #[error("Invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// The gateway broke the handshake contract
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// A heartbeat was due while the previous one was still unacknowledged
    #[error("Heartbeat not acknowledged (zombie connection)")]
    ZombieConnection,

    /// The gateway sent op 7
    #[error("Gateway requested reconnect")]
    ReconnectRequested,

    /// The gateway sent op 9
    #[error("Invalid session (resumable: {resumable})")]
    InvalidSession { resumable: bool },

    /// The outbound queue has no writer any more
    #[error("Writer closed")]
    WriterClosed,
}

impl GatewayError {
    /// Closed connection without a close frame
    #[must_use]
    pub fn stream_ended() -> Self {
        Self::Closed {
            code: None,
            reason: String::new(),
        }
    }

    /// The gateway close code, if this is a close with a documented code
    #[must_use]
    pub fn close_code(&self) -> Option<CloseCode> {
        match self {
            Self::Closed { code: Some(code), .. } => CloseCode::from_u16(*code),
            _ => None,
        }
    }

    /// Whether this ending is routine gateway housekeeping rather than a fault
    #[must_use]
    pub fn is_routine(&self) -> bool {
        matches!(
            self,
            Self::ReconnectRequested | Self::InvalidSession { resumable: true }
        )
    }
}

impl From<tungstenite::Error> for GatewayError {
    fn from(err: tungstenite::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;

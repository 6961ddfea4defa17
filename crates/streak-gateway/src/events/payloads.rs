//! Event payload definitions
//!
//! Only the fields this client reads; unknown fields are ignored on decode.

use serde::{Deserialize, Serialize};

/// READY event payload
///
/// Sent after successful Identify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyEvent {
    /// Session ID for resuming
    pub session_id: String,

    /// Gateway URL for resuming (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_gateway_url: Option<String>,

    /// Current user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserPayload>,
}

/// User data included in events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    pub id: String,
    pub username: String,
}

/// VOICE_STATE_UPDATE event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceStateEvent {
    #[serde(default)]
    pub guild_id: Option<String>,

    /// `None` when the user left voice
    #[serde(default)]
    pub channel_id: Option<String>,

    pub user_id: String,
}

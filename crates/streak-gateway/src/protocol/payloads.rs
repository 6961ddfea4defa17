//! Payload definitions
//!
//! Typed `d` payloads for the frames this client sends and the hello it receives.

use serde::{Deserialize, Serialize};
use streak_common::{ActivityConfig, PresenceStatus};

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Payload for op 2 (Identify)
///
/// Sent by the client to start a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Account token
    pub token: String,

    /// Client connection properties
    pub properties: IdentifyProperties,

    /// Initial presence
    pub presence: PresencePayload,
}

impl IdentifyPayload {
    /// Build an identify payload with the static activity from configuration
    #[must_use]
    pub fn new(
        token: impl Into<String>,
        properties: IdentifyProperties,
        status: PresenceStatus,
        activity: &ActivityConfig,
    ) -> Self {
        Self {
            token: token.into(),
            properties,
            presence: PresencePayload {
                status,
                since: 0,
                activities: vec![Activity::from_config(activity)],
                afk: false,
            },
        }
    }
}

/// Client connection properties
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentifyProperties {
    /// Operating system
    pub os: String,

    /// Browser or client name
    pub browser: String,

    /// Device type
    pub device: String,
}

impl IdentifyProperties {
    const OS_NAMES: [&'static str; 3] = ["Windows", "Linux", "Mac OS X"];
    const BROWSERS: [&'static str; 5] = ["Discord Client", "Chrome", "Firefox", "Safari", "Edge"];

    /// Number of distinct fingerprints before they repeat
    pub const COMBINATIONS: usize = Self::OS_NAMES.len() * Self::BROWSERS.len();

    /// Deterministic fingerprint for the connection with the given ordinal
    #[must_use]
    pub fn for_connection(index: usize) -> Self {
        let os = Self::OS_NAMES[index % Self::OS_NAMES.len()];
        let browser = Self::BROWSERS[(index / Self::OS_NAMES.len()) % Self::BROWSERS.len()];

        Self {
            os: os.to_string(),
            browser: browser.to_string(),
            device: String::new(),
        }
    }
}

/// Presence sent inside identify
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresencePayload {
    pub status: PresenceStatus,
    pub since: u64,
    pub activities: Vec<Activity>,
    pub afk: bool,
}

/// Rich presence activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,

    /// Activity type (0 = playing)
    #[serde(rename = "type")]
    pub kind: u8,

    pub application_id: String,
    pub details: String,
    pub state: String,

    /// Button labels
    pub buttons: Vec<String>,

    pub metadata: ActivityMetadata,
}

impl Activity {
    #[must_use]
    pub fn from_config(config: &ActivityConfig) -> Self {
        Self {
            name: config.name.clone(),
            kind: 0,
            application_id: config.application_id.clone(),
            details: config.details.clone(),
            state: config.state.clone(),
            buttons: vec![config.button_label.clone()],
            metadata: ActivityMetadata {
                button_urls: vec![config.button_url.clone()],
            },
        }
    }
}

/// Button targets, index-aligned with [`Activity::buttons`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityMetadata {
    pub button_urls: Vec<String>,
}

/// Payload for op 6 (Resume)
///
/// Sent by the client to resume a disconnected session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumePayload {
    /// Account token
    pub token: String,

    /// Session ID to resume
    pub session_id: String,

    /// Last received sequence number
    pub seq: u64,
}

/// Payload for op 4 (Voice State Update)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceStatePayload {
    pub guild_id: String,
    pub channel_id: String,
    pub self_mute: bool,
    pub self_deaf: bool,
}

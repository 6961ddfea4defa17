//! Session state
//!
//! Resumable-connection facts for one peer. Created once per supervisor and handed
//! from one connection attempt to the next so resume data survives a dropped socket.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Session state shared by the loops of one connection attempt
pub type SharedSessionState = Arc<Mutex<SessionState>>;

/// Mutable record of one peer's gateway session
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Assigned by READY; absent until the first successful handshake
    pub session_id: Option<String>,

    /// Last sequence number seen on a dispatch
    pub sequence: Option<u64>,

    /// Alternate endpoint for resuming, from READY
    pub resume_url: Option<String>,

    /// True between an ACK and the next heartbeat sent
    pub heartbeat_acked: bool,

    /// True once READY or RESUMED was received on the current attempt
    pub connected: bool,

    /// When voice channels were last joined
    pub last_voice_join: Option<Instant>,

    /// Wall-clock time of the last successful handshake
    pub last_connected: Option<DateTime<Utc>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            session_id: None,
            sequence: None,
            resume_url: None,
            heartbeat_acked: true,
            connected: false,
            last_voice_join: None,
            last_connected: None,
        }
    }
}

impl SessionState {
    /// Create a fresh state wrapped for sharing
    #[must_use]
    pub fn new_shared() -> SharedSessionState {
        Arc::new(Mutex::new(Self::default()))
    }

    /// Whether enough is known to send a resume instead of identify
    #[must_use]
    pub fn can_resume(&self) -> bool {
        self.session_id.is_some() && self.sequence.is_some()
    }

    /// Forget the session after the gateway declared it invalid
    ///
    /// The voice-join timestamp belongs to the discarded session and is cleared too.
    pub fn reset(&mut self) {
        self.session_id = None;
        self.sequence = None;
        self.resume_url = None;
        self.heartbeat_acked = true;
        self.connected = false;
        self.last_voice_join = None;
    }

    /// Store the identifiers delivered by READY and mark the attempt connected
    pub fn record_ready(&mut self, session_id: String, resume_url: Option<String>) {
        self.session_id = Some(session_id);
        self.resume_url = resume_url;
        self.mark_connected();
    }

    pub fn mark_connected(&mut self) {
        self.connected = true;
        self.last_connected = Some(Utc::now());
    }

    pub fn mark_disconnected(&mut self) {
        self.connected = false;
    }

    /// Decide whether voice channels should be joined now
    ///
    /// Returns true and records `now` when no join happened within `cooldown`.
    pub fn should_join_voice(&mut self, now: Instant, cooldown: Duration) -> bool {
        let due = match self.last_voice_join {
            Some(last) => now.saturating_duration_since(last) > cooldown,
            None => true,
        };

        if due {
            self.last_voice_join = Some(now);
        }
        due
    }
}

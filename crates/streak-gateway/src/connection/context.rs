//! Per-peer connection context
//!
//! Immutable inputs shared by every attempt of one supervisor.

use crate::protocol::IdentifyProperties;
use std::sync::Arc;
use streak_common::{DiscordConfig, GatewayConfig, Peer, PresenceStatus};

/// Everything a gateway session needs besides its mutable state
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    /// Connection ordinal, used for the client fingerprint
    pub index: usize,
    pub token: String,
    pub status: PresenceStatus,
    /// Voice channels joined after READY
    pub targets: Vec<Peer>,
    pub properties: IdentifyProperties,
    pub config: Arc<GatewayConfig>,
}

impl ConnectionContext {
    #[must_use]
    pub fn new(index: usize, discord: &DiscordConfig, peer: Peer, config: Arc<GatewayConfig>) -> Self {
        Self {
            index,
            token: discord.token.clone(),
            status: discord.status,
            targets: vec![peer],
            properties: IdentifyProperties::for_connection(index),
            config,
        }
    }

    /// One-based number used in log lines
    #[must_use]
    pub const fn label(&self) -> usize {
        self.index + 1
    }
}

//! Peer (voice target) configuration
//!
//! A peer is one `guild_id:channel_id` pair from `DISCORD_SERVERS`.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// One configured voice target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Peer {
    #[validate(
        length(min = 1, message = "guild_id must not be empty"),
        custom(function = "validate_numeric_id")
    )]
    pub guild_id: String,

    #[validate(
        length(min = 1, message = "channel_id must not be empty"),
        custom(function = "validate_numeric_id")
    )]
    pub channel_id: String,
}

impl Peer {
    /// Create a validated peer
    pub fn new(
        guild_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let peer = Self {
            guild_id: guild_id.into(),
            channel_id: channel_id.into(),
        };

        peer.validate()
            .map_err(|e| ConfigError::InvalidValue("DISCORD_SERVERS", e.to_string()))?;

        Ok(peer)
    }

    /// Parse a comma-separated list of `guild_id:channel_id` pairs
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, ConfigError> {
        let peers = raw
            .split(',')
            .map(str::trim)
            .map(|pair| {
                let (guild_id, channel_id) = pair.split_once(':').ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "DISCORD_SERVERS",
                        format!("invalid server format: {pair:?} (expected guild_id:channel_id)"),
                    )
                })?;
                Self::new(guild_id.trim(), channel_id.trim())
            })
            .collect::<Result<Vec<_>, _>>()?;

        if peers.is_empty() {
            return Err(ConfigError::MissingVar("DISCORD_SERVERS"));
        }

        Ok(peers)
    }
}

impl std::fmt::Display for Peer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.guild_id, self.channel_id)
    }
}

fn validate_numeric_id(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("numeric_id")
            .with_message(Cow::Borrowed("ID must contain only digits")))
    }
}

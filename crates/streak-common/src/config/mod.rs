//! Configuration structs

mod app_config;
mod peer;

pub use app_config::{
    ActivityConfig, AppConfig, BackoffConfig, ConfigError, DiscordConfig, GatewayConfig,
    PresenceStatus, ServerConfig, VoiceConfig,
};
pub use peer::Peer;

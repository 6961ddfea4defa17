//! # streak-common
//!
//! Shared utilities including configuration, error handling, and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    ActivityConfig, AppConfig, BackoffConfig, ConfigError, DiscordConfig, GatewayConfig, Peer,
    PresenceStatus, ServerConfig, VoiceConfig,
};
pub use error::{AppError, AppResult};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};

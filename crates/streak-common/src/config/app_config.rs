//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use super::Peer;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub discord: DiscordConfig,
    pub gateway: GatewayConfig,
    pub health: ServerConfig,
}

/// Account credentials, presence status and voice targets
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub token: String,
    pub status: PresenceStatus,
    pub servers: Vec<Peer>,
}

/// Presence status sent in the identify payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    #[default]
    Online,
    Idle,
    Dnd,
}

impl PresenceStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Idle => "idle",
            Self::Dnd => "dnd",
        }
    }
}

impl FromStr for PresenceStatus {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "idle" => Ok(Self::Idle),
            "dnd" => Ok(Self::Dnd),
            other => Err(ConfigError::InvalidValue(
                "DISCORD_STATUS",
                format!("{other:?} (must be one of: online, idle, dnd)"),
            )),
        }
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gateway connection tuning
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// WebSocket endpoint used for fresh connections
    pub url: String,
    /// REST base URL used for the identity bootstrap
    pub api_url: String,
    pub connect_timeout: Duration,
    pub close_timeout: Duration,
    /// Minimum time between two voice joins on the same session
    pub voice_join_cooldown: Duration,
    /// Delay before retrying after a resumable invalid session
    pub resumable_retry_delay: Duration,
    pub backoff: BackoffConfig,
    pub voice: VoiceConfig,
    pub activity: ActivityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            api_url: default_api_url(),
            connect_timeout: Duration::from_millis(default_connect_timeout_ms()),
            close_timeout: Duration::from_millis(default_close_timeout_ms()),
            voice_join_cooldown: Duration::from_millis(default_voice_join_cooldown_ms()),
            resumable_retry_delay: Duration::from_millis(default_resumable_retry_ms()),
            backoff: BackoffConfig::default(),
            voice: VoiceConfig::default(),
            activity: ActivityConfig::default(),
        }
    }
}

/// Exponential backoff parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffConfig {
    pub base: Duration,
    pub max: Duration,
    /// Upper bound of the random jitter, as a fraction of the delay
    pub jitter_factor: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(default_backoff_base_ms()),
            max: Duration::from_millis(default_backoff_max_ms()),
            jitter_factor: default_backoff_jitter(),
        }
    }
}

/// Voice state flags sent with every join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceConfig {
    pub self_mute: bool,
    pub self_deaf: bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            self_mute: true,
            self_deaf: true,
        }
    }
}

/// Static activity shown in the presence payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityConfig {
    pub name: String,
    pub details: String,
    pub state: String,
    pub application_id: String,
    pub button_label: String,
    pub button_url: String,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            name: "The Void - Discord Activity Streak".to_string(),
            details: "Keep your Discord activity streak alive for 24/7".to_string(),
            state: "24/7 Online".to_string(),
            application_id: "1425827351261872219".to_string(),
            button_label: "GitHub Repository".to_string(),
            button_url: "https://github.com/getthevoid/discord-streak".to_string(),
        }
    }
}

/// HTTP listener configuration (liveness endpoint)
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_health_port(),
        }
    }
}

// Default value functions
fn default_gateway_url() -> String {
    "wss://gateway.discord.gg/?v=10&encoding=json".to_string()
}

fn default_api_url() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_health_port() -> u16 {
    8080
}

fn default_connect_timeout_ms() -> u64 {
    30_000
}

fn default_close_timeout_ms() -> u64 {
    10_000
}

fn default_voice_join_cooldown_ms() -> u64 {
    60_000
}

fn default_resumable_retry_ms() -> u64 {
    1_000
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_backoff_max_ms() -> u64 {
    60_000
}

fn default_backoff_jitter() -> f64 {
    0.1
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let millis = |key: &str, default: u64| {
            Duration::from_millis(get(key).and_then(|s| s.parse().ok()).unwrap_or(default))
        };
        let flag = |key: &str, default: bool| {
            get(key)
                .and_then(|s| match s.to_lowercase().as_str() {
                    "1" | "true" | "yes" => Some(true),
                    "0" | "false" | "no" => Some(false),
                    _ => None,
                })
                .unwrap_or(default)
        };

        let token = get("DISCORD_TOKEN").ok_or(ConfigError::MissingVar("DISCORD_TOKEN"))?;
        let status = get("DISCORD_STATUS")
            .map(|s| s.parse::<PresenceStatus>())
            .transpose()?
            .unwrap_or_default();
        let servers = Peer::parse_list(
            &get("DISCORD_SERVERS").ok_or(ConfigError::MissingVar("DISCORD_SERVERS"))?,
        )?;

        let jitter_factor = get("STREAK_BACKOFF_JITTER")
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or_else(default_backoff_jitter);
        if !(0.0..=1.0).contains(&jitter_factor) {
            return Err(ConfigError::InvalidValue(
                "STREAK_BACKOFF_JITTER",
                format!("{jitter_factor} (must be between 0 and 1)"),
            ));
        }

        let activity_defaults = ActivityConfig::default();

        Ok(Self {
            discord: DiscordConfig {
                token: token.trim().to_string(),
                status,
                servers,
            },
            gateway: GatewayConfig {
                url: get("STREAK_GATEWAY_URL").unwrap_or_else(default_gateway_url),
                api_url: get("STREAK_API_URL")
                    .map(|s| s.trim_end_matches('/').to_string())
                    .unwrap_or_else(default_api_url),
                connect_timeout: millis("STREAK_CONNECT_TIMEOUT_MS", default_connect_timeout_ms()),
                close_timeout: millis("STREAK_CLOSE_TIMEOUT_MS", default_close_timeout_ms()),
                voice_join_cooldown: millis(
                    "STREAK_VOICE_JOIN_COOLDOWN_MS",
                    default_voice_join_cooldown_ms(),
                ),
                resumable_retry_delay: millis(
                    "STREAK_RESUMABLE_RETRY_MS",
                    default_resumable_retry_ms(),
                ),
                backoff: BackoffConfig {
                    base: millis("STREAK_BACKOFF_BASE_MS", default_backoff_base_ms()),
                    max: millis("STREAK_BACKOFF_MAX_MS", default_backoff_max_ms()),
                    jitter_factor,
                },
                voice: VoiceConfig {
                    self_mute: flag("STREAK_SELF_MUTE", true),
                    self_deaf: flag("STREAK_SELF_DEAF", true),
                },
                activity: ActivityConfig {
                    name: get("STREAK_ACTIVITY_NAME").unwrap_or(activity_defaults.name),
                    details: get("STREAK_ACTIVITY_DETAILS").unwrap_or(activity_defaults.details),
                    state: get("STREAK_ACTIVITY_STATE").unwrap_or(activity_defaults.state),
                    application_id: get("STREAK_ACTIVITY_APP_ID")
                        .unwrap_or(activity_defaults.application_id),
                    button_label: get("STREAK_ACTIVITY_BUTTON_LABEL")
                        .unwrap_or(activity_defaults.button_label),
                    button_url: get("STREAK_ACTIVITY_BUTTON_URL")
                        .unwrap_or(activity_defaults.button_url),
                },
            },
            health: ServerConfig {
                host: get("HEALTH_HOST").unwrap_or_else(default_host),
                port: get("HEALTH_PORT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_health_port),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

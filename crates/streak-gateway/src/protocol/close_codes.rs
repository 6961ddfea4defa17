//! Gateway close codes
//!
//! Codes in the 4000 range that the gateway puts in its close frame. Anything
//! else (1000, 1006, ...) is a plain WebSocket close and has no variant here.

/// Close codes sent by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CloseCode {
    UnknownError = 4000,
    UnknownOpcode = 4001,
    DecodeError = 4002,
    /// A payload was sent before identifying
    NotAuthenticated = 4003,
    /// The token in identify was rejected
    AuthenticationFailed = 4004,
    AlreadyAuthenticated = 4005,
    /// The sequence sent with resume was invalid
    InvalidSequence = 4007,
    RateLimited = 4008,
    /// The session expired on the gateway side
    SessionTimeout = 4009,
    InvalidShard = 4010,
    ShardingRequired = 4011,
    InvalidApiVersion = 4012,
    InvalidIntents = 4013,
    DisallowedIntents = 4014,
}

impl CloseCode {
    const ALL: [Self; 14] = [
        Self::UnknownError,
        Self::UnknownOpcode,
        Self::DecodeError,
        Self::NotAuthenticated,
        Self::AuthenticationFailed,
        Self::AlreadyAuthenticated,
        Self::InvalidSequence,
        Self::RateLimited,
        Self::SessionTimeout,
        Self::InvalidShard,
        Self::ShardingRequired,
        Self::InvalidApiVersion,
        Self::InvalidIntents,
        Self::DisallowedIntents,
    ];

    /// Look up a raw close code; `None` for codes outside the gateway's table
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.as_u16() == value)
    }

    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Whether the gateway discards the session when closing with this code
    ///
    /// The next attempt must identify instead of resuming.
    #[must_use]
    pub const fn invalidates_session(self) -> bool {
        matches!(self, Self::InvalidSequence | Self::SessionTimeout)
    }

    /// Whether retrying cannot help without a configuration change
    ///
    /// The supervisor retries regardless; this only raises the log level.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed
                | Self::InvalidShard
                | Self::ShardingRequired
                | Self::InvalidApiVersion
                | Self::InvalidIntents
                | Self::DisallowedIntents
        )
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "the gateway hit an unknown error",
            Self::UnknownOpcode => "an invalid opcode was sent",
            Self::DecodeError => "a payload could not be decoded",
            Self::NotAuthenticated => "a payload was sent before identify",
            Self::AuthenticationFailed => "the token is invalid",
            Self::AlreadyAuthenticated => "identify was sent twice",
            Self::InvalidSequence => "the resume sequence is invalid",
            Self::RateLimited => "too many payloads were sent",
            Self::SessionTimeout => "the session timed out",
            Self::InvalidShard => "the shard is invalid",
            Self::ShardingRequired => "the account requires sharding",
            Self::InvalidApiVersion => "the gateway version is invalid",
            Self::InvalidIntents => "the intents are invalid",
            Self::DisallowedIntents => "the intents are not allowed",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?}: {}", self.as_u16(), self, self.description())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}

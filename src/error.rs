use thiserror::Error;

use crate::types::{Mode, RecordId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum NameRejection {
    #[error("name must be 2-16 characters")]
    Length,
    #[error("name contains unsupported characters")]
    Charset,
    #[error("name is not allowed")]
    BlockedTerm,
}

impl NameRejection {
    pub fn code(self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Charset => "charset",
            Self::BlockedTerm => "blocked-term",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ResultRejection {
    #[error("not an integer")]
    NotInteger,
    #[error("out of allowed range")]
    Range,
}

impl ResultRejection {
    pub fn code(self) -> &'static str {
        match self {
            Self::NotInteger => "not-integer",
            Self::Range => "range",
        }
    }
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("invalid mode: {value:?}")]
    InvalidMode { value: String },

    #[error("invalid player name: {0}")]
    InvalidName(NameRejection),

    #[error("invalid result: {field} {reason}")]
    InvalidResult {
        field: &'static str,
        reason: ResultRejection,
    },

    #[error("persistence failure: {message}")]
    Persistence { message: String },

    #[error("removal not authorized")]
    Unauthorized,

    #[error("missing record id")]
    MissingId,

    #[error("malformed request: {message}")]
    MalformedRequest { message: String },
}

impl LeaderboardError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidMode { .. } => "invalid-mode",
            Self::InvalidName(_) => "invalid-name",
            Self::InvalidResult { .. } => "invalid-result",
            Self::Persistence { .. } => "persistence",
            Self::Unauthorized => "unauthorized",
            Self::MissingId => "missing-id",
            Self::MalformedRequest { .. } => "malformed-request",
        }
    }

    /// Sub-reason for validation failures.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::InvalidName(rejection) => Some(rejection.code()),
            Self::InvalidResult { reason, .. } => Some(reason.code()),
            _ => None,
        }
    }

    /// True for errors the caller can fix by changing its input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidMode { .. }
                | Self::InvalidName(_)
                | Self::InvalidResult { .. }
                | Self::MissingId
                | Self::MalformedRequest { .. }
        )
    }
}

impl From<NameRejection> for LeaderboardError {
    fn from(rejection: NameRejection) -> Self {
        Self::InvalidName(rejection)
    }
}

impl From<GatewayError> for LeaderboardError {
    fn from(error: GatewayError) -> Self {
        Self::Persistence {
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("record already exists for {player_name:?} in {mode}")]
    Conflict { mode: Mode, player_name: String },

    #[error("record not found: {id}")]
    NotFound { id: RecordId },

    #[error("{message}")]
    Storage { message: String },
}

impl From<std::io::Error> for GatewayError {
    fn from(error: std::io::Error) -> Self {
        Self::Storage {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        Self::Storage {
            message: error.to_string(),
        }
    }
}

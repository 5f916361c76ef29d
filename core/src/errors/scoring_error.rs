// core/src/errors/scoring_error.rs
use thiserror::Error;

/// Failure of a single scoring exchange.
///
/// Cloneable because one in-flight result is handed to every navigation
/// waiting on the same URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("network error: {message}")]
    Network { message: String, timeout: bool },

    #[error("scoring service returned status {status}")]
    Service { status: u16, body_snippet: String },

    #[error("malformed scoring payload: {0}")]
    Parse(String),
}

impl ScoringError {
    pub fn network(message: impl Into<String>) -> Self {
        ScoringError::Network {
            message: message.into(),
            timeout: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        ScoringError::Network {
            message: message.into(),
            timeout: true,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ScoringError::Network { .. } => "network",
            ScoringError::Service { .. } => "service",
            ScoringError::Parse(_) => "parse",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ScoringError::Network { timeout: true, .. })
    }
}

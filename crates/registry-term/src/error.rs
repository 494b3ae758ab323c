//! Error types for the registry term guard.

use crate::codec::CodecError;
use crate::validate::Rejection;

/// Guard errors.
///
/// Both kinds are fatal for the request that produced the bytes; neither
/// carries a partially decoded value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GuardError {
    /// Bytes are not a valid encoded term.
    #[error("received malformed data: {reason}")]
    MalformedInput { reason: String },

    /// Bytes decode, but the term contains a disallowed kind.
    #[error("received unsafe or malformed data: {reason}")]
    UnsafeOrMalformed { reason: String },
}

impl GuardError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MalformedInput { .. } => 6,
            Self::UnsafeOrMalformed { .. } => 6,
        }
    }

    /// Whether the error is retryable.
    ///
    /// Always false: re-requesting the same bytes yields the same verdict.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Message shown to end users, identical for both kinds.
    pub fn user_message(&self) -> &'static str {
        "received malformed data from the registry"
    }

    /// Underlying reason, for logs.
    pub fn reason(&self) -> &str {
        match self {
            Self::MalformedInput { reason } | Self::UnsafeOrMalformed { reason } => reason,
        }
    }
}

impl From<CodecError> for GuardError {
    fn from(err: CodecError) -> Self {
        Self::MalformedInput {
            reason: err.to_string(),
        }
    }
}

impl From<Rejection> for GuardError {
    fn from(err: Rejection) -> Self {
        Self::UnsafeOrMalformed {
            reason: err.to_string(),
        }
    }
}

/// Result type for guard operations.
pub type GuardResult<T> = Result<T, GuardError>;

//! Shared error type across vault-usage crates.

use thiserror::Error;

/// Error taxonomy used for logging and for deciding whether a backend
/// response resolves to an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The backend reports the endpoint as absent (404).
    AbsentFeature,
    /// The token lacks the capability (403).
    PermissionDenied,
    /// Transport failure, unexpected status, or malformed body.
    Backend,
    /// Refresh deadline elapsed or shutdown cancelled the cycle.
    Deadline,
    /// Configuration rejected at load or construction time.
    Config,
    /// Anything else.
    Internal,
}

impl ErrorClass {
    /// Stable label used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorClass::AbsentFeature => "absent_feature",
            ErrorClass::PermissionDenied => "permission_denied",
            ErrorClass::Backend => "backend",
            ErrorClass::Deadline => "deadline",
            ErrorClass::Config => "config",
            ErrorClass::Internal => "internal",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, VaultUsageError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum VaultUsageError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    Forbidden(String),
    #[error("vault returned {status} for {path}: {message}")]
    Status {
        status: u16,
        path: String,
        message: String,
    },
    #[error("transport: {0}")]
    Transport(String),
    #[error("decode: {0}")]
    Decode(String),
    #[error("refresh deadline exceeded")]
    DeadlineExceeded,
    #[error("cancelled")]
    Cancelled,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl VaultUsageError {
    /// Map to the error taxonomy.
    pub fn class(&self) -> ErrorClass {
        match self {
            VaultUsageError::NotFound(_) => ErrorClass::AbsentFeature,
            VaultUsageError::Forbidden(_) => ErrorClass::PermissionDenied,
            VaultUsageError::Status { .. }
            | VaultUsageError::Transport(_)
            | VaultUsageError::Decode(_) => ErrorClass::Backend,
            VaultUsageError::DeadlineExceeded | VaultUsageError::Cancelled => ErrorClass::Deadline,
            VaultUsageError::MissingField(_)
            | VaultUsageError::InvalidConfig(_)
            | VaultUsageError::UnsupportedVersion => ErrorClass::Config,
            VaultUsageError::Internal(_) => ErrorClass::Internal,
        }
    }

    /// 404 from the backend.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VaultUsageError::NotFound(_))
    }

    /// 404 or 403: nothing visible at this path for the current token.
    pub fn is_not_visible(&self) -> bool {
        matches!(
            self,
            VaultUsageError::NotFound(_) | VaultUsageError::Forbidden(_)
        )
    }
}

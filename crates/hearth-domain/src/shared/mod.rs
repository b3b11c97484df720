use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod clock;
pub mod transaction;
pub use clock::{FixedClock, ReferenceClock};
pub use transaction::{StreakTransaction, TransactionContext, UnitOfWork, UnitOfWorkError};

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn from_string(s: &str) -> Self {
                Self(s.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

define_id!(UserId);
define_id!(RuleId);
define_id!(TaskId);

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Resource Not Found (2xxx)
    UserNotFound = 2001,
    UnknownRule = 2002,
    NotFound = 2003,

    // Business Logic (3xxx)
    InvalidDate = 3001,
    AlreadyClaimed = 3002,
    NotEligible = 3003,

    // Data & Persistence (4xxx)
    RepositoryError = 4001,
    StorageConflict = 4002,
    DataIntegrityError = 4003,
    SerializationError = 4004,

    // Infrastructure (5xxx)
    InfrastructureError = 5001,
    TimeoutError = 5003,

    // Validation (6xxx)
    ValidationError = 6001,
    InvalidInput = 6002,
}

impl ErrorCode {
    /// Get error code as integer
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorCode::AlreadyClaimed
            | ErrorCode::NotEligible
            | ErrorCode::InvalidDate
            | ErrorCode::StorageConflict => ErrorSeverity::Warning,

            ErrorCode::UserNotFound
            | ErrorCode::UnknownRule
            | ErrorCode::NotFound
            | ErrorCode::ValidationError
            | ErrorCode::InvalidInput => ErrorSeverity::Info,

            ErrorCode::DataIntegrityError
            | ErrorCode::RepositoryError
            | ErrorCode::InfrastructureError => ErrorSeverity::Error,

            _ => ErrorSeverity::Warning,
        }
    }

    /// Check if error is recoverable
    ///
    /// A recoverable error means the caller should re-read state and treat
    /// the operation as already applied (or retry it).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ErrorCode::StorageConflict | ErrorCode::TimeoutError)
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Reward already claimed: {0}")]
    AlreadyClaimed(String),

    #[error("Reward not eligible: {0}")]
    NotEligible(String),

    #[error("Unknown reward rule: {0}")]
    UnknownRule(String),

    #[error("Storage conflict: {0}")]
    StorageConflict(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl DomainError {
    /// Get error code
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::InvalidDate(_) => ErrorCode::InvalidDate,
            DomainError::AlreadyClaimed(_) => ErrorCode::AlreadyClaimed,
            DomainError::NotEligible(_) => ErrorCode::NotEligible,
            DomainError::UnknownRule(_) => ErrorCode::UnknownRule,
            DomainError::StorageConflict(_) => ErrorCode::StorageConflict,
            DomainError::UserNotFound(_) => ErrorCode::UserNotFound,
            DomainError::Repository(_) => ErrorCode::RepositoryError,
            DomainError::Infrastructure(_) => ErrorCode::InfrastructureError,
            DomainError::Validation(_) => ErrorCode::ValidationError,
            DomainError::DataIntegrity(_) => ErrorCode::DataIntegrityError,
            DomainError::InvalidInput(_) => ErrorCode::InvalidInput,
            DomainError::Serialization(_) => ErrorCode::SerializationError,
            DomainError::NotFound(_) => ErrorCode::NotFound,
        }
    }

    /// Get error message
    pub fn message(&self) -> &str {
        match self {
            DomainError::InvalidDate(msg)
            | DomainError::AlreadyClaimed(msg)
            | DomainError::NotEligible(msg)
            | DomainError::UnknownRule(msg)
            | DomainError::StorageConflict(msg)
            | DomainError::UserNotFound(msg)
            | DomainError::Repository(msg)
            | DomainError::Infrastructure(msg)
            | DomainError::Validation(msg)
            | DomainError::DataIntegrity(msg)
            | DomainError::InvalidInput(msg)
            | DomainError::Serialization(msg)
            | DomainError::NotFound(msg) => msg,
        }
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        self.code().severity()
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        self.code().is_recoverable()
    }

    /// A losing concurrent writer; the write it attempted has effectively
    /// been applied by someone else.
    pub fn is_storage_conflict(&self) -> bool {
        matches!(self, DomainError::StorageConflict(_))
    }

    /// Format error with code
    pub fn format_with_code(&self) -> String {
        format!("[{}] {}", self.code().code(), self)
    }
}

impl From<UnitOfWorkError> for DomainError {
    fn from(err: UnitOfWorkError) -> Self {
        match err {
            UnitOfWorkError::Conflict(msg) => DomainError::StorageConflict(msg),
            other => DomainError::Repository(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_conflict_is_recoverable() {
        let err = DomainError::StorageConflict("date_ledger".to_string());
        assert!(err.is_recoverable());
        assert!(err.is_storage_conflict());
        assert_eq!(err.code(), ErrorCode::StorageConflict);
    }

    #[test]
    fn test_business_errors_are_not_recoverable() {
        for err in [
            DomainError::InvalidDate("today".to_string()),
            DomainError::AlreadyClaimed("cycle".to_string()),
            DomainError::NotEligible("cycle".to_string()),
            DomainError::UnknownRule("gone".to_string()),
        ] {
            assert!(!err.is_recoverable(), "{err} should not be recoverable");
        }
    }

    #[test]
    fn test_format_with_code() {
        let err = DomainError::AlreadyClaimed("rule-1#3".to_string());
        assert_eq!(
            err.format_with_code(),
            "[3002] Reward already claimed: rule-1#3"
        );
        assert_eq!(err.message(), "rule-1#3");
    }

    #[test]
    fn test_unit_of_work_conflict_maps_to_storage_conflict() {
        let err: DomainError = UnitOfWorkError::Conflict("database is locked".to_string()).into();
        assert!(err.is_storage_conflict());

        let err: DomainError = UnitOfWorkError::CommitFailed("disk I/O".to_string()).into();
        assert_eq!(err.code(), ErrorCode::RepositoryError);
    }
}

//! Error types for Modkit operations

use crate::EntityKind;
use thiserror::Error;

/// Entity store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A record failed validation (uniqueness, required reference, shape).
    #[error("Invalid {kind} record: {reason}")]
    RecordInvalid { kind: EntityKind, reason: String },

    #[error("Entity not found: {kind} with id {id}")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub fn invalid(kind: EntityKind, reason: impl Into<String>) -> Self {
        StoreError::RecordInvalid {
            kind,
            reason: reason.into(),
        }
    }
}

/// Configuration and rule errors, raised before any store interaction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid transition rule: {reason}")]
    InvalidRule { reason: String },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn invalid_rule(reason: impl Into<String>) -> Self {
        ConfigError::InvalidRule {
            reason: reason.into(),
        }
    }
}

/// Master error type for bootstrap operations.
///
/// Callers see exactly three outcomes: success, `AlreadyBootstrapped`, or a
/// single failure describing what was wrong.
#[derive(Debug, Error)]
pub enum ModkitError {
    #[error("Some configuration data is already loaded")]
    AlreadyBootstrapped,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ModkitError {
    /// True when a record failed store validation.
    pub fn is_record_invalid(&self) -> bool {
        matches!(self, ModkitError::Store(StoreError::RecordInvalid { .. }))
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for Modkit operations.
pub type ModkitResult<T> = Result<T, ModkitError>;

// =============================================================================
// TESTS
// =============================================================================

//! Error types for the augmenter
//!
//! Two failure classes, both fatal for the whole pass:
//! - [`ValidationError`]: a user-supplied setting has the wrong type or value
//! - [`IntegrationError`]: the compiled template lacks a resource the host
//!   was supposed to produce before invoking the augmenter

use ialogs_template::LogicalId;
use serde_json::Value as JsonValue;

use crate::setting::SettingScope;
use crate::validation::VALID_RETENTION_DAYS;

/// Main augmenter error type
#[derive(Debug, thiserror::Error)]
pub enum AugmentError {
    /// Invalid user configuration
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Caller contract violation
    #[error("integration failed: {0}")]
    Integration(#[from] IntegrationError),
}

impl AugmentError {
    /// Check if error was caused by user configuration
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if error was caused by a malformed template
    #[inline]
    #[must_use]
    pub fn is_integration(&self) -> bool {
        matches!(self, Self::Integration(_))
    }
}

/// Invalid configuration value
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// `infrequentAccessLogs` is not a boolean
    #[error("{scope}: infrequentAccessLogs must be either boolean true or false (got {value})")]
    InvalidBoolean { scope: SettingScope, value: JsonValue },

    /// `infrequentAccessLogRetention` is not one of the permitted periods
    #[error(
        "{scope}: infrequentAccessLogRetention must be one of {} (got {value})",
        permitted_retention_list()
    )]
    InvalidRetention { scope: SettingScope, value: JsonValue },
}

impl ValidationError {
    /// Scope the offending value was read from
    #[must_use]
    pub fn scope(&self) -> &SettingScope {
        match self {
            Self::InvalidBoolean { scope, .. } | Self::InvalidRetention { scope, .. } => scope,
        }
    }

    /// The offending value
    #[must_use]
    pub fn value(&self) -> &JsonValue {
        match self {
            Self::InvalidBoolean { value, .. } | Self::InvalidRetention { value, .. } => value,
        }
    }
}

fn permitted_retention_list() -> String {
    VALID_RETENTION_DAYS
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Template does not contain what the host's compile step should have produced
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrationError {
    /// Naming translation produced an id absent from the template
    #[error("function '{function}': compute resource '{logical_id}' not found in template")]
    MissingComputeResource {
        function: String,
        logical_id: LogicalId,
    },

    /// Naming translation produced an id that is not a function node
    #[error("function '{function}': resource '{logical_id}' is a {found}, expected a function")]
    NotAFunction {
        function: String,
        logical_id: LogicalId,
        found: String,
    },

    /// Function references a role that is absent from the template
    #[error("function '{function}': execution role '{logical_id}' not found in template")]
    MissingRole {
        function: String,
        logical_id: LogicalId,
    },

    /// Function references a node that is not a role
    #[error("function '{function}': resource '{logical_id}' is a {found}, expected a role")]
    NotARole {
        function: String,
        logical_id: LogicalId,
        found: String,
    },

    /// A synthesized log group id collides with a node another function needs
    #[error(
        "function '{function}': log group '{logical_id}' would replace a resource used by function '{owner}'"
    )]
    LogGroupIdClash {
        function: String,
        logical_id: LogicalId,
        owner: String,
    },
}

/// Result type alias for augmenter operations
pub type AugmentResult<T> = Result<T, AugmentError>;

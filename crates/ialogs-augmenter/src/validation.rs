//! Validation primitives for user settings

use std::fmt::{self, Display, Formatter};

use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ValidationError;
use crate::setting::SettingScope;

/// Retention periods, in days, accepted by CloudWatch Logs
pub const VALID_RETENTION_DAYS: [u32; 22] = [
    1, 3, 5, 7, 14, 30, 60, 90, 120, 150, 180, 365, 400, 545, 731, 1096, 1827, 2192, 2557, 2922,
    3288, 3653,
];

/// A retention period known to be in [`VALID_RETENTION_DAYS`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct RetentionDays(u32);

impl RetentionDays {
    /// Number of days
    #[inline]
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Check whether `days` is a permitted retention period
    #[inline]
    #[must_use]
    pub fn is_permitted(days: u32) -> bool {
        VALID_RETENTION_DAYS.contains(&days)
    }
}

impl TryFrom<u32> for RetentionDays {
    type Error = String;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        if Self::is_permitted(days) {
            Ok(Self(days))
        } else {
            Err(format!("{days} is not a permitted retention period"))
        }
    }
}

impl From<RetentionDays> for u32 {
    fn from(days: RetentionDays) -> Self {
        days.0
    }
}

impl Display for RetentionDays {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} days", self.0)
    }
}

impl JsonSchema for RetentionDays {
    fn schema_name() -> String {
        "RetentionDays".to_string()
    }

    fn is_referenceable() -> bool {
        false
    }

    fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::Integer.into()),
            enum_values: Some(VALID_RETENTION_DAYS.iter().map(|days| JsonValue::from(*days)).collect()),
            ..SchemaObject::default()
        }
        .into()
    }
}

/// Accept only a genuine boolean
///
/// # Errors
/// Returns [`ValidationError::InvalidBoolean`] for any other JSON type,
/// including strings such as `"false"`.
pub fn validate_boolean(value: &JsonValue, scope: &SettingScope) -> Result<bool, ValidationError> {
    value.as_bool().ok_or_else(|| ValidationError::InvalidBoolean {
        scope: scope.clone(),
        value: value.clone(),
    })
}

/// Accept only a number from [`VALID_RETENTION_DAYS`]
///
/// Whole-valued floats (`7.0`, as some YAML emitters write) are accepted.
///
/// # Errors
/// Returns [`ValidationError::InvalidRetention`] for non-numbers, fractional
/// numbers and numbers outside the permitted set.
pub fn validate_retention(
    value: &JsonValue,
    scope: &SettingScope,
) -> Result<RetentionDays, ValidationError> {
    whole_days(value)
        .and_then(|days| RetentionDays::try_from(days).ok())
        .ok_or_else(|| ValidationError::InvalidRetention {
            scope: scope.clone(),
            value: value.clone(),
        })
}

#[allow(clippy::float_cmp)]
fn whole_days(value: &JsonValue) -> Option<u32> {
    if let Some(days) = value.as_u64() {
        return u32::try_from(days).ok();
    }
    let days = value.as_f64()?;
    VALID_RETENTION_DAYS
        .iter()
        .copied()
        .find(|&permitted| f64::from(permitted) == days)
}

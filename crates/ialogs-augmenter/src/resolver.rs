//! Settings resolution
//!
//! Turns the raw `custom` block and per-function blocks into one [`Decision`]
//! per function. Local settings override global ones field by field, and only
//! when the local key is present.

use serde_json::Value as JsonValue;

use crate::config::{FunctionConfig, GlobalSettings};
use crate::error::ValidationError;
use crate::setting::{Setting, SettingScope};
use crate::validation::{validate_boolean, validate_retention, RetentionDays};

/// Resolved settings for one function (or the service-wide defaults)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decision {
    /// Route the function's logs to the infrequent-access log group
    pub enrolled: bool,

    /// `None` means entries never expire
    pub retention: Option<RetentionDays>,
}

/// Resolve service-wide defaults
///
/// Missing `custom` block or missing enrollment key ⇒ not enrolled.
/// Missing or falsy retention (`null`, `0`, `false`, `""`) ⇒ never expires.
///
/// # Errors
/// Returns [`ValidationError`] if a present value is invalid.
pub fn resolve_global(custom: Option<&GlobalSettings>) -> Result<Decision, ValidationError> {
    let Some(custom) = custom else {
        return Ok(Decision::default());
    };

    let scope = SettingScope::Global;
    Ok(Decision {
        enrolled: explicit_enrollment(&custom.infrequent_access_logs, &scope)?.unwrap_or(false),
        retention: explicit_retention(&custom.infrequent_access_log_retention, &scope)?,
    })
}

/// Resolve one function's settings against the service-wide defaults
///
/// # Errors
/// Returns [`ValidationError`] naming the function if a present value is
/// invalid.
pub fn resolve_function(
    function_name: &str,
    config: &FunctionConfig,
    global: Decision,
) -> Result<Decision, ValidationError> {
    let scope = SettingScope::function(function_name);

    let enrolled = explicit_enrollment(&config.infrequent_access_logs, &scope)?;
    let retention = explicit_retention(&config.infrequent_access_log_retention, &scope)?;

    let decision = Decision {
        enrolled: enrolled.unwrap_or(global.enrolled),
        retention: retention.or(global.retention),
    };
    tracing::debug!(
        "Resolved {}: enrolled={} (local: {}), retention={:?} (local: {})",
        function_name,
        decision.enrolled,
        enrolled.is_some(),
        decision.retention.map(u32::from),
        retention.is_some()
    );
    Ok(decision)
}

/// Any present value, `null` included, must be a boolean
fn explicit_enrollment(
    setting: &Setting,
    scope: &SettingScope,
) -> Result<Option<bool>, ValidationError> {
    setting
        .value()
        .map(|value| validate_boolean(value, scope))
        .transpose()
}

/// Falsy values (`null`, `0`, `false`, `""`) count as not set; every other
/// present value must be a permitted period
fn explicit_retention(
    setting: &Setting,
    scope: &SettingScope,
) -> Result<Option<RetentionDays>, ValidationError> {
    setting
        .truthy_value()
        .map(|value: &JsonValue| validate_retention(value, scope))
        .transpose()
}

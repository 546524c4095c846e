//! Service description and augmenter options
//!
//! [`ServiceConfig`] is the in-memory service description the host hands over:
//! declared functions, the optional `custom` block, and the compiled template.
//! Keys the augmenter does not read are kept in `extra` maps.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use ialogs_template::{Template, TemplateError};

use crate::setting::Setting;

/// Settings block of one function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionConfig {
    /// Deployed display name (e.g. `svc-dev-func1`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Setting::is_absent")]
    pub infrequent_access_logs: Setting,

    #[serde(default, skip_serializing_if = "Setting::is_absent")]
    pub infrequent_access_log_retention: Setting,

    /// `handler`, `events`, `memorySize`, ...
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl FunctionConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With display name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// With raw `infrequentAccessLogs` value
    #[inline]
    #[must_use]
    pub fn with_infrequent_access(mut self, value: impl Into<JsonValue>) -> Self {
        self.infrequent_access_logs = Setting::present(value);
        self
    }

    /// With raw `infrequentAccessLogRetention` value
    #[inline]
    #[must_use]
    pub fn with_retention(mut self, value: impl Into<JsonValue>) -> Self {
        self.infrequent_access_log_retention = Setting::present(value);
        self
    }
}

/// Service-wide defaults read from the `custom` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    #[serde(default, skip_serializing_if = "Setting::is_absent")]
    pub infrequent_access_logs: Setting,

    #[serde(default, skip_serializing_if = "Setting::is_absent")]
    pub infrequent_access_log_retention: Setting,

    /// Settings of other plugins sharing the `custom` block
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl GlobalSettings {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With raw `infrequentAccessLogs` value
    #[inline]
    #[must_use]
    pub fn with_infrequent_access(mut self, value: impl Into<JsonValue>) -> Self {
        self.infrequent_access_logs = Setting::present(value);
        self
    }

    /// With raw `infrequentAccessLogRetention` value
    #[inline]
    #[must_use]
    pub fn with_retention(mut self, value: impl Into<JsonValue>) -> Self {
        self.infrequent_access_log_retention = Setting::present(value);
        self
    }
}

/// Service description for one compile pass
///
/// Functions are processed in the insertion order of `functions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    #[serde(default)]
    pub functions: IndexMap<String, FunctionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<GlobalSettings>,

    /// Compiled resource graph, mutated in place
    #[serde(default)]
    pub template: Template,
}

impl ServiceConfig {
    /// Create service description around a compiled template
    #[inline]
    #[must_use]
    pub fn new(template: Template) -> Self {
        Self {
            functions: IndexMap::new(),
            custom: None,
            template,
        }
    }

    /// Parse from JSON string
    ///
    /// # Errors
    /// Returns error if JSON is invalid or the template is malformed
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from YAML string
    ///
    /// # Errors
    /// Returns error if YAML is invalid or the template is malformed
    pub fn from_yaml(yaml: &str) -> Result<Self, TemplateError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Build from an already-parsed JSON value
    ///
    /// # Errors
    /// Returns error if the value does not have the service shape
    pub fn from_value(value: JsonValue) -> Result<Self, TemplateError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Add a function, keeping declaration order
    #[inline]
    #[must_use]
    pub fn with_function(mut self, name: impl Into<String>, config: FunctionConfig) -> Self {
        self.functions.insert(name.into(), config);
        self
    }

    /// With `custom` block
    #[inline]
    #[must_use]
    pub fn with_custom(mut self, custom: GlobalSettings) -> Self {
        self.custom = Some(custom);
        self
    }
}

/// How the log group's physical name is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogGroupNaming {
    /// `/aws/lambda/plugin/ia/<function key>`
    #[default]
    FunctionKey,

    /// `/aws/lambda/plugin/ia/<function display name>`, falling back to the key
    DisplayName,
}

/// Augmenter behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AugmenterOptions {
    pub log_group_naming: LogGroupNaming,

    /// Append log-write permissions to enrolled functions' execution roles
    pub grant_role_permissions: bool,
}

impl AugmenterOptions {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Display-name log paths plus role grants
    #[inline]
    #[must_use]
    pub fn extended() -> Self {
        Self {
            log_group_naming: LogGroupNaming::DisplayName,
            grant_role_permissions: true,
        }
    }

    /// With log group naming scheme
    #[inline]
    #[must_use]
    pub fn with_log_group_naming(mut self, naming: LogGroupNaming) -> Self {
        self.log_group_naming = naming;
        self
    }

    /// With role grants enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_role_grants(mut self, enabled: bool) -> Self {
        self.grant_role_permissions = enabled;
        self
    }

    /// Parse from JSON string
    ///
    /// # Errors
    /// Returns error if JSON is invalid
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from YAML string
    ///
    /// # Errors
    /// Returns error if YAML is invalid
    pub fn from_yaml(yaml: &str) -> Result<Self, TemplateError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn service_from_yaml_keeps_function_order() {
        let yaml = r"
functions:
  zeta:
    handler: zeta.handler
  alpha:
    handler: alpha.handler
    infrequentAccessLogs: false
  mid:
    name: svc-dev-mid
    infrequentAccessLogRetention: 7
custom:
  infrequentAccessLogs: true
  otherPlugin:
    enabled: true
";
        let service = ServiceConfig::from_yaml(yaml).unwrap();

        let names: Vec<_> = service.functions.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);

        assert!(service.functions["zeta"].infrequent_access_logs.is_absent());
        assert_eq!(service.functions["alpha"].infrequent_access_logs, Setting::present(false));
        assert_eq!(service.functions["mid"].name.as_deref(), Some("svc-dev-mid"));
        assert_eq!(service.functions["zeta"].extra.get("handler"), Some(&json!("zeta.handler")));

        let custom = service.custom.unwrap();
        assert_eq!(custom.infrequent_access_logs, Setting::present(true));
        assert!(custom.extra.contains_key("otherPlugin"));
        assert!(!service.template.has_resources());
    }

    #[test]
    fn function_config_round_trips() {
        let input = json!({
            "handler": "h.main",
            "infrequentAccessLogs": "yes",
            "infrequentAccessLogRetention": 30
        });
        let config: FunctionConfig = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(serde_json::to_value(&config).unwrap(), input);
    }

    #[test]
    fn builders_set_present_values() {
        let config = FunctionConfig::new().with_infrequent_access(true).with_retention(14);
        assert_eq!(config.infrequent_access_logs, Setting::present(true));
        assert_eq!(config.infrequent_access_log_retention, Setting::present(14));
    }

    #[test]
    fn options_defaults_and_parsing() {
        assert_eq!(
            AugmenterOptions::default(),
            AugmenterOptions {
                log_group_naming: LogGroupNaming::FunctionKey,
                grant_role_permissions: false
            }
        );

        let options = AugmenterOptions::from_json(r#"{"logGroupNaming": "displayName"}"#).unwrap();
        assert_eq!(options.log_group_naming, LogGroupNaming::DisplayName);
        assert!(!options.grant_role_permissions);

        let options = AugmenterOptions::from_yaml("grantRolePermissions: true\n").unwrap();
        assert_eq!(options, AugmenterOptions::new().with_role_grants(true));
    }
}

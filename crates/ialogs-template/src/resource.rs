//! Typed resource nodes
//!
//! A template's resources are kept as a tagged variant per kind. The kinds the
//! augmenter reads and writes ([`FunctionResource`], [`LogGroupResource`],
//! [`RoleResource`]) get a fixed schema; every other resource is carried
//! verbatim in [`ResourceNode::Other`].
//!
//! Conversion goes through [`serde_json::Value`], dispatching on the `Type`
//! key. Keys the typed forms do not model are preserved in their `extra` maps.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::TemplateError;
use crate::logical_id::LogicalId;
use crate::policy::{InlinePolicy, PolicyStatement, RolePolicy};
use crate::serde_util::one_or_many;

/// `Type` of a Lambda function resource
pub const FUNCTION_TYPE: &str = "AWS::Lambda::Function";

/// `Type` of a CloudWatch log group resource
pub const LOG_GROUP_TYPE: &str = "AWS::Logs::LogGroup";

/// `Type` of an IAM role resource
pub const ROLE_TYPE: &str = "AWS::IAM::Role";

const TYPE_KEY: &str = "Type";

/// A resource in the template graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JsonValue", into = "JsonValue")]
pub enum ResourceNode {
    /// Compute node (`AWS::Lambda::Function`)
    Function(FunctionResource),

    /// Log group (`AWS::Logs::LogGroup`)
    LogGroup(LogGroupResource),

    /// Execution role (`AWS::IAM::Role`)
    Role(RoleResource),

    /// Any other resource, kept verbatim
    Other(JsonValue),
}

impl ResourceNode {
    /// CloudFormation type of this node, if known
    #[must_use]
    pub fn resource_type(&self) -> Option<&str> {
        match self {
            Self::Function(_) => Some(FUNCTION_TYPE),
            Self::LogGroup(_) => Some(LOG_GROUP_TYPE),
            Self::Role(_) => Some(ROLE_TYPE),
            Self::Other(value) => value.get(TYPE_KEY).and_then(JsonValue::as_str),
        }
    }

    /// Short human-readable kind, used in diagnostics
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Function(_) => "function",
            Self::LogGroup(_) => "logGroup",
            Self::Role(_) => "role",
            Self::Other(_) => self.resource_type().unwrap_or("untyped"),
        }
    }

    #[inline]
    #[must_use]
    pub fn as_function(&self) -> Option<&FunctionResource> {
        match self {
            Self::Function(function) => Some(function),
            _ => None,
        }
    }

    #[inline]
    pub fn as_function_mut(&mut self) -> Option<&mut FunctionResource> {
        match self {
            Self::Function(function) => Some(function),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_log_group(&self) -> Option<&LogGroupResource> {
        match self {
            Self::LogGroup(log_group) => Some(log_group),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_role(&self) -> Option<&RoleResource> {
        match self {
            Self::Role(role) => Some(role),
            _ => None,
        }
    }

    #[inline]
    pub fn as_role_mut(&mut self) -> Option<&mut RoleResource> {
        match self {
            Self::Role(role) => Some(role),
            _ => None,
        }
    }
}

impl TryFrom<JsonValue> for ResourceNode {
    type Error = TemplateError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        let JsonValue::Object(mut map) = value else {
            return Err(TemplateError::NotAnObject(value.to_string()));
        };

        let resource_type = map.get(TYPE_KEY).and_then(JsonValue::as_str).map(str::to_owned);
        match resource_type.as_deref() {
            Some(FUNCTION_TYPE) => {
                map.remove(TYPE_KEY);
                typed(FUNCTION_TYPE, map).map(Self::Function)
            }
            Some(LOG_GROUP_TYPE) => {
                map.remove(TYPE_KEY);
                typed(LOG_GROUP_TYPE, map).map(Self::LogGroup)
            }
            Some(ROLE_TYPE) => {
                map.remove(TYPE_KEY);
                typed(ROLE_TYPE, map).map(Self::Role)
            }
            _ => Ok(Self::Other(JsonValue::Object(map))),
        }
    }
}

fn typed<T: serde::de::DeserializeOwned>(
    resource_type: &str,
    body: Map<String, JsonValue>,
) -> Result<T, TemplateError> {
    serde_json::from_value(JsonValue::Object(body))
        .map_err(|e| TemplateError::malformed(resource_type, e.to_string()))
}

impl From<ResourceNode> for JsonValue {
    fn from(node: ResourceNode) -> Self {
        let (resource_type, body) = match node {
            ResourceNode::Function(function) => (FUNCTION_TYPE, to_object(&function)),
            ResourceNode::LogGroup(log_group) => (LOG_GROUP_TYPE, to_object(&log_group)),
            ResourceNode::Role(role) => (ROLE_TYPE, to_object(&role)),
            ResourceNode::Other(value) => return value,
        };

        let mut map = Map::with_capacity(body.len() + 1);
        map.insert(TYPE_KEY.to_string(), JsonValue::String(resource_type.to_string()));
        map.extend(body);
        JsonValue::Object(map)
    }
}

fn to_object<T: Serialize>(value: &T) -> Map<String, JsonValue> {
    // Typed nodes only hold strings, numbers, lists and maps with string keys,
    // so serialization to a JSON object cannot fail.
    match serde_json::to_value(value) {
        Ok(JsonValue::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Lambda function node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionResource {
    /// Explicit dependencies, in declaration order
    #[serde(
        default,
        deserialize_with = "one_or_many::deserialize",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub depends_on: Vec<LogicalId>,

    #[serde(default)]
    pub properties: FunctionProperties,

    /// `Condition`, `Metadata`, `DeletionPolicy`, ...
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl FunctionResource {
    /// Put `id` at the front of `DependsOn`
    ///
    /// An existing occurrence of `id` is moved rather than duplicated, so
    /// repeated calls leave the list unchanged.
    pub fn prepend_dependency(&mut self, id: LogicalId) {
        self.depends_on.retain(|existing| existing != &id);
        self.depends_on.insert(0, id);
    }

    #[inline]
    #[must_use]
    pub fn depends_on(&self, id: &str) -> bool {
        self.depends_on.iter().any(|existing| existing == id)
    }
}

/// Properties of a Lambda function node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging_config: Option<LoggingConfig>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl FunctionProperties {
    /// Point the function's logging configuration at `log_group`
    ///
    /// Other logging settings (`LogFormat`, log levels) are kept.
    pub fn set_log_group(&mut self, log_group: impl Into<String>) {
        self.logging_config
            .get_or_insert_with(LoggingConfig::default)
            .log_group = Some(JsonValue::String(log_group.into()));
    }
}

/// `Properties.LoggingConfig` of a Lambda function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_group: Option<JsonValue>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl LoggingConfig {
    /// Literal log group reference, if one is set
    #[inline]
    #[must_use]
    pub fn log_group_str(&self) -> Option<&str> {
        self.log_group.as_ref().and_then(JsonValue::as_str)
    }
}

/// Reference from a function to its execution role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "JsonValue", into = "JsonValue")]
pub enum RoleReference {
    /// `{"Fn::GetAtt": ["RoleId", "Arn"]}` or `{"Fn::GetAtt": "RoleId.Arn"}`
    GetAtt {
        logical_id: LogicalId,
        attribute: Option<String>,
        /// Written as `"RoleId.Arn"` rather than a list
        dotted: bool,
    },

    /// `{"Ref": "RoleId"}`
    Ref(LogicalId),

    /// Literal ARN of a role defined outside the template
    Arn(String),

    /// Any other intrinsic (`Fn::ImportValue`, `Fn::Sub`, ...)
    Other(JsonValue),
}

impl RoleReference {
    /// Logical id of the role node, when the role lives in this template
    #[must_use]
    pub fn logical_id(&self) -> Option<&LogicalId> {
        match self {
            Self::GetAtt { logical_id, .. } | Self::Ref(logical_id) => Some(logical_id),
            Self::Arn(_) | Self::Other(_) => None,
        }
    }

    /// Reference to the `Arn` attribute of a role in this template
    #[must_use]
    pub fn arn_of(logical_id: impl Into<LogicalId>) -> Self {
        Self::GetAtt {
            logical_id: logical_id.into(),
            attribute: Some("Arn".to_string()),
            dotted: false,
        }
    }
}

impl From<JsonValue> for RoleReference {
    fn from(value: JsonValue) -> Self {
        match &value {
            JsonValue::String(arn) => return Self::Arn(arn.clone()),
            JsonValue::Object(map) if map.len() == 1 => {
                match (map.get("Fn::GetAtt"), map.get("Ref")) {
                    (Some(JsonValue::Array(parts)), _) => {
                        if let Some(id) = parts.first().and_then(JsonValue::as_str) {
                            return Self::GetAtt {
                                logical_id: LogicalId::new(id),
                                attribute: parts.get(1).and_then(JsonValue::as_str).map(str::to_owned),
                                dotted: false,
                            };
                        }
                    }
                    (Some(JsonValue::String(dotted)), _) => {
                        let (id, attribute) = match dotted.split_once('.') {
                            Some((id, attribute)) => (id, Some(attribute.to_string())),
                            None => (dotted.as_str(), None),
                        };
                        return Self::GetAtt {
                            logical_id: LogicalId::new(id),
                            attribute,
                            dotted: true,
                        };
                    }
                    (None, Some(JsonValue::String(id))) => return Self::Ref(LogicalId::new(id.as_str())),
                    _ => {}
                }
            }
            _ => {}
        }
        Self::Other(value)
    }
}

impl From<RoleReference> for JsonValue {
    fn from(reference: RoleReference) -> Self {
        match reference {
            RoleReference::GetAtt {
                logical_id,
                attribute,
                dotted: true,
            } => {
                let dotted = match attribute {
                    Some(attribute) => format!("{logical_id}.{attribute}"),
                    None => logical_id.into_inner(),
                };
                serde_json::json!({ "Fn::GetAtt": dotted })
            }
            RoleReference::GetAtt { logical_id, attribute, .. } => {
                let mut parts = vec![JsonValue::String(logical_id.into_inner())];
                parts.extend(attribute.map(JsonValue::String));
                serde_json::json!({ "Fn::GetAtt": parts })
            }
            RoleReference::Ref(logical_id) => serde_json::json!({ "Ref": logical_id.into_inner() }),
            RoleReference::Arn(arn) => JsonValue::String(arn),
            RoleReference::Other(value) => value,
        }
    }
}

/// CloudWatch log group node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogGroupResource {
    #[serde(default)]
    pub properties: LogGroupProperties,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl LogGroupResource {
    /// Create a log group node from its properties
    #[inline]
    #[must_use]
    pub fn new(properties: LogGroupProperties) -> Self {
        Self {
            properties,
            extra: Map::new(),
        }
    }
}

/// Properties of a log group node
///
/// An absent `RetentionInDays` means entries never expire; it is never
/// written as zero or null. `LogGroupClass` and `RetentionInDays` may hold
/// intrinsics (`Ref` to a parameter) on nodes owned by someone else, so they
/// are kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogGroupProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_group_name: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_group_class: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_in_days: Option<JsonValue>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl LogGroupProperties {
    /// Literal log group name, if one is set
    #[inline]
    #[must_use]
    pub fn name_str(&self) -> Option<&str> {
        self.log_group_name.as_ref().and_then(JsonValue::as_str)
    }

    /// Literal log group class, if one is set
    #[inline]
    #[must_use]
    pub fn class_str(&self) -> Option<&str> {
        self.log_group_class.as_ref().and_then(JsonValue::as_str)
    }

    /// Literal retention in days, if one is set
    #[inline]
    #[must_use]
    pub fn retention_days(&self) -> Option<u64> {
        self.retention_in_days.as_ref().and_then(JsonValue::as_u64)
    }
}

/// IAM role node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleResource {
    #[serde(default)]
    pub properties: RoleProperties,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Properties of an IAM role node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleProperties {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<RolePolicy>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl RoleProperties {
    /// Append `statement` to the inline policy `policy_name`, creating the
    /// policy if missing
    ///
    /// Returns `false` when an equal statement was already present.
    pub fn push_statement(&mut self, policy_name: &str, statement: PolicyStatement) -> bool {
        let existing = self
            .policies
            .iter_mut()
            .filter_map(RolePolicy::as_inline_mut)
            .find(|policy| policy.is_named(policy_name));
        if let Some(policy) = existing {
            return policy.policy_document.push_unique(statement);
        }

        let mut policy = InlinePolicy::new(policy_name);
        policy.policy_document.statement.push(statement);
        self.policies.push(policy.into());
        true
    }

    /// Get the inline policy with the given literal name
    #[must_use]
    pub fn inline_policy(&self, name: &str) -> Option<&InlinePolicy> {
        self.policies
            .iter()
            .filter_map(RolePolicy::as_inline)
            .find(|policy| policy.is_named(name))
    }
}

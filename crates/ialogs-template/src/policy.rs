//! IAM policy documents embedded in role resources

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::serde_util::one_or_many;

/// Policy language version used for documents created here
pub const POLICY_VERSION: &str = "2012-10-17";

/// Entry of a role's `Properties.Policies` list
///
/// Entries that are not literal inline policies (for example an `Fn::If`
/// choosing between two policies) are carried verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "JsonValue", into = "JsonValue")]
pub enum RolePolicy {
    Inline(InlinePolicy),
    Opaque(JsonValue),
}

impl RolePolicy {
    #[inline]
    #[must_use]
    pub fn as_inline(&self) -> Option<&InlinePolicy> {
        match self {
            Self::Inline(policy) => Some(policy),
            Self::Opaque(_) => None,
        }
    }

    #[inline]
    pub fn as_inline_mut(&mut self) -> Option<&mut InlinePolicy> {
        match self {
            Self::Inline(policy) => Some(policy),
            Self::Opaque(_) => None,
        }
    }
}

impl From<JsonValue> for RolePolicy {
    fn from(value: JsonValue) -> Self {
        serde_json::from_value(value.clone()).map_or(Self::Opaque(value), Self::Inline)
    }
}

impl From<RolePolicy> for JsonValue {
    fn from(policy: RolePolicy) -> Self {
        match policy {
            // Inline policies hold only JSON-representable data
            RolePolicy::Inline(policy) => {
                serde_json::to_value(policy).unwrap_or(JsonValue::Null)
            }
            RolePolicy::Opaque(value) => value,
        }
    }
}

impl From<InlinePolicy> for RolePolicy {
    fn from(policy: InlinePolicy) -> Self {
        Self::Inline(policy)
    }
}

/// Inline policy attached to a role (`Properties.Policies[*]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InlinePolicy {
    /// Policy name; upstream compilers may emit an intrinsic here
    pub policy_name: JsonValue,

    /// Policy document
    pub policy_document: PolicyDocument,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl InlinePolicy {
    /// Create an empty policy with a literal name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            policy_name: JsonValue::String(name.into()),
            policy_document: PolicyDocument::default(),
            extra: Map::new(),
        }
    }

    /// Check whether the policy carries the given literal name
    #[inline]
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.policy_name.as_str() == Some(name)
    }
}

/// Policy document (`Version` + `Statement`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, deserialize_with = "one_or_many::deserialize")]
    pub statement: Vec<PolicyStatement>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl PolicyDocument {
    /// Append a statement unless an equal one is already present
    ///
    /// Returns `true` when the statement was appended.
    pub fn push_unique(&mut self, statement: PolicyStatement) -> bool {
        if self.statement.contains(&statement) {
            return false;
        }
        self.statement.push(statement);
        true
    }
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self {
            version: Some(POLICY_VERSION.to_string()),
            statement: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// Single policy statement
///
/// `Action` and `Resource` accept both the scalar and the list form on input
/// and are always written back as lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub effect: String,

    /// Empty when the statement uses `NotAction`
    #[serde(
        default,
        deserialize_with = "one_or_many::deserialize",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub action: Vec<String>,

    /// Empty when the statement uses `NotResource`
    #[serde(
        default,
        deserialize_with = "one_or_many::deserialize",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub resource: Vec<JsonValue>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl PolicyStatement {
    /// Create an `Allow` statement
    #[must_use]
    pub fn allow<A, S>(actions: A, resources: Vec<JsonValue>) -> Self
    where
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            effect: "Allow".to_string(),
            action: actions.into_iter().map(Into::into).collect(),
            resource: resources,
            extra: Map::new(),
        }
    }
}

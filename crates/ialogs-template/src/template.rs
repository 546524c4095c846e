//! Compiled template
//!
//! [`Template`] is the resource graph handed over by the host's compile step.
//! Only the `Resources` section is typed; every other top-level section is
//! preserved as-is.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::TemplateResult;
use crate::logical_id::LogicalId;
use crate::resource::ResourceNode;

/// Resources keyed by logical id, in template order
pub type Resources = IndexMap<LogicalId, ResourceNode>;

/// Resource graph of a compiled template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(rename = "Resources", default, skip_serializing_if = "Option::is_none")]
    resources: Option<Resources>,

    /// `AWSTemplateFormatVersion`, `Outputs`, `Parameters`, ...
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Template {
    /// Create a template without a `Resources` section
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a template from resources
    #[must_use]
    pub fn with_resources(resources: Resources) -> Self {
        Self {
            resources: Some(resources),
            extra: Map::new(),
        }
    }

    /// Parse from JSON string
    ///
    /// # Errors
    /// Returns error if JSON is invalid or a known resource type is malformed
    pub fn from_json(json: &str) -> TemplateResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from YAML string
    ///
    /// # Errors
    /// Returns error if YAML is invalid or a known resource type is malformed
    pub fn from_yaml(yaml: &str) -> TemplateResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Build from an already-parsed JSON value
    ///
    /// # Errors
    /// Returns error if the value does not have the template shape
    pub fn from_value(value: JsonValue) -> TemplateResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Convert to a JSON value
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_value(&self) -> TemplateResult<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }

    /// Serialize to pretty JSON string
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> TemplateResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize to YAML string
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> TemplateResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check whether a `Resources` section exists
    #[inline]
    #[must_use]
    pub fn has_resources(&self) -> bool {
        self.resources.is_some()
    }

    /// Get the `Resources` section, if present
    #[inline]
    #[must_use]
    pub fn resources(&self) -> Option<&Resources> {
        self.resources.as_ref()
    }

    /// Get the `Resources` section, creating an empty one if absent
    #[inline]
    pub fn resources_mut(&mut self) -> &mut Resources {
        self.resources.get_or_insert_with(Resources::new)
    }

    /// Look up a resource by logical id
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ResourceNode> {
        self.resources.as_ref()?.get(id)
    }

    /// Look up a resource mutably by logical id
    #[inline]
    pub fn get_mut(&mut self, id: &str) -> Option<&mut ResourceNode> {
        self.resources.as_mut()?.get_mut(id)
    }

    /// Check whether a resource exists
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Insert or overwrite a resource
    ///
    /// Overwriting keeps the resource's position in the template.
    /// Returns the previous node, if any.
    pub fn insert(&mut self, id: LogicalId, node: ResourceNode) -> Option<ResourceNode> {
        self.resources_mut().insert(id, node)
    }

    /// Number of resources
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.as_ref().map_or(0, IndexMap::len)
    }

    /// Check if there are no resources
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate resources in template order
    pub fn iter(&self) -> impl Iterator<Item = (&LogicalId, &ResourceNode)> {
        self.resources.iter().flat_map(IndexMap::iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{LogGroupProperties, LogGroupResource};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn resources_are_created_lazily() {
        let mut template = Template::new();
        assert!(!template.has_resources());
        assert!(template.is_empty());

        template.resources_mut();
        assert!(template.has_resources());
        assert_eq!(template.to_value().unwrap(), json!({"Resources": {}}));
    }

    #[test]
    fn empty_template_serializes_without_resources() {
        assert_eq!(Template::new().to_value().unwrap(), json!({}));
    }

    #[test]
    fn insert_and_lookup() {
        let mut template = Template::new();
        let previous = template.insert(
            LogicalId::new("Logs"),
            ResourceNode::LogGroup(LogGroupResource::new(LogGroupProperties::default())),
        );

        assert!(previous.is_none());
        assert!(template.contains("Logs"));
        assert_eq!(template.get("Logs").map(ResourceNode::kind), Some("logGroup"));
        assert!(template.get("Missing").is_none());
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut template = Template::from_value(json!({
            "Resources": {
                "A": {"Type": "AWS::S3::Bucket"},
                "B": {"Type": "AWS::S3::Bucket"}
            }
        }))
        .unwrap();

        template.insert(LogicalId::new("A"), ResourceNode::Other(json!({"Type": "AWS::SQS::Queue"})));

        let order: Vec<_> = template.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["A", "B"]);
    }

    #[test]
    fn other_sections_are_preserved() {
        let input = json!({
            "AWSTemplateFormatVersion": "2010-09-09",
            "Resources": {},
            "Outputs": {"Out": {"Value": "x"}}
        });
        let template = Template::from_value(input.clone()).unwrap();
        assert_eq!(template.to_value().unwrap(), input);
    }

    #[test]
    fn yaml_and_json_agree() {
        let yaml = r"
Resources:
  Func1LogGroup:
    Type: AWS::Logs::LogGroup
    Properties:
      LogGroupName: /aws/lambda/svc-dev-func1
      RetentionInDays: 14
";
        let from_yaml = Template::from_yaml(yaml).unwrap();
        let from_json = Template::from_json(&from_yaml.to_json().unwrap()).unwrap();

        assert_eq!(from_yaml, from_json);
        let log_group = from_yaml.get("Func1LogGroup").and_then(ResourceNode::as_log_group).unwrap();
        assert_eq!(log_group.properties.retention_days(), Some(14));
    }
}

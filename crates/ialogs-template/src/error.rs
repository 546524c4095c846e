//! Error types for template handling

/// Errors raised while reading, writing or interpreting a template
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Template is not valid JSON or does not match the expected shape
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Template is not valid YAML or does not match the expected shape
    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// Logical id does not satisfy CloudFormation naming rules
    #[error("invalid logical id: '{0}' (must be 1-255 alphanumeric characters)")]
    InvalidLogicalId(String),

    /// Resource of a known type could not be read into its typed form
    #[error("malformed {resource_type} resource: {message}")]
    MalformedResource {
        resource_type: String,
        message: String,
    },

    /// Resource definition is not a JSON object
    #[error("resource definition must be an object, got {0}")]
    NotAnObject(String),
}

impl TemplateError {
    /// Create malformed resource error
    pub fn malformed(resource_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResource {
            resource_type: resource_type.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

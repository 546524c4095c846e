//! Logical identifiers for template resources
//!
//! Provides [`LogicalId`], the key of a resource inside a template's
//! `Resources` map.

use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;

/// Maximum length CloudFormation accepts for a logical id
pub const MAX_LOGICAL_ID_LEN: usize = 255;

/// Key of a resource in a template
///
/// Construction through [`LogicalId::new`] is unchecked: ids produced by an
/// upstream compile step are taken as-is so the graph round-trips unchanged.
/// Use [`str::parse`] to get a validated id.
///
/// # Examples
/// - `func1LambdaFunction`
/// - `func1PluginIALogGroup`
/// - `IamRoleLambdaExecution`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    /// Create id without validation
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get id as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the owned string
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Check whether the id is a valid CloudFormation logical id
    ///
    /// Valid ids are non-empty, ASCII alphanumeric and at most
    /// [`MAX_LOGICAL_ID_LEN`] characters long.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
            && self.0.len() <= MAX_LOGICAL_ID_LEN
            && self.0.chars().all(|c| c.is_ascii_alphanumeric())
    }

    /// Derive a new id by appending a suffix
    #[inline]
    #[must_use]
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self(format!("{}{}", self.0, suffix))
    }
}

impl Display for LogicalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LogicalId {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Self::new(s);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(TemplateError::InvalidLogicalId(s.to_string()))
        }
    }
}

impl Borrow<str> for LogicalId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for LogicalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LogicalId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for LogicalId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for LogicalId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LogicalId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_id() {
        let id: LogicalId = "func1LambdaFunction".parse().unwrap();
        assert_eq!(id.as_str(), "func1LambdaFunction");
        assert!(id.is_valid());
    }

    #[test]
    fn parse_rejects_non_alphanumeric() {
        let result: Result<LogicalId, _> = "my-funcLambdaFunction".parse();
        assert!(matches!(result, Err(TemplateError::InvalidLogicalId(_))));
    }

    #[test]
    fn parse_rejects_empty_and_oversized() {
        assert!("".parse::<LogicalId>().is_err());
        assert!("a".repeat(MAX_LOGICAL_ID_LEN + 1).parse::<LogicalId>().is_err());
        assert!("a".repeat(MAX_LOGICAL_ID_LEN).parse::<LogicalId>().is_ok());
    }

    #[test]
    fn unchecked_construction_keeps_input() {
        let id = LogicalId::new("my-func");
        assert!(!id.is_valid());
        assert_eq!(id.to_string(), "my-func");
    }

    #[test]
    fn suffix_derivation() {
        let id = LogicalId::new("func1").with_suffix("PluginIALogGroup");
        assert_eq!(id, "func1PluginIALogGroup");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = LogicalId::new("Abc");
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!("Abc"));
    }
}

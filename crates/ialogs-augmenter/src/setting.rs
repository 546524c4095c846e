//! Raw user settings
//!
//! A [`Setting`] keeps whatever the user wrote, untyped, so that "not set",
//! "set to a valid value" and "set to something invalid" stay distinguishable
//! until validation runs.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// A configuration field as written by the user
///
/// Deserialize with `#[serde(default)]` so a missing key becomes
/// [`Setting::Absent`]. An explicit `null` is kept as `Present(Null)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Setting {
    /// Key not present
    #[default]
    Absent,

    /// Key present with the given raw value
    Present(JsonValue),
}

impl Setting {
    /// Create a present setting
    #[inline]
    #[must_use]
    pub fn present(value: impl Into<JsonValue>) -> Self {
        Self::Present(value.into())
    }

    #[inline]
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Raw value, including an explicit `null`
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&JsonValue> {
        match self {
            Self::Absent => None,
            Self::Present(value) => Some(value),
        }
    }

    /// Raw value, treating `null`, `false`, `0` and `""` as not set
    #[must_use]
    pub fn truthy_value(&self) -> Option<&JsonValue> {
        self.value().filter(|value| is_truthy(value))
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(flag) => *flag,
        JsonValue::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        JsonValue::String(text) => !text.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

impl<T: Into<JsonValue>> From<Option<T>> for Setting {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::present)
    }
}

impl Serialize for Setting {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Absent => serializer.serialize_none(),
            Self::Present(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Setting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        JsonValue::deserialize(deserializer).map(Self::Present)
    }
}

/// Where a setting was read from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SettingScope {
    /// Service-wide `custom` block
    Global,

    /// A function's own block
    Function(String),
}

impl SettingScope {
    /// Scope of a named function
    #[inline]
    #[must_use]
    pub fn function(name: impl Into<String>) -> Self {
        Self::Function(name.into())
    }
}

impl Display for SettingScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("custom"),
            Self::Function(name) => write!(f, "function '{name}'"),
        }
    }
}

//! Naming translation from declared function names to compiled resource ids

use ialogs_template::LogicalId;

/// Suffix of the log group id derived for each function
pub const LOG_GROUP_ID_SUFFIX: &str = "PluginIALogGroup";

/// Host-supplied mapping from a declared function name to the logical id of
/// its compute node
///
/// Any `Fn(&str) -> String` closure implements this trait.
pub trait FunctionNaming {
    /// Logical id of the compiled compute node for `function_name`
    fn compute_resource_id(&self, function_name: &str) -> LogicalId;
}

impl<F> FunctionNaming for F
where
    F: Fn(&str) -> String,
{
    fn compute_resource_id(&self, function_name: &str) -> LogicalId {
        LogicalId::new(self(function_name))
    }
}

/// Naming scheme used by the Serverless Framework's AWS provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerlessNaming;

impl ServerlessNaming {
    /// Normalized function name: `-` becomes `Dash`, `_` becomes
    /// `Underscore`, and the first character is upper-cased
    ///
    /// # Examples
    /// ```
    /// # use ialogs_augmenter::ServerlessNaming;
    /// assert_eq!(ServerlessNaming::normalized_function_name("my-func_v2"), "MyDashfuncUnderscorev2");
    /// ```
    #[must_use]
    pub fn normalized_function_name(function_name: &str) -> String {
        let replaced = function_name.replace('-', "Dash").replace('_', "Underscore");
        let mut chars = replaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl FunctionNaming for ServerlessNaming {
    fn compute_resource_id(&self, function_name: &str) -> LogicalId {
        LogicalId::new(format!(
            "{}LambdaFunction",
            Self::normalized_function_name(function_name)
        ))
    }
}

/// Logical id of the log group derived for `function_name`
///
/// Derived from the declared key, not the normalized name, so the id is
/// stable whatever naming translation the host uses.
#[inline]
#[must_use]
pub fn log_group_id(function_name: &str) -> LogicalId {
    LogicalId::new(format!("{function_name}{LOG_GROUP_ID_SUFFIX}"))
}

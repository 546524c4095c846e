//! IA Logs Template Model
//!
//! Typed view over the resource graph of a compiled CloudFormation template.
//!
//! # Core Concepts
//!
//! - [`Template`]: The resource graph, keyed by [`LogicalId`] in template order
//! - [`ResourceNode`]: Tagged resource variant (function, log group, role, other)
//! - [`RoleReference`]: How a function points at its execution role
//! - [`PolicyDocument`]: Inline IAM policy statements on a role
//!
//! # Example
//!
//! ```rust,ignore
//! use ialogs_template::{Template, ResourceNode};
//!
//! let template = Template::from_json(compiled)?;
//! if let Some(ResourceNode::Function(function)) = template.get("Func1LambdaFunction") {
//!     println!("depends on {:?}", function.depends_on);
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod logical_id;
mod policy;
mod resource;
mod serde_util;
mod template;

// Re-exports
pub use error::{TemplateError, TemplateResult};
pub use logical_id::{LogicalId, MAX_LOGICAL_ID_LEN};
pub use policy::{InlinePolicy, PolicyDocument, PolicyStatement, RolePolicy, POLICY_VERSION};
pub use resource::{
    FunctionProperties, FunctionResource, LogGroupProperties, LogGroupResource, LoggingConfig,
    ResourceNode, RoleProperties, RoleReference, RoleResource, FUNCTION_TYPE, LOG_GROUP_TYPE,
    ROLE_TYPE,
};
pub use template::{Resources, Template};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

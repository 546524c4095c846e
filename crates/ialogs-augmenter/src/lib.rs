//! IA Logs Augmenter
//!
//! Deploy-time transformer that moves function logs to infrequent-access
//! CloudWatch log groups.
//!
//! # Core Concepts
//!
//! - [`ServiceConfig`]: Declared functions, the `custom` block, and the compiled template
//! - [`Setting`]: A raw user value, kept untyped until validation
//! - [`resolve_global`] / [`resolve_function`]: Settings precedence (local beats global)
//! - [`GraphMutator`]: Writes log groups, dependencies, logging config and role grants
//! - [`ResourceAugmenter`]: One all-or-nothing pass over a service
//!
//! # Example
//!
//! ```rust,ignore
//! use ialogs_augmenter::{ResourceAugmenter, AugmenterOptions, ServerlessNaming, ServiceConfig};
//!
//! let mut service = ServiceConfig::from_value(host_service)?;
//! let report = ResourceAugmenter::new(AugmenterOptions::default())
//!     .augment(&mut service, &ServerlessNaming)?;
//!
//! println!("{} functions enrolled", report.enrolled_count());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod augmenter;
mod config;
mod error;
mod mutator;
mod naming;
mod report;
mod resolver;
mod setting;
mod validation;

pub mod schema;

// Re-exports
pub use augmenter::{augment, ResourceAugmenter};
pub use config::{AugmenterOptions, FunctionConfig, GlobalSettings, LogGroupNaming, ServiceConfig};
pub use error::{AugmentError, AugmentResult, IntegrationError, ValidationError};
pub use mutator::{
    log_write_statement, FunctionPlan, GraphMutator, RoleGrant, INFREQUENT_ACCESS_CLASS,
    LOG_GROUP_PATH_PREFIX, LOG_WRITE_ACTIONS, ROLE_POLICY_NAME,
};
pub use naming::{log_group_id, FunctionNaming, ServerlessNaming, LOG_GROUP_ID_SUFFIX};
pub use report::{AugmentReport, FunctionOutcome};
pub use resolver::{resolve_function, resolve_global, Decision};
pub use setting::{Setting, SettingScope};
pub use validation::{validate_boolean, validate_retention, RetentionDays, VALID_RETENTION_DAYS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

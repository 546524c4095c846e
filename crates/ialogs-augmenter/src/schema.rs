//! JSON schema of the settings this crate reads
//!
//! Hosts that validate their configuration can register these fragments for
//! the `custom` block and for function blocks. They are advisory: the
//! resolvers validate every value themselves.

use schemars::schema::RootSchema;
use schemars::{schema_for, JsonSchema};

use crate::validation::RetentionDays;

/// Typed mirror of the infrequent-access keys
#[derive(JsonSchema)]
#[schemars(rename_all = "camelCase")]
#[allow(dead_code)]
struct InfrequentAccessSettings {
    /// Route function logs to an infrequent-access log group
    infrequent_access_logs: Option<bool>,

    /// Retention in days for the infrequent-access log group
    infrequent_access_log_retention: Option<RetentionDays>,
}

fn titled(title: &str) -> RootSchema {
    let mut schema = schema_for!(InfrequentAccessSettings);
    schema.schema.metadata().title = Some(title.to_string());
    schema
}

/// Schema fragment for the service-wide `custom` block
#[must_use]
pub fn custom_properties_schema() -> RootSchema {
    titled("Infrequent-access log defaults")
}

/// Schema fragment for a single function block
#[must_use]
pub fn function_properties_schema() -> RootSchema {
    titled("Infrequent-access log settings")
}

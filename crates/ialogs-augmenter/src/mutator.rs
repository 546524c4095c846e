//! Graph mutation
//!
//! Mutation is split in two steps so a pass is all-or-nothing:
//! [`GraphMutator::plan`] performs every lookup against the untouched
//! template and captures what will be written, then [`GraphMutator::apply`]
//! writes it.

use serde_json::json;

use ialogs_template::{
    FunctionResource, LogGroupProperties, LogGroupResource, LogicalId, PolicyStatement,
    ResourceNode, Template,
};

use crate::config::{AugmenterOptions, FunctionConfig, LogGroupNaming};
use crate::error::IntegrationError;
use crate::naming::{log_group_id, FunctionNaming};
use crate::report::FunctionOutcome;
use crate::resolver::Decision;

/// Prefix of every log group path created here
pub const LOG_GROUP_PATH_PREFIX: &str = "/aws/lambda/plugin/ia/";

/// `LogGroupClass` of the synthesized log groups
pub const INFREQUENT_ACCESS_CLASS: &str = "INFREQUENT_ACCESS";

/// Inline role policy holding the log-write statements
pub const ROLE_POLICY_NAME: &str = "PluginIALogGroupPolicy";

/// Actions granted on each enrolled function's log group
pub const LOG_WRITE_ACTIONS: [&str; 2] = ["logs:CreateLogStream", "logs:PutLogEvents"];

/// Everything needed to mutate the template for one function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionPlan {
    pub function: String,
    pub decision: Decision,
    pub compute_id: LogicalId,
    pub log_group_id: LogicalId,
    pub log_group: LogGroupResource,
    pub role_grant: Option<RoleGrant>,
}

/// Policy statement to append to an execution role
#[derive(Debug, Clone, PartialEq)]
pub struct RoleGrant {
    pub role_id: LogicalId,
    pub statement: PolicyStatement,
}

/// Applies resolved decisions to a template
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphMutator {
    options: AugmenterOptions,
}

impl GraphMutator {
    #[inline]
    #[must_use]
    pub fn new(options: AugmenterOptions) -> Self {
        Self { options }
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> &AugmenterOptions {
        &self.options
    }

    /// Physical log group name for a function
    #[must_use]
    pub fn log_group_name(&self, function: &str, config: &FunctionConfig) -> String {
        let segment = match (self.options.log_group_naming, config.name.as_deref()) {
            (LogGroupNaming::DisplayName, Some(display_name)) => display_name,
            _ => function,
        };
        format!("{LOG_GROUP_PATH_PREFIX}{segment}")
    }

    /// Look up everything the function's mutation needs
    ///
    /// # Errors
    /// Returns [`IntegrationError`] if the compute node, or the execution role
    /// when role grants apply, is missing or has the wrong kind.
    pub fn plan(
        &self,
        template: &Template,
        function: &str,
        config: &FunctionConfig,
        decision: Decision,
        naming: &dyn FunctionNaming,
    ) -> Result<FunctionPlan, IntegrationError> {
        let compute_id = naming.compute_resource_id(function);
        let compute = lookup_function(template, function, &compute_id)?;

        let log_group_name = self.log_group_name(function, config);
        let role_grant = if decision.enrolled && self.options.grant_role_permissions {
            plan_role_grant(template, function, compute, &log_group_name)?
        } else {
            None
        };

        let log_group = LogGroupResource::new(LogGroupProperties {
            log_group_name: Some(log_group_name.into()),
            log_group_class: Some(INFREQUENT_ACCESS_CLASS.into()),
            retention_in_days: decision.retention.map(|days| u32::from(days).into()),
            ..LogGroupProperties::default()
        });

        Ok(FunctionPlan {
            function: function.to_string(),
            decision,
            compute_id,
            log_group_id: log_group_id(function),
            log_group,
            role_grant,
        })
    }

    /// Write a planned mutation into the template
    ///
    /// The log group is always written. The compute node and role are only
    /// touched when the function is enrolled.
    ///
    /// # Errors
    /// Returns [`IntegrationError`] if a planned node disappeared since
    /// planning (for example when two functions map to clashing ids).
    pub fn apply(
        &self,
        template: &mut Template,
        plan: FunctionPlan,
    ) -> Result<FunctionOutcome, IntegrationError> {
        let FunctionPlan {
            function,
            decision,
            compute_id,
            log_group_id,
            log_group,
            role_grant,
        } = plan;

        template.insert(log_group_id.clone(), ResourceNode::LogGroup(log_group));

        let mut outcome = FunctionOutcome {
            function,
            log_group_id,
            enrolled: decision.enrolled,
            retention: decision.retention,
            policy_statement_added: false,
        };

        if !decision.enrolled {
            tracing::debug!(
                "Function {} not enrolled, created {} only",
                outcome.function,
                outcome.log_group_id
            );
            return Ok(outcome);
        }

        let compute = lookup_function_mut(template, &outcome.function, &compute_id)?;
        compute.prepend_dependency(outcome.log_group_id.clone());
        compute.properties.set_log_group(outcome.log_group_id.as_str());

        if let Some(grant) = role_grant {
            let role = match template.get_mut(grant.role_id.as_str()) {
                Some(ResourceNode::Role(role)) => role,
                Some(other) => {
                    return Err(IntegrationError::NotARole {
                        function: outcome.function,
                        logical_id: grant.role_id,
                        found: other.kind().to_string(),
                    })
                }
                None => {
                    return Err(IntegrationError::MissingRole {
                        function: outcome.function,
                        logical_id: grant.role_id,
                    })
                }
            };
            outcome.policy_statement_added = role
                .properties
                .push_statement(ROLE_POLICY_NAME, grant.statement);
        }

        tracing::debug!(
            "Function {} enrolled in {} (retention: {:?})",
            outcome.function,
            outcome.log_group_id,
            outcome.retention.map(u32::from)
        );
        Ok(outcome)
    }
}

/// Statement allowing log writes to one log group
#[must_use]
pub fn log_write_statement(log_group_name: &str) -> PolicyStatement {
    let arn = format!(
        "arn:${{AWS::Partition}}:logs:${{AWS::Region}}:${{AWS::AccountId}}:log-group:{log_group_name}:*"
    );
    PolicyStatement::allow(LOG_WRITE_ACTIONS, vec![json!({ "Fn::Sub": arn })])
}

fn plan_role_grant(
    template: &Template,
    function: &str,
    compute: &FunctionResource,
    log_group_name: &str,
) -> Result<Option<RoleGrant>, IntegrationError> {
    let Some(reference) = compute.properties.role.as_ref() else {
        tracing::warn!("Function {} has no execution role, skipping log permissions", function);
        return Ok(None);
    };
    let Some(role_id) = reference.logical_id() else {
        tracing::warn!(
            "Function {} uses an execution role defined outside the template, skipping log permissions",
            function
        );
        return Ok(None);
    };

    match template.get(role_id.as_str()) {
        Some(ResourceNode::Role(_)) => Ok(Some(RoleGrant {
            role_id: role_id.clone(),
            statement: log_write_statement(log_group_name),
        })),
        Some(other) => Err(IntegrationError::NotARole {
            function: function.to_string(),
            logical_id: role_id.clone(),
            found: other.kind().to_string(),
        }),
        None => Err(IntegrationError::MissingRole {
            function: function.to_string(),
            logical_id: role_id.clone(),
        }),
    }
}

fn lookup_function<'t>(
    template: &'t Template,
    function: &str,
    compute_id: &LogicalId,
) -> Result<&'t FunctionResource, IntegrationError> {
    match template.get(compute_id.as_str()) {
        Some(ResourceNode::Function(compute)) => Ok(compute),
        Some(other) => Err(not_a_function(function, compute_id, other)),
        None => Err(missing_compute(function, compute_id)),
    }
}

fn lookup_function_mut<'t>(
    template: &'t mut Template,
    function: &str,
    compute_id: &LogicalId,
) -> Result<&'t mut FunctionResource, IntegrationError> {
    match template.get_mut(compute_id.as_str()) {
        Some(ResourceNode::Function(compute)) => Ok(compute),
        Some(other) => Err(not_a_function(function, compute_id, other)),
        None => Err(missing_compute(function, compute_id)),
    }
}

fn not_a_function(function: &str, compute_id: &LogicalId, found: &ResourceNode) -> IntegrationError {
    IntegrationError::NotAFunction {
        function: function.to_string(),
        logical_id: compute_id.clone(),
        found: found.kind().to_string(),
    }
}

fn missing_compute(function: &str, compute_id: &LogicalId) -> IntegrationError {
    IntegrationError::MissingComputeResource {
        function: function.to_string(),
        logical_id: compute_id.clone(),
    }
}

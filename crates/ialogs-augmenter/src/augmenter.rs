//! Resource Augmenter
//!
//! Runs one pass over a [`ServiceConfig`]:
//! 1. Resolve the `custom` block into service-wide defaults
//! 2. Resolve every function against those defaults
//! 3. Plan every function's mutation against the untouched template
//! 4. Apply the plans in declaration order
//!
//! Steps 1-3 do not write, so any validation or integration error leaves the
//! template exactly as it was. Planning also rejects a log group id that
//! equals a compute or role id of another plan, since writing it would
//! replace a node a later step reads.

use crate::config::{AugmenterOptions, ServiceConfig};
use crate::error::{AugmentError, IntegrationError};
use crate::mutator::{FunctionPlan, GraphMutator};
use crate::naming::FunctionNaming;
use crate::report::AugmentReport;
use crate::resolver::{resolve_function, resolve_global, Decision};

/// Injects infrequent-access log groups into a compiled template
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceAugmenter {
    mutator: GraphMutator,
}

impl ResourceAugmenter {
    #[inline]
    #[must_use]
    pub fn new(options: AugmenterOptions) -> Self {
        Self {
            mutator: GraphMutator::new(options),
        }
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> &AugmenterOptions {
        self.mutator.options()
    }

    /// Augment the service's template in place
    ///
    /// A service without functions is left untouched, and no `Resources`
    /// section is created for it.
    ///
    /// # Errors
    /// - [`AugmentError::Validation`] if a setting is invalid
    /// - [`AugmentError::Integration`] if the template lacks a compute node or
    ///   execution role the host should have compiled
    pub fn augment(
        &self,
        service: &mut ServiceConfig,
        naming: &dyn FunctionNaming,
    ) -> Result<AugmentReport, AugmentError> {
        if service.functions.is_empty() {
            tracing::debug!("No functions declared, nothing to augment");
            return Ok(AugmentReport::default());
        }

        tracing::info!(
            "Augmenting {} functions with infrequent-access log groups",
            service.functions.len()
        );

        let global = resolve_global(service.custom.as_ref())?;
        tracing::debug!("Resolved service defaults: {:?}", global);

        let decisions = service
            .functions
            .iter()
            .map(|(name, config)| {
                resolve_function(name, config, global).map(|decision| (name, config, decision))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let plans = decisions
            .into_iter()
            .map(|(name, config, decision)| {
                self.mutator
                    .plan(&service.template, name, config, decision, naming)
            })
            .collect::<Result<Vec<FunctionPlan>, _>>()?;
        check_id_clashes(&plans)?;

        let mut report = AugmentReport::default();
        for plan in plans {
            report.functions.push(self.mutator.apply(&mut service.template, plan)?);
        }

        tracing::info!(
            "Created {} log groups, {} enrolled, {} policy statements added",
            report.len(),
            report.enrolled_count(),
            report.statements_added()
        );
        Ok(report)
    }

    /// Resolve every function without touching the template
    ///
    /// # Errors
    /// Returns [`AugmentError::Validation`] if a setting is invalid.
    pub fn resolve(&self, service: &ServiceConfig) -> Result<Vec<(String, Decision)>, AugmentError> {
        let global = resolve_global(service.custom.as_ref())?;
        service
            .functions
            .iter()
            .map(|(name, config)| {
                resolve_function(name, config, global)
                    .map(|decision| (name.clone(), decision))
                    .map_err(AugmentError::from)
            })
            .collect()
    }
}

fn check_id_clashes(plans: &[FunctionPlan]) -> Result<(), IntegrationError> {
    for plan in plans {
        for other in plans {
            let role_id = other.role_grant.as_ref().map(|grant| &grant.role_id);
            if plan.log_group_id == other.compute_id || role_id == Some(&plan.log_group_id) {
                return Err(IntegrationError::LogGroupIdClash {
                    function: plan.function.clone(),
                    logical_id: plan.log_group_id.clone(),
                    owner: other.function.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Augment with default options
///
/// # Errors
/// See [`ResourceAugmenter::augment`].
pub fn augment(
    service: &mut ServiceConfig,
    naming: &dyn FunctionNaming,
) -> Result<AugmentReport, AugmentError> {
    ResourceAugmenter::default().augment(service, naming)
}

//! Summary of an augmentation pass

use ialogs_template::LogicalId;

use crate::validation::RetentionDays;

/// What happened to one function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionOutcome {
    pub function: String,
    pub log_group_id: LogicalId,
    pub enrolled: bool,
    pub retention: Option<RetentionDays>,

    /// `false` when grants are disabled, the role is external, or an equal
    /// statement was already present
    pub policy_statement_added: bool,
}

/// Per-function outcomes, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AugmentReport {
    pub functions: Vec<FunctionOutcome>,
}

impl AugmentReport {
    /// Outcome for a function, by declared name
    #[must_use]
    pub fn get(&self, function: &str) -> Option<&FunctionOutcome> {
        self.functions.iter().find(|outcome| outcome.function == function)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Number of enrolled functions
    #[must_use]
    pub fn enrolled_count(&self) -> usize {
        self.functions.iter().filter(|outcome| outcome.enrolled).count()
    }

    /// Number of policy statements appended during the pass
    #[must_use]
    pub fn statements_added(&self) -> usize {
        self.functions
            .iter()
            .filter(|outcome| outcome.policy_statement_added)
            .count()
    }
}

//! Pluggable division- and regiment-scope rules
//!
//! Templates reference rules by id with a parameter bag. The registry
//! resolves ids to implementations and folds their hook results.

pub mod division;
pub mod hooks;
pub mod params;
pub mod regiment;
pub mod registry;

#[cfg(test)]
pub(crate) mod fixtures;

pub use hooks::{
    CostModifier, DivisionBonus, DivisionRule, DivisionScope, ImprovementCharge, RegimentRule,
    RegimentScope, StatsBonus, StatsPatch, UsageState,
};
pub use params::{RuleInvocation, RuleParams};
pub use registry::{builtin_rules, RuleRegistry};

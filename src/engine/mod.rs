//! Evaluation engine
//!
//! Pure functions of a catalog snapshot and a division (or regiment)
//! configuration: structure resolution, costs, stats, division-level
//! derivations, support assignment, validation and speculative mutation.
//! Nothing here mutates the configuration it is given, except the explicit
//! `prune_support` helper.

pub mod cost;
pub mod division;
pub mod improvements;
pub mod mutation;
pub mod report;
pub mod resolver;
pub mod stats;
pub mod support;
pub mod validator;
pub mod view;

pub use division::{classify_division, select_main_force, DivisionEvaluation, DivisionType, RegimentEvaluation};
pub use improvements::{EffectiveImprovement, PreparedRegiment};
pub use report::{DivisionReport, RegimentReport};
pub use resolver::{resolve_structure, ActiveUnit};
pub use stats::{classify_formation, FormationType, Stats};
pub use support::SupportAllowance;
pub use validator::{ParityBreach, ParityKind, Problem, Severity};
pub use view::{DivisionLink, RegimentView};

use crate::catalog::division::DivisionTemplate;
use crate::catalog::registry::Catalog;
use crate::core::config::{config, EngineConfig};
use crate::core::error::{MusterError, Result};
use crate::roster::division::DivisionConfig;
use crate::rules::registry::{builtin_rules, RuleRegistry};

/// Evaluation context: the catalog, the rule registry and engine tunables
#[derive(Debug, Clone, Copy)]
pub struct Engine<'a> {
    pub catalog: &'a Catalog,
    pub rules: &'a RuleRegistry,
    pub config: &'a EngineConfig,
}

impl<'a> Engine<'a> {
    /// Engine with the built-in rules and the process-wide config
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::with_rules(catalog, builtin_rules(), config())
    }

    pub fn with_rules(catalog: &'a Catalog, rules: &'a RuleRegistry, config: &'a EngineConfig) -> Self {
        Self {
            catalog,
            rules,
            config,
        }
    }

    /// Catalog template of a division document
    pub fn division_template(&self, division: &DivisionConfig) -> Result<&'a DivisionTemplate> {
        self.catalog
            .division(&division.division_id)
            .ok_or_else(|| MusterError::UnknownTemplate(division.division_id.to_string()))
    }
}

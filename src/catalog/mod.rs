//! Catalog model: static unit, improvement, regiment and division definitions
//!
//! Everything here is plain data loaded once per session. The engine only
//! reads it.

pub mod division;
pub mod improvement;
pub mod integrity;
pub mod loader;
pub mod regiment;
pub mod registry;
pub mod unit;

pub use division::{AssignmentRules, DivisionTemplate, RegimentSlot, SupportUnitEntry};
pub use improvement::{
    resolve_cost_rule, CostRule, ImprovementDefinition, ImprovementScope, ImprovementSlot,
    ImprovementTerms,
};
pub use loader::{load_catalog, load_engine_config};
pub use regiment::{Choice, CustomSlot, Group, Pod, RegimentTemplate, SelectionStructure};
pub use registry::Catalog;
pub use unit::{RankTier, UnitDefinition, UnitTrait, RECON_TRAIT_DELTAS};

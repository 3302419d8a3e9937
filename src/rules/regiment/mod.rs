//! Built-in regiment-scope rules

pub mod composition;
pub mod cost;
pub mod stats;

pub use composition::{MaxUnits, RequiresUnit};
pub use cost::{BaseCostModifier, FirstFreeImprovement, ImprovementDiscount};
pub use stats::{FormationOverride, StatBonus};

use crate::rules::registry::RuleRegistry;

pub fn register_builtin(registry: &mut RuleRegistry) {
    registry.register_regiment(Box::new(MaxUnits));
    registry.register_regiment(Box::new(RequiresUnit));
    registry.register_regiment(Box::new(FormationOverride));
    registry.register_regiment(Box::new(StatBonus));
    registry.register_regiment(Box::new(BaseCostModifier));
    registry.register_regiment(Box::new(FirstFreeImprovement));
    registry.register_regiment(Box::new(ImprovementDiscount));
}

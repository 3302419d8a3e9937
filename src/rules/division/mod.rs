//! Built-in division-scope rules

pub mod bonuses;
pub mod composition;
pub mod improvements;
pub mod support;

pub use bonuses::{DivisionBonusRule, RegimentCostModifier, RegimentStatsBonus};
pub use composition::{MaxSameRegiment, MinRegimentsPresent, RegimentRequires, RegimentsExclusive};
pub use improvements::{FreeImprovement, MandatoryImprovement};
pub use support::MandatorySupportPerRegiment;

use crate::rules::registry::RuleRegistry;

pub fn register_builtin(registry: &mut RuleRegistry) {
    registry.register_division(Box::new(MandatorySupportPerRegiment));
    registry.register_division(Box::new(MaxSameRegiment));
    registry.register_division(Box::new(MinRegimentsPresent));
    registry.register_division(Box::new(RegimentRequires));
    registry.register_division(Box::new(RegimentsExclusive));
    registry.register_division(Box::new(DivisionBonusRule));
    registry.register_division(Box::new(FreeImprovement));
    registry.register_division(Box::new(MandatoryImprovement));
    registry.register_division(Box::new(RegimentStatsBonus));
    registry.register_division(Box::new(RegimentCostModifier));
}

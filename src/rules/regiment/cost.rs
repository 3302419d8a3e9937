//! Cost adjustments and free grants inside one regiment

use serde::Deserialize;

use crate::core::types::{ImprovementId, UnitId};
use crate::rules::hooks::{ImprovementCharge, RegimentRule, RegimentScope, UsageState};
use crate::rules::params::RuleParams;

/// Adds `amount` to the regiment's base cost, optionally only when one of
/// `when_units` is present
pub struct BaseCostModifier;

#[derive(Debug, Deserialize)]
struct BaseCostParams {
    amount: i32,
    #[serde(default)]
    when_units: Vec<UnitId>,
}

impl RegimentRule for BaseCostModifier {
    fn id(&self) -> &'static str {
        "base_cost_modifier"
    }

    fn modify_cost(&self, running: i32, scope: &RegimentScope<'_>, params: &RuleParams) -> i32 {
        match params.decode::<BaseCostParams>(self.id()) {
            Some(params) if params.when_units.is_empty() || scope.has_any_unit(&params.when_units) => {
                running + params.amount
            }
            _ => running,
        }
    }
}

/// The first `count` purchases of an improvement in the regiment are free
pub struct FirstFreeImprovement;

#[derive(Debug, Deserialize)]
struct FirstFreeParams {
    improvement: ImprovementId,
    #[serde(default = "one")]
    count: u32,
}

fn one() -> u32 {
    1
}

impl FirstFreeParams {
    fn usage_key(&self) -> String {
        format!("first_free_improvement:{}", self.improvement)
    }
}

impl RegimentRule for FirstFreeImprovement {
    fn id(&self) -> &'static str {
        "first_free_improvement"
    }

    fn improvement_refunds(&self, scope: &RegimentScope<'_>, params: &RuleParams) -> Vec<i32> {
        let Some(params) = params.decode::<FirstFreeParams>(self.id()) else {
            return Vec::new();
        };
        let mut remaining = params.count;
        scope
            .purchases
            .iter()
            .map(|charge| {
                if charge.improvement == params.improvement && remaining > 0 {
                    remaining -= 1;
                    charge.cost
                } else {
                    0
                }
            })
            .collect()
    }

    fn is_improvement_free(
        &self,
        _unit: Option<&UnitId>,
        improvement: &ImprovementId,
        params: &RuleParams,
        usage: UsageState,
    ) -> (bool, UsageState) {
        let Some(params) = params.decode::<FirstFreeParams>(self.id()) else {
            return (false, usage);
        };
        let key = params.usage_key();
        if &params.improvement == improvement && usage.used(&key) < params.count {
            (true, usage.record(&key))
        } else {
            (false, usage)
        }
    }
}

/// Reduces each purchase of an improvement by `amount`, never below zero
pub struct ImprovementDiscount;

#[derive(Debug, Deserialize)]
struct DiscountParams {
    improvement: ImprovementId,
    amount: i32,
    #[serde(default)]
    units: Vec<UnitId>,
}

impl DiscountParams {
    fn covers(&self, charge: &ImprovementCharge) -> bool {
        charge.improvement == self.improvement
            && (self.units.is_empty()
                || charge.unit_id.as_ref().map_or(false, |u| self.units.contains(u)))
    }
}

impl RegimentRule for ImprovementDiscount {
    fn id(&self) -> &'static str {
        "improvement_discount"
    }

    fn improvement_refunds(&self, scope: &RegimentScope<'_>, params: &RuleParams) -> Vec<i32> {
        let Some(params) = params.decode::<DiscountParams>(self.id()) else {
            return Vec::new();
        };
        scope
            .purchases
            .iter()
            .map(|charge| {
                if params.covers(charge) {
                    params.amount.clamp(0, charge.cost.max(0))
                } else {
                    0
                }
            })
            .collect()
    }
}

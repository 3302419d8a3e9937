//! Improvements a division grants to its regiments

use serde::Deserialize;

use crate::core::types::{ImprovementId, RegimentId, UnitId};
use crate::rules::hooks::{DivisionRule, RegimentScope};
use crate::rules::params::RuleParams;

/// Which improvement a grant covers, and where. Empty lists match everything.
#[derive(Debug, Deserialize)]
struct Grant {
    improvement: ImprovementId,
    #[serde(default)]
    regiments: Vec<RegimentId>,
    #[serde(default)]
    units: Vec<UnitId>,
}

impl Grant {
    fn covers(&self, unit: Option<&UnitId>, improvement: &ImprovementId, regiment_id: &RegimentId) -> bool {
        &self.improvement == improvement
            && (self.regiments.is_empty() || self.regiments.contains(regiment_id))
            && (self.units.is_empty() || unit.map_or(false, |u| self.units.contains(u)))
    }
}

/// The improvement is free where covered: it must still be bought, and its
/// upgrade-point cost is refunded.
pub struct FreeImprovement;

impl DivisionRule for FreeImprovement {
    fn id(&self) -> &'static str {
        "free_improvement"
    }

    fn refunds(&self, regiment: &RegimentScope<'_>, params: &RuleParams) -> Vec<i32> {
        let Some(grant) = params.decode::<Grant>(self.id()) else {
            return Vec::new();
        };
        regiment
            .purchases
            .iter()
            .map(|charge| {
                if grant.covers(charge.unit_id.as_ref(), &charge.improvement, regiment.regiment_id) {
                    charge.cost
                } else {
                    0
                }
            })
            .collect()
    }

    fn is_improvement_free(
        &self,
        unit: Option<&UnitId>,
        improvement: &ImprovementId,
        params: &RuleParams,
        regiment_id: &RegimentId,
    ) -> bool {
        params
            .decode::<Grant>(self.id())
            .map_or(false, |grant| grant.covers(unit, improvement, regiment_id))
    }
}

/// The improvement is always active where covered, without purchase
pub struct MandatoryImprovement;

impl DivisionRule for MandatoryImprovement {
    fn id(&self) -> &'static str {
        "mandatory_improvement"
    }

    fn is_mandatory(
        &self,
        unit: Option<&UnitId>,
        improvement: &ImprovementId,
        params: &RuleParams,
        regiment_id: &RegimentId,
    ) -> bool {
        params
            .decode::<Grant>(self.id())
            .map_or(false, |grant| grant.covers(unit, improvement, regiment_id))
    }
}

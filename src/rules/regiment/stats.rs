//! Stat modifiers triggered by the units a regiment contains

use serde::Deserialize;

use crate::core::types::UnitId;
use crate::engine::stats::{FormationType, Stats};
use crate::rules::hooks::{RegimentRule, RegimentScope, StatsPatch};
use crate::rules::params::RuleParams;

/// Force a formation type while any trigger unit is present
pub struct FormationOverride;

#[derive(Debug, Deserialize)]
struct FormationParams {
    trigger_units: Vec<UnitId>,
    formation: FormationType,
}

impl RegimentRule for FormationOverride {
    fn id(&self) -> &'static str {
        "formation_override"
    }

    fn modify_stats(&self, _stats: &Stats, scope: &RegimentScope<'_>, params: &RuleParams) -> StatsPatch {
        match params.decode::<FormationParams>(self.id()) {
            Some(params) if scope.has_any_unit(&params.trigger_units) => StatsPatch {
                formation: Some(params.formation),
                ..StatsPatch::default()
            },
            _ => StatsPatch::default(),
        }
    }
}

/// Add flat deltas to the running stats, always or only with a trigger unit present
pub struct StatBonus;

#[derive(Debug, Deserialize)]
struct BonusParams {
    #[serde(default)]
    trigger_units: Vec<UnitId>,
    #[serde(default)]
    recon: i32,
    #[serde(default)]
    motivation: i32,
    #[serde(default)]
    activations: i32,
    #[serde(default)]
    awareness: i32,
    #[serde(default)]
    orders: i32,
}

impl RegimentRule for StatBonus {
    fn id(&self) -> &'static str {
        "stat_bonus"
    }

    fn modify_stats(&self, stats: &Stats, scope: &RegimentScope<'_>, params: &RuleParams) -> StatsPatch {
        let Some(params) = params.decode::<BonusParams>(self.id()) else {
            return StatsPatch::default();
        };
        if !params.trigger_units.is_empty() && !scope.has_any_unit(&params.trigger_units) {
            return StatsPatch::default();
        }
        StatsPatch {
            recon: Some(stats.recon + params.recon),
            motivation: Some(stats.motivation + params.motivation),
            activations: Some(stats.activations + params.activations),
            awareness: Some(stats.awareness + params.awareness),
            orders: Some(stats.orders + params.orders),
            formation: None,
        }
    }
}

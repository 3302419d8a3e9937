//! Flat bonuses a division grants, to itself or to particular regiments

use serde::Deserialize;

use crate::core::types::RegimentId;
use crate::roster::division::DivisionConfig;
use crate::rules::hooks::{CostModifier, DivisionBonus, DivisionRule, DivisionScope, StatsBonus};
use crate::rules::params::RuleParams;

/// Extra upgrade points and/or primary cost for the whole division,
/// optionally only while a given regiment is fielded
pub struct DivisionBonusRule;

#[derive(Debug, Deserialize)]
struct BonusParams {
    #[serde(default)]
    secondary_points: i32,
    #[serde(default)]
    cost: i32,
    #[serde(default)]
    requires_regiment: Option<RegimentId>,
}

impl DivisionRule for DivisionBonusRule {
    fn id(&self) -> &'static str {
        "division_bonus"
    }

    fn bonus(&self, scope: &DivisionScope<'_>, params: &RuleParams) -> DivisionBonus {
        let Some(params) = params.decode::<BonusParams>(self.id()) else {
            return DivisionBonus::default();
        };
        if let Some(required) = &params.requires_regiment {
            if !scope.division.has_regiment(required) {
                return DivisionBonus::default();
            }
        }
        DivisionBonus {
            secondary_points: params.secondary_points,
            cost: params.cost,
        }
    }
}

/// Stat bonus for every copy of the listed regiments
pub struct RegimentStatsBonus;

#[derive(Debug, Deserialize)]
struct StatsParams {
    regiments: Vec<RegimentId>,
    #[serde(default)]
    motivation: i32,
    #[serde(default)]
    recon: i32,
    #[serde(default)]
    awareness: i32,
}

impl DivisionRule for RegimentStatsBonus {
    fn id(&self) -> &'static str {
        "regiment_stats_bonus"
    }

    fn regiment_stats_bonus(
        &self,
        _division: &DivisionConfig,
        regiment_id: &RegimentId,
        params: &RuleParams,
    ) -> StatsBonus {
        match params.decode::<StatsParams>(self.id()) {
            Some(params) if params.regiments.contains(regiment_id) => StatsBonus {
                motivation: params.motivation,
                recon: params.recon,
                awareness: params.awareness,
            },
            _ => StatsBonus::default(),
        }
    }
}

/// Primary cost and/or upgrade-point adjustment for the listed regiments
pub struct RegimentCostModifier;

#[derive(Debug, Deserialize)]
struct CostParams {
    regiments: Vec<RegimentId>,
    #[serde(default)]
    primary_cost: i32,
    #[serde(default)]
    secondary_points: i32,
}

impl DivisionRule for RegimentCostModifier {
    fn id(&self) -> &'static str {
        "regiment_cost_modifier"
    }

    fn regiment_cost_modifier(
        &self,
        _division: &DivisionConfig,
        regiment_id: &RegimentId,
        params: &RuleParams,
    ) -> CostModifier {
        match params.decode::<CostParams>(self.id()) {
            Some(params) if params.regiments.contains(regiment_id) => CostModifier {
                primary_cost: params.primary_cost,
                secondary_points: params.secondary_points,
            },
            _ => CostModifier::default(),
        }
    }
}

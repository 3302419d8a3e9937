//! Capability interfaces implemented by division- and regiment-scope rules
//!
//! Every hook has a neutral default, so a rule implements only the
//! capabilities it actually has. The [`RuleRegistry`](super::RuleRegistry)
//! folds hook results across a template's rule list in declared order.

use std::collections::BTreeMap;

use crate::catalog::division::DivisionTemplate;
use crate::catalog::regiment::RegimentTemplate;
use crate::catalog::registry::Catalog;
use crate::core::types::{ImprovementId, PositionKey, RegimentId, UnitId};
use crate::engine::resolver::ActiveUnit;
use crate::engine::stats::{FormationType, Stats};
use crate::engine::view::DivisionLink;
use crate::roster::division::DivisionConfig;
use crate::roster::regiment::RegimentConfig;
use crate::rules::params::RuleParams;

/// Snapshot handed to division-scope hooks
#[derive(Debug, Clone, Copy)]
pub struct DivisionScope<'a> {
    pub catalog: &'a Catalog,
    pub template: &'a DivisionTemplate,
    pub division: &'a DivisionConfig,
}

impl<'a> DivisionScope<'a> {
    /// Display name of a regiment, falling back to its id
    pub fn regiment_name(&self, id: &RegimentId) -> String {
        self.catalog
            .regiment(Some(&self.division.faction), id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn regiment_names(&self, ids: &[RegimentId]) -> Vec<String> {
        ids.iter().map(|id| self.regiment_name(id)).collect()
    }

    pub fn unit_name(&self, id: &UnitId) -> String {
        unit_name(self.catalog, id)
    }
}

pub(crate) fn unit_name(catalog: &Catalog, id: &UnitId) -> String {
    catalog
        .unit(id)
        .map(|u| u.name.clone())
        .unwrap_or_else(|| id.to_string())
}

/// One purchased, chargeable improvement inside a regiment
#[derive(Debug, Clone, PartialEq)]
pub struct ImprovementCharge {
    /// Position of the unit; `None` for regiment-scoped purchases
    pub position: Option<PositionKey>,
    pub unit_id: Option<UnitId>,
    pub improvement: ImprovementId,
    /// Secondary cost before any discount
    pub cost: i32,
}

/// Snapshot handed to regiment-scope hooks (and division hooks that look
/// inside one regiment)
#[derive(Debug, Clone, Copy)]
pub struct RegimentScope<'a> {
    pub catalog: &'a Catalog,
    pub regiment_id: &'a RegimentId,
    pub template: &'a RegimentTemplate,
    pub config: &'a RegimentConfig,
    pub units: &'a [ActiveUnit],
    /// Purchased improvements that are charged (mandatory ones excluded)
    pub purchases: &'a [ImprovementCharge],
    pub division: Option<DivisionLink<'a>>,
}

impl<'a> RegimentScope<'a> {
    /// Number of active units whose id is in `ids`
    pub fn count_units(&self, ids: &[UnitId]) -> usize {
        self.units.iter().filter(|u| ids.contains(&u.unit_id)).count()
    }

    pub fn has_any_unit(&self, ids: &[UnitId]) -> bool {
        self.units.iter().any(|u| ids.contains(&u.unit_id))
    }

    /// Display names of `ids`, joined for problem messages
    pub fn unit_names(&self, ids: &[UnitId]) -> String {
        ids.iter()
            .map(|id| unit_name(self.catalog, id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Division-wide bonus granted by a division rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DivisionBonus {
    pub secondary_points: i32,
    pub cost: i32,
}

/// Per-regiment stat bonus granted by a division rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsBonus {
    pub motivation: i32,
    pub recon: i32,
    pub awareness: i32,
}

/// Per-regiment cost modifier granted by a division rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CostModifier {
    pub primary_cost: i32,
    pub secondary_points: i32,
}

/// Partial stats returned by `modify_stats`; set fields replace the running value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsPatch {
    pub recon: Option<i32>,
    pub motivation: Option<i32>,
    pub activations: Option<i32>,
    pub orders: Option<i32>,
    pub awareness: Option<i32>,
    pub formation: Option<FormationType>,
}

impl StatsPatch {
    pub fn apply(self, mut stats: Stats) -> Stats {
        if let Some(recon) = self.recon {
            stats.recon = recon;
        }
        if let Some(motivation) = self.motivation {
            stats.motivation = motivation;
        }
        if let Some(activations) = self.activations {
            stats.activations = activations;
        }
        if let Some(orders) = self.orders {
            stats.orders = orders;
        }
        if let Some(awareness) = self.awareness {
            stats.awareness = awareness;
        }
        if let Some(formation) = self.formation {
            stats.formation = Some(formation);
        }
        stats
    }
}

/// Counters threaded through one free-grant evaluation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageState {
    grants: BTreeMap<String, u32>,
}

impl UsageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn used(&self, key: &str) -> u32 {
        self.grants.get(key).copied().unwrap_or(0)
    }

    /// Count one more grant under `key`
    pub fn record(mut self, key: &str) -> Self {
        *self.grants.entry(key.to_string()).or_insert(0) += 1;
        self
    }
}

pub trait DivisionRule: Send + Sync {
    fn id(&self) -> &'static str;

    fn validate(&self, _scope: &DivisionScope<'_>, _params: &RuleParams) -> Vec<String> {
        Vec::new()
    }

    fn bonus(&self, _scope: &DivisionScope<'_>, _params: &RuleParams) -> DivisionBonus {
        DivisionBonus::default()
    }

    /// Upgrade points refunded per purchase inside one regiment, aligned
    /// with `regiment.purchases`. Missing entries refund nothing.
    fn refunds(&self, _regiment: &RegimentScope<'_>, _params: &RuleParams) -> Vec<i32> {
        Vec::new()
    }

    fn is_improvement_free(
        &self,
        _unit: Option<&UnitId>,
        _improvement: &ImprovementId,
        _params: &RuleParams,
        _regiment_id: &RegimentId,
    ) -> bool {
        false
    }

    fn is_mandatory(
        &self,
        _unit: Option<&UnitId>,
        _improvement: &ImprovementId,
        _params: &RuleParams,
        _regiment_id: &RegimentId,
    ) -> bool {
        false
    }

    fn regiment_stats_bonus(
        &self,
        _division: &DivisionConfig,
        _regiment_id: &RegimentId,
        _params: &RuleParams,
    ) -> StatsBonus {
        StatsBonus::default()
    }

    fn regiment_cost_modifier(
        &self,
        _division: &DivisionConfig,
        _regiment_id: &RegimentId,
        _params: &RuleParams,
    ) -> CostModifier {
        CostModifier::default()
    }

    /// Extra standalone purchases of a support unit this rule unlocks
    fn support_allowance(
        &self,
        _scope: &DivisionScope<'_>,
        _unit: &UnitId,
        _params: &RuleParams,
    ) -> Option<u32> {
        None
    }
}

pub trait RegimentRule: Send + Sync {
    fn id(&self) -> &'static str;

    fn validate(&self, _scope: &RegimentScope<'_>, _params: &RuleParams) -> Option<String> {
        None
    }

    fn modify_stats(
        &self,
        _stats: &Stats,
        _scope: &RegimentScope<'_>,
        _params: &RuleParams,
    ) -> StatsPatch {
        StatsPatch::default()
    }

    fn modify_cost(&self, running: i32, _scope: &RegimentScope<'_>, _params: &RuleParams) -> i32 {
        running
    }

    /// Same shape as [`DivisionRule::refunds`]
    fn improvement_refunds(&self, _scope: &RegimentScope<'_>, _params: &RuleParams) -> Vec<i32> {
        Vec::new()
    }

    fn is_improvement_free(
        &self,
        _unit: Option<&UnitId>,
        _improvement: &ImprovementId,
        _params: &RuleParams,
        usage: UsageState,
    ) -> (bool, UsageState) {
        (false, usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_state_counts_per_key() {
        let usage = UsageState::new().record("a").record("a").record("b");
        assert_eq!(usage.used("a"), 2);
        assert_eq!(usage.used("b"), 1);
        assert_eq!(usage.used("c"), 0);
    }

    #[test]
    fn test_patch_overrides_only_set_fields() {
        let stats = Stats {
            recon: 2,
            motivation: 3,
            ..Stats::default()
        };
        let patched = StatsPatch {
            recon: Some(5),
            formation: Some(FormationType::Mixed),
            ..StatsPatch::default()
        }
        .apply(stats);
        assert_eq!(patched.recon, 5);
        assert_eq!(patched.motivation, 3);
        assert_eq!(patched.formation, Some(FormationType::Mixed));
    }
}

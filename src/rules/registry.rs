//! Rule registries and the dispatcher that folds hook results
//!
//! For every hook the registry walks the declaring template's invocation
//! list in order: numeric hooks sum, boolean hooks OR, validators
//! concatenate, stat and cost modifiers fold left to right. Refunds are the
//! exception: each purchase takes the largest single offer. Invocations
//! naming an unregistered rule are skipped.

use std::sync::OnceLock;

use ahash::AHashMap;

use crate::core::types::{ImprovementId, RegimentId, UnitId};
use crate::engine::stats::Stats;
use crate::engine::view::DivisionLink;
use crate::rules::hooks::{
    CostModifier, DivisionBonus, DivisionRule, DivisionScope, RegimentRule, RegimentScope,
    StatsBonus, UsageState,
};
use crate::rules::params::{RuleInvocation, RuleParams};

#[derive(Default)]
pub struct RuleRegistry {
    division: AHashMap<&'static str, Box<dyn DivisionRule>>,
    regiment: AHashMap<&'static str, Box<dyn RegimentRule>>,
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut division: Vec<&str> = self.division.keys().copied().collect();
        let mut regiment: Vec<&str> = self.regiment.keys().copied().collect();
        division.sort_unstable();
        regiment.sort_unstable();
        f.debug_struct("RuleRegistry")
            .field("division", &division)
            .field("regiment", &regiment)
            .finish()
    }
}

static BUILTIN: OnceLock<RuleRegistry> = OnceLock::new();

/// Shared registry holding every built-in rule family
pub fn builtin_rules() -> &'static RuleRegistry {
    BUILTIN.get_or_init(RuleRegistry::builtin)
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in rule family registered
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        crate::rules::division::register_builtin(&mut registry);
        crate::rules::regiment::register_builtin(&mut registry);
        registry
    }

    pub fn register_division(&mut self, rule: Box<dyn DivisionRule>) {
        self.division.insert(rule.id(), rule);
    }

    pub fn register_regiment(&mut self, rule: Box<dyn RegimentRule>) {
        self.regiment.insert(rule.id(), rule);
    }

    pub fn has_division_rule(&self, id: &str) -> bool {
        self.division.contains_key(id)
    }

    pub fn has_regiment_rule(&self, id: &str) -> bool {
        self.regiment.contains_key(id)
    }

    fn division_rules<'r>(
        &'r self,
        invocations: &'r [RuleInvocation],
    ) -> impl Iterator<Item = (&'r dyn DivisionRule, &'r RuleParams)> + 'r {
        invocations.iter().filter_map(move |invocation| {
            match self.division.get(invocation.id.as_str()) {
                Some(rule) => Some((rule.as_ref(), &invocation.params)),
                None => {
                    tracing::debug!("Skipping unknown division rule '{}'", invocation.id);
                    None
                }
            }
        })
    }

    fn regiment_rules<'r>(
        &'r self,
        invocations: &'r [RuleInvocation],
    ) -> impl Iterator<Item = (&'r dyn RegimentRule, &'r RuleParams)> + 'r {
        invocations.iter().filter_map(move |invocation| {
            match self.regiment.get(invocation.id.as_str()) {
                Some(rule) => Some((rule.as_ref(), &invocation.params)),
                None => {
                    tracing::debug!("Skipping unknown regiment rule '{}'", invocation.id);
                    None
                }
            }
        })
    }

    /// Division rules that apply while evaluating a regiment
    fn linked_division_rules<'r>(
        &'r self,
        division: Option<DivisionLink<'r>>,
    ) -> impl Iterator<Item = (&'r dyn DivisionRule, &'r RuleParams)> + 'r {
        let invocations: &'r [RuleInvocation] = match division {
            Some(link) => link.template.rules.as_slice(),
            None => &[],
        };
        self.division_rules(invocations)
    }

    // === DIVISION SCOPE ===

    pub fn validate_division(&self, scope: &DivisionScope<'_>) -> Vec<String> {
        self.division_rules(&scope.template.rules)
            .flat_map(|(rule, params)| rule.validate(scope, params))
            .collect()
    }

    pub fn division_bonus(&self, scope: &DivisionScope<'_>) -> DivisionBonus {
        self.division_rules(&scope.template.rules)
            .map(|(rule, params)| rule.bonus(scope, params))
            .fold(DivisionBonus::default(), |acc, bonus| DivisionBonus {
                secondary_points: acc.secondary_points + bonus.secondary_points,
                cost: acc.cost + bonus.cost,
            })
    }

    /// Standalone purchases of a support unit unlocked by rules, if any rule speaks to it
    pub fn support_allowance(&self, scope: &DivisionScope<'_>, unit: &UnitId) -> Option<u32> {
        self.division_rules(&scope.template.rules)
            .filter_map(|(rule, params)| rule.support_allowance(scope, unit, params))
            .reduce(|a, b| a.saturating_add(b))
    }

    pub fn regiment_stats_bonus(&self, division: DivisionLink<'_>, regiment_id: &RegimentId) -> StatsBonus {
        self.division_rules(&division.template.rules)
            .map(|(rule, params)| rule.regiment_stats_bonus(division.config, regiment_id, params))
            .fold(StatsBonus::default(), |acc, bonus| StatsBonus {
                motivation: acc.motivation + bonus.motivation,
                recon: acc.recon + bonus.recon,
                awareness: acc.awareness + bonus.awareness,
            })
    }

    pub fn regiment_cost_modifier(
        &self,
        division: DivisionLink<'_>,
        regiment_id: &RegimentId,
    ) -> CostModifier {
        self.division_rules(&division.template.rules)
            .map(|(rule, params)| rule.regiment_cost_modifier(division.config, regiment_id, params))
            .fold(CostModifier::default(), |acc, modifier| CostModifier {
                primary_cost: acc.primary_cost + modifier.primary_cost,
                secondary_points: acc.secondary_points + modifier.secondary_points,
            })
    }

    /// Is the improvement granted without purchase by a division rule?
    pub fn is_mandatory(
        &self,
        division: Option<DivisionLink<'_>>,
        unit: Option<&UnitId>,
        improvement: &ImprovementId,
        regiment_id: &RegimentId,
    ) -> bool {
        self.linked_division_rules(division)
            .any(|(rule, params)| rule.is_mandatory(unit, improvement, params, regiment_id))
    }

    // === REGIMENT SCOPE ===

    pub fn validate_regiment(&self, scope: &RegimentScope<'_>) -> Vec<String> {
        self.regiment_rules(&scope.template.rules)
            .filter_map(|(rule, params)| rule.validate(scope, params))
            .collect()
    }

    pub fn modify_stats(&self, stats: Stats, scope: &RegimentScope<'_>) -> Stats {
        self.regiment_rules(&scope.template.rules)
            .fold(stats, |running, (rule, params)| {
                rule.modify_stats(&running, scope, params).apply(running)
            })
    }

    pub fn modify_cost(&self, base: i32, scope: &RegimentScope<'_>) -> i32 {
        self.regiment_rules(&scope.template.rules)
            .fold(base, |running, (rule, params)| rule.modify_cost(running, scope, params))
    }

    /// Refund per purchase, aligned with `scope.purchases`
    ///
    /// Each purchase takes the largest refund any rule in either scope offers
    /// it, capped at its own cost, so one purchase is never refunded twice.
    pub fn purchase_refunds(&self, scope: &RegimentScope<'_>) -> Vec<i32> {
        let offers = self
            .linked_division_rules(scope.division)
            .map(|(rule, params)| rule.refunds(scope, params))
            .chain(
                self.regiment_rules(&scope.template.rules)
                    .map(|(rule, params)| rule.improvement_refunds(scope, params)),
            );

        let mut refunds = vec![0; scope.purchases.len()];
        for offer in offers {
            for (refund, offered) in refunds.iter_mut().zip(offer) {
                *refund = (*refund).max(offered);
            }
        }
        for (refund, charge) in refunds.iter_mut().zip(scope.purchases) {
            *refund = (*refund).clamp(0, charge.cost.max(0));
        }
        refunds
    }

    /// Upgrade points refunded inside a regiment, from both rule scopes
    pub fn improvement_discount(&self, scope: &RegimentScope<'_>) -> i32 {
        self.purchase_refunds(scope).iter().sum()
    }

    /// One free-grant query, threading the usage counters through every rule
    pub fn is_improvement_free(
        &self,
        scope: &RegimentScope<'_>,
        unit: Option<&UnitId>,
        improvement: &ImprovementId,
        usage: UsageState,
    ) -> (bool, UsageState) {
        let division_free = self
            .linked_division_rules(scope.division)
            .any(|(rule, params)| rule.is_improvement_free(unit, improvement, params, scope.regiment_id));

        self.regiment_rules(&scope.template.rules).fold(
            (division_free, usage),
            |(free, usage), (rule, params)| {
                let (granted, usage) = rule.is_improvement_free(unit, improvement, params, usage);
                (free || granted, usage)
            },
        )
    }

    /// Free flag for every purchase of the regiment, in purchase order
    pub fn free_purchases(&self, scope: &RegimentScope<'_>) -> Vec<bool> {
        let mut usage = UsageState::new();
        let mut flags = Vec::with_capacity(scope.purchases.len());
        for charge in scope.purchases {
            let (free, next) =
                self.is_improvement_free(scope, charge.unit_id.as_ref(), &charge.improvement, usage);
            flags.push(free);
            usage = next;
        }
        flags
    }
}

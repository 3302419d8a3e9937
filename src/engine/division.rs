//! Division-level derivations: totals, upgrade-point budget, main force,
//! division type

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::division::DivisionTemplate;
use crate::catalog::regiment::RegimentTemplate;
use crate::catalog::unit::{UnitDefinition, UnitTrait};
use crate::core::types::{RegimentId, RegimentPosition, SlotGroup};
use crate::engine::improvements::PreparedRegiment;
use crate::engine::stats::{FormationType, Stats};
use crate::engine::view::{DivisionLink, RegimentView};
use crate::engine::Engine;
use crate::roster::division::{DivisionConfig, RegimentEntry, SupportPurchase};
use crate::rules::hooks::{DivisionBonus, DivisionScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivisionType {
    Cavalry,
    Foot,
    Mixed,
}

impl fmt::Display for DivisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DivisionType::Cavalry => "Cavalry division",
            DivisionType::Foot => "Foot division",
            DivisionType::Mixed => "Mixed division",
        };
        write!(f, "{}", name)
    }
}

/// Classify from foot-type (foot or mixed) and mounted regiment counts
pub fn classify_division(foot: usize, mounted: usize) -> DivisionType {
    if foot <= 1 {
        DivisionType::Cavalry
    } else if foot > mounted {
        DivisionType::Foot
    } else {
        DivisionType::Mixed
    }
}

/// One fielded regiment after evaluation
#[derive(Debug, Clone)]
pub struct RegimentEvaluation<'d> {
    pub position: RegimentPosition,
    pub entry: &'d RegimentEntry,
    pub view: RegimentView<'d>,
    pub prepared: PreparedRegiment,
    /// Stats without the main-force bonus
    pub stats: Stats,
    pub secondary_cost: i32,
}

impl<'d> RegimentEvaluation<'d> {
    pub fn template(&self) -> &'d RegimentTemplate {
        self.view.template
    }

    pub fn regiment_id(&self) -> &'d RegimentId {
        &self.entry.regiment_id
    }

    /// Custom name if the user gave one, else the template name
    pub fn name(&self) -> &'d str {
        self.entry
            .custom_name
            .as_deref()
            .unwrap_or(&self.view.template.name)
    }
}

/// Everything derived from one division snapshot
#[derive(Debug, Clone)]
pub struct DivisionEvaluation<'d> {
    pub template: &'d DivisionTemplate,
    pub division: &'d DivisionConfig,
    pub regiments: Vec<RegimentEvaluation<'d>>,
    /// Filled positions whose regiment template could not be found
    pub missing: Vec<(RegimentPosition, RegimentId)>,
    pub main_force: Option<RegimentPosition>,
    pub bonus: DivisionBonus,
    pub primary_cost: i32,
    pub secondary_spend: i32,
    pub secondary_limit: i32,
    pub division_type: Option<DivisionType>,
}

impl<'d> DivisionEvaluation<'d> {
    /// Signed; negative when overspent
    pub fn secondary_remaining(&self) -> i32 {
        self.secondary_limit - self.secondary_spend
    }

    pub fn regiment(&self, position: RegimentPosition) -> Option<&RegimentEvaluation<'d>> {
        self.regiments.iter().find(|r| r.position == position)
    }

    pub fn main_force_regiment(&self) -> Option<&RegimentEvaluation<'d>> {
        self.main_force.and_then(|position| self.regiment(position))
    }

    /// Support purchases not attached to a fielded regiment
    pub fn unassigned_support(&self) -> impl Iterator<Item = &'d SupportPurchase> + '_ {
        self.division.support.iter().filter(move |purchase| {
            purchase
                .assignment
                .map_or(true, |position| self.regiment(position).is_none())
        })
    }
}

/// Main-force candidacy: base or additional slot, not flagged vanguard, not allied
fn is_main_force_candidate(
    template: &DivisionTemplate,
    division: &DivisionConfig,
    regiment: &RegimentEvaluation<'_>,
) -> bool {
    regiment.position.slot != SlotGroup::Vanguard
        && !division.is_vanguard(regiment.position)
        && !template.is_allied(regiment.regiment_id())
}

/// Choose the main force among evaluated regiments
pub fn select_main_force(
    template: &DivisionTemplate,
    division: &DivisionConfig,
    regiments: &[RegimentEvaluation<'_>],
) -> Option<RegimentPosition> {
    let candidates: Vec<&RegimentEvaluation<'_>> = regiments
        .iter()
        .filter(|r| is_main_force_candidate(template, division, r))
        .collect();
    let top = candidates.iter().map(|r| r.stats.primary_cost).max()?;
    let tied: Vec<RegimentPosition> = candidates
        .iter()
        .filter(|r| r.stats.primary_cost == top)
        .map(|r| r.position)
        .collect();

    match division.preferred_main_force {
        Some(preferred) if tied.contains(&preferred) => Some(preferred),
        _ => tied.first().copied(),
    }
}

impl<'a> Engine<'a> {
    /// Evaluate every regiment and derive the division totals
    pub fn evaluate<'d>(
        &self,
        template: &'d DivisionTemplate,
        division: &'d DivisionConfig,
    ) -> DivisionEvaluation<'d>
    where
        'a: 'd,
    {
        let mut regiments = Vec::new();
        let mut missing = Vec::new();

        for (position, entry) in division.regiments() {
            let Some(regiment) = self.catalog.regiment(Some(&division.faction), &entry.regiment_id)
            else {
                tracing::warn!("Unknown regiment '{}' at {}", entry.regiment_id, position);
                missing.push((position, entry.regiment_id.clone()));
                continue;
            };
            let link = DivisionLink {
                config: division,
                template,
                position,
            };
            let view = RegimentView::in_division(regiment, entry, link);
            let prepared = self.prepare(&view);
            let stats = self.stats_of(&view, &prepared);
            let secondary_cost = self.secondary_cost_of(&view, &prepared);
            regiments.push(RegimentEvaluation {
                position,
                entry,
                view,
                prepared,
                stats,
                secondary_cost,
            });
        }

        let scope = DivisionScope {
            catalog: self.catalog,
            template,
            division,
        };
        let bonus = self.rules.division_bonus(&scope);
        let main_force = select_main_force(template, division, &regiments);

        let mut evaluation = DivisionEvaluation {
            template,
            division,
            regiments,
            missing,
            main_force,
            bonus,
            primary_cost: 0,
            secondary_spend: 0,
            secondary_limit: 0,
            division_type: None,
        };
        self.total(&mut evaluation);

        tracing::debug!(
            "Evaluated {}: {} regiments, primary {}, upgrade points {}/{}, main force {:?}",
            template.id,
            evaluation.regiments.len(),
            evaluation.primary_cost,
            evaluation.secondary_spend,
            evaluation.secondary_limit,
            evaluation.main_force
        );
        evaluation
    }

    fn total(&self, evaluation: &mut DivisionEvaluation<'_>) {
        let division = evaluation.division;
        let commander: Option<&UnitDefinition> =
            division.commander.as_ref().and_then(|id| self.catalog.unit(id));
        let unassigned: Vec<&UnitDefinition> = evaluation
            .unassigned_support()
            .filter_map(|purchase| self.catalog.unit(&purchase.unit_id))
            .collect();

        evaluation.primary_cost = evaluation.template.cost
            + commander.map_or(0, |u| u.cost)
            + evaluation.regiments.iter().map(|r| r.stats.primary_cost).sum::<i32>()
            + unassigned.iter().map(|u| u.cost).sum::<i32>()
            + evaluation.bonus.cost;

        evaluation.secondary_spend = commander.map_or(0, |u| u.upkeep)
            + evaluation.regiments.iter().map(|r| r.secondary_cost).sum::<i32>()
            + unassigned
                .iter()
                .filter(|u| !u.is_group())
                .map(|u| u.upkeep)
                .sum::<i32>();

        let regiment_supply: i32 = evaluation
            .regiments
            .iter()
            .flat_map(|r| r.prepared.units.iter())
            .filter_map(|active| self.catalog.unit(&active.unit_id))
            .map(|u| u.additional_supply)
            .sum();
        let support_supply: i32 = division
            .support
            .iter()
            .filter_map(|purchase| self.catalog.unit(&purchase.unit_id))
            .map(|u| u.additional_supply)
            .sum();
        evaluation.secondary_limit = evaluation.template.upgrade_points
            + commander.map_or(0, |u| u.additional_supply)
            + regiment_supply
            + support_supply
            + evaluation.bonus.secondary_points;

        evaluation.division_type = self.division_type_of(evaluation, &unassigned);
    }

    fn division_type_of(
        &self,
        evaluation: &DivisionEvaluation<'_>,
        unassigned: &[&UnitDefinition],
    ) -> Option<DivisionType> {
        if evaluation.regiments.is_empty() {
            return None;
        }
        let mut foot = 0;
        let mut mounted = 0;
        for regiment in &evaluation.regiments {
            match regiment.stats.formation {
                Some(FormationType::Mounted) => mounted += 1,
                Some(FormationType::Foot) | Some(FormationType::Mixed) => foot += 1,
                None => {}
            }
        }
        foot += unassigned
            .iter()
            .filter(|u| u.has_trait(UnitTrait::Artillery))
            .count();
        Some(classify_division(foot, mounted))
    }

    /// Stats as presented: the main force gains its read-time bonus
    pub fn presented_stats(&self, evaluation: &DivisionEvaluation<'_>, position: RegimentPosition) -> Option<Stats> {
        let regiment = evaluation.regiment(position)?;
        let mut stats = regiment.stats;
        if evaluation.main_force == Some(position) {
            stats.activations += self.config.main_force_activation_bonus;
            stats.motivation += self.config.main_force_motivation_bonus;
        }
        Some(stats)
    }
}

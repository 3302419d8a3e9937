//! Stats Engine: derived tactical statistics of a regiment

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::unit::UnitDefinition;
use crate::core::types::Category;
use crate::engine::improvements::PreparedRegiment;
use crate::engine::resolver::ActiveUnit;
use crate::engine::view::RegimentView;
use crate::engine::Engine;

/// Mobility classification of a regiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormationType {
    Mounted,
    Mixed,
    Foot,
}

impl fmt::Display for FormationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormationType::Mounted => "Mounted",
            FormationType::Mixed => "Mixed",
            FormationType::Foot => "Foot",
        };
        write!(f, "{}", name)
    }
}

/// Classify from combat-capable unit counts; `None` when there are none
pub fn classify_formation(foot: usize, mounted: usize) -> Option<FormationType> {
    let total = foot + mounted;
    if total == 0 {
        None
    } else if foot == 0 {
        Some(FormationType::Mounted)
    } else if foot * 2 < total {
        Some(FormationType::Mixed)
    } else {
        Some(FormationType::Foot)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub primary_cost: i32,
    pub recon: i32,
    pub motivation: i32,
    pub activations: i32,
    pub orders: i32,
    pub awareness: i32,
    pub formation: Option<FormationType>,
}

/// Per-unit accumulation before rules apply
#[derive(Debug, Default)]
struct Tally {
    recon: i32,
    motivation: f64,
    orders: i32,
    foot: usize,
    mounted: usize,
}

impl<'a> Engine<'a> {
    /// Stats of a regiment, including division contributions when linked.
    ///
    /// The main-force bonus is not included; it is applied at read time by
    /// the division evaluation.
    pub fn regiment_stats(&self, view: &RegimentView<'_>) -> Stats {
        let prepared = self.prepare(view);
        self.stats_of(view, &prepared)
    }

    pub(crate) fn stats_of(&self, view: &RegimentView<'_>, prepared: &PreparedRegiment) -> Stats {
        let template = view.template;
        let commander = self.commander_slot(&prepared.units);

        let mut tally = Tally::default();
        for (index, active) in prepared.units.iter().enumerate() {
            let Some(unit) = self.catalog.unit(&active.unit_id) else {
                tracing::warn!("Unknown unit '{}' in regiment {}", active.unit_id, template.id);
                continue;
            };
            tally.add(unit, self.config.motivation_half_step);
            if commander == Some(index) {
                tally.orders += template.commander_orders_bonus;
            }
        }

        let base = Stats {
            primary_cost: 0,
            recon: template.recon + tally.recon,
            motivation: tally.motivation.ceil() as i32,
            activations: template.activations,
            orders: tally.orders,
            awareness: template.awareness,
            formation: classify_formation(tally.foot, tally.mounted),
        };

        let scope = prepared.scope(self.catalog, view);
        let mut stats = self.rules.modify_stats(base, &scope);

        if let Some(link) = view.division {
            let bonus = self.rules.regiment_stats_bonus(link, view.regiment_id);
            stats.motivation += bonus.motivation;
            stats.recon += bonus.recon;
            stats.awareness += bonus.awareness;
        }

        stats.primary_cost = self.primary_cost_of(view, prepared);
        stats
    }

    /// Index of the unit in the commander slot: the first unit resolved
    /// from the commander group of the base category
    fn commander_slot(&self, units: &[ActiveUnit]) -> Option<usize> {
        units.iter().position(|u| {
            u.position.category == Category::Base && u.position.group == self.config.commander_group
        })
    }
}

impl Tally {
    fn add(&mut self, unit: &UnitDefinition, half_step: bool) {
        self.recon += unit.recon_delta();
        self.motivation += unit.rank.motivation(half_step);
        self.orders += unit.orders;
        if unit.is_group() {
            return;
        }
        if unit.is_mounted() {
            self.mounted += 1;
        } else {
            self.foot += 1;
        }
    }
}

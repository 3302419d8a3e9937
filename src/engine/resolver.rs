//! Structure Resolver: selection state to the flat list of active units
//!
//! Walks the template's selection structure in declaration order and
//! expands every resolved choice into one active unit per package member.

use serde::Serialize;

use crate::catalog::regiment::{Choice, Pod, RegimentTemplate};
use crate::core::types::{Category, ImprovementId, PositionKey, UnitId};
use crate::roster::regiment::{CategorySelection, RegimentConfig};

/// One unit instance that is "in" the regiment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveUnit {
    pub position: PositionKey,
    pub unit_id: UnitId,
    /// Package price; carried by the first member only
    pub cost_override: Option<i32>,
    pub extra_cost: i32,
    /// Improvements the structure grants this unit without purchase
    pub mandatory_improvements: Vec<ImprovementId>,
    /// Priced from the template's custom price table
    pub custom_priced: bool,
}

impl ActiveUnit {
    pub fn new(position: PositionKey, unit_id: UnitId) -> Self {
        Self {
            position,
            unit_id,
            cost_override: None,
            extra_cost: 0,
            mandatory_improvements: Vec::new(),
            custom_priced: false,
        }
    }
}

/// The choice a pod resolves to: the recorded pick, else its only choice
pub fn resolve_pod<'t>(pod: &'t Pod, pick: Option<&str>) -> Option<&'t Choice> {
    match pick {
        Some(key) => pod.choice(key),
        None if pod.is_mandatory() => pod.choices.first(),
        None => None,
    }
}

/// Resolve a regiment's selection into its ordered active units
pub fn resolve_structure(config: &RegimentConfig, template: &RegimentTemplate) -> Vec<ActiveUnit> {
    let mut units = Vec::new();

    for category in [Category::Base, Category::Additional] {
        if category == Category::Additional && !config.additional_enabled {
            continue;
        }
        let empty = CategorySelection::default();
        let selection = config.selection(category).unwrap_or(&empty);

        for group in template.structure.groups(category) {
            if group.is_optional() && !selection.optional.enabled {
                continue;
            }
            let picks = selection.picks(&group.name);

            for (pod_index, pod) in group.pods.iter().enumerate() {
                let pick = picks.get(pod_index).and_then(|p| p.as_deref());
                let Some(choice) = resolve_pod(pod, pick) else {
                    continue;
                };
                for (sub, unit_id) in choice.units.iter().enumerate() {
                    let first = sub == 0;
                    units.push(ActiveUnit {
                        position: PositionKey::new(category, group.name.clone(), pod_index, sub),
                        unit_id: unit_id.clone(),
                        cost_override: if first { choice.cost_override } else { None },
                        extra_cost: if first { choice.extra_cost } else { 0 },
                        mandatory_improvements: choice.mandatory_improvements.clone(),
                        custom_priced: false,
                    });
                }
            }
        }
    }

    if template.custom_slot.is_some() {
        if let Some(unit_id) = &config.custom_unit {
            let mut unit = ActiveUnit::new(PositionKey::custom(), unit_id.clone());
            unit.custom_priced = true;
            units.push(unit);
        }
    }

    tracing::trace!("Resolved {} active units for {}", units.len(), template.id);
    units
}

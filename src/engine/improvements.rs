//! Improvement accounting shared by the cost and stats engines
//!
//! A regiment is prepared once per evaluation: resolved units, the
//! improvements granted without purchase at every position, and the list
//! of purchases that are charged upgrade points.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::catalog::registry::Catalog;
use crate::core::types::{ImprovementId, PositionKey, UnitId};
use crate::engine::resolver::{resolve_structure, ActiveUnit};
use crate::engine::view::RegimentView;
use crate::engine::Engine;
use crate::rules::hooks::{ImprovementCharge, RegimentScope, UsageState};

/// A regiment resolved for one evaluation pass
#[derive(Debug, Clone, Default)]
pub struct PreparedRegiment {
    pub units: Vec<ActiveUnit>,
    /// Improvements active without purchase, per unit position
    pub mandatory: BTreeMap<PositionKey, BTreeSet<ImprovementId>>,
    /// Regiment-scoped improvements active without purchase
    pub regiment_mandatory: BTreeSet<ImprovementId>,
    /// Purchases that are charged, in position then purchase order
    pub charges: Vec<ImprovementCharge>,
}

impl PreparedRegiment {
    pub fn scope<'s>(&'s self, catalog: &'s Catalog, view: &RegimentView<'s>) -> RegimentScope<'s> {
        RegimentScope {
            catalog,
            regiment_id: view.regiment_id,
            template: view.template,
            config: view.config,
            units: &self.units,
            purchases: &self.charges,
            division: view.division,
        }
    }

    pub fn is_mandatory_at(&self, position: &PositionKey, improvement: &ImprovementId) -> bool {
        self.mandatory
            .get(position)
            .map_or(false, |set| set.contains(improvement))
    }

    pub fn unit_at(&self, position: &PositionKey) -> Option<&ActiveUnit> {
        self.units.iter().find(|u| &u.position == position)
    }
}

/// An improvement that is in effect, for presentation and export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveImprovement {
    /// `None` for regiment-scoped improvements
    pub position: Option<PositionKey>,
    pub unit_id: Option<UnitId>,
    pub improvement: ImprovementId,
    pub mandatory: bool,
    pub free: bool,
}

impl<'a> Engine<'a> {
    pub fn prepare(&self, view: &RegimentView<'_>) -> PreparedRegiment {
        let template = view.template;
        let units = resolve_structure(view.config, template);

        let mut mandatory = BTreeMap::new();
        let mut charges = Vec::new();

        for active in &units {
            let mut granted: BTreeSet<ImprovementId> =
                active.mandatory_improvements.iter().cloned().collect();

            if let Some(unit) = self.catalog.unit(&active.unit_id) {
                if !unit.is_group() {
                    for slot in &template.unit_improvements {
                        if self.rules.is_mandatory(
                            view.division,
                            Some(&active.unit_id),
                            &slot.id,
                            view.regiment_id,
                        ) {
                            granted.insert(slot.id.clone());
                        }
                    }

                    for improvement in view.config.improvements_at(&active.position) {
                        if granted.contains(improvement) {
                            continue;
                        }
                        let Some(terms) = self.catalog.unit_improvement_terms(template, improvement)
                        else {
                            tracing::warn!(
                                "Unknown improvement '{}' at {} in {}",
                                improvement,
                                active.position,
                                template.id
                            );
                            continue;
                        };
                        charges.push(ImprovementCharge {
                            position: Some(active.position.clone()),
                            unit_id: Some(active.unit_id.clone()),
                            improvement: improvement.clone(),
                            cost: terms.unit_cost(unit),
                        });
                    }
                }
            }

            mandatory.insert(active.position.clone(), granted);
        }

        let regiment_mandatory: BTreeSet<ImprovementId> = template
            .regiment_improvements
            .iter()
            .filter(|slot| self.rules.is_mandatory(view.division, None, &slot.id, view.regiment_id))
            .map(|slot| slot.id.clone())
            .collect();

        for improvement in &view.config.regiment_improvements {
            if regiment_mandatory.contains(improvement) {
                continue;
            }
            let Some(terms) = self.catalog.regiment_improvement_terms(template, improvement) else {
                tracing::warn!("Unknown regiment improvement '{}' in {}", improvement, template.id);
                continue;
            };
            charges.push(ImprovementCharge {
                position: None,
                unit_id: None,
                improvement: improvement.clone(),
                cost: terms.regiment_cost(),
            });
        }

        PreparedRegiment {
            units,
            mandatory,
            regiment_mandatory,
            charges,
        }
    }

    /// Primary cost of every improvement in effect: purchased or granted.
    /// Group-rank units carry no improvements, so nothing at their
    /// positions is counted.
    pub(crate) fn improvement_primary_cost(&self, view: &RegimentView<'_>, prepared: &PreparedRegiment) -> i32 {
        let template = view.template;
        let mut total = 0;

        for active in &prepared.units {
            let eligible = self
                .catalog
                .unit(&active.unit_id)
                .map_or(false, |unit| !unit.is_group());
            if !eligible {
                continue;
            }
            let mut effective: BTreeSet<&ImprovementId> =
                view.config.improvements_at(&active.position).iter().collect();
            if let Some(granted) = prepared.mandatory.get(&active.position) {
                effective.extend(granted.iter());
            }
            total += effective
                .into_iter()
                .filter_map(|id| self.catalog.unit_improvement_terms(template, id))
                .map(|terms| terms.primary_cost)
                .sum::<i32>();
        }

        let purchased = view
            .config
            .regiment_improvements
            .iter()
            .filter(|id| !prepared.regiment_mandatory.contains(*id));
        total += purchased
            .chain(prepared.regiment_mandatory.iter())
            .filter_map(|id| self.catalog.regiment_improvement_terms(template, id))
            .map(|terms| terms.primary_cost)
            .sum::<i32>();

        total
    }

    /// Every improvement in effect in a regiment, unit positions first
    pub fn effective_improvements(&self, view: &RegimentView<'_>) -> Vec<EffectiveImprovement> {
        let prepared = self.prepare(view);
        self.effective_of(view, &prepared)
    }

    pub(crate) fn effective_of(
        &self,
        view: &RegimentView<'_>,
        prepared: &PreparedRegiment,
    ) -> Vec<EffectiveImprovement> {
        let scope = prepared.scope(self.catalog, view);
        let free = self.rules.free_purchases(&scope);
        let is_free = |position: Option<&PositionKey>, improvement: &ImprovementId| {
            prepared
                .charges
                .iter()
                .zip(free.iter())
                .any(|(charge, free)| {
                    *free && charge.position.as_ref() == position && &charge.improvement == improvement
                })
        };

        let mut effective = Vec::new();
        for active in &prepared.units {
            let granted = prepared.mandatory.get(&active.position);
            let mut ids: BTreeSet<&ImprovementId> = granted.map(|g| g.iter().collect()).unwrap_or_default();
            ids.extend(view.config.improvements_at(&active.position));
            for id in ids {
                let mandatory = granted.map_or(false, |g| g.contains(id));
                effective.push(EffectiveImprovement {
                    position: Some(active.position.clone()),
                    unit_id: Some(active.unit_id.clone()),
                    improvement: id.clone(),
                    mandatory,
                    free: !mandatory && is_free(Some(&active.position), id),
                });
            }
        }

        for id in &prepared.regiment_mandatory {
            effective.push(EffectiveImprovement {
                position: None,
                unit_id: None,
                improvement: id.clone(),
                mandatory: true,
                free: false,
            });
        }
        for id in &view.config.regiment_improvements {
            if prepared.regiment_mandatory.contains(id) {
                continue;
            }
            effective.push(EffectiveImprovement {
                position: None,
                unit_id: None,
                improvement: id.clone(),
                mandatory: false,
                free: is_free(None, id),
            });
        }
        effective
    }

    /// Is the improvement active at this position without purchase?
    ///
    /// `position` of `None` asks about a regiment-scoped improvement.
    pub fn is_improvement_mandatory(
        &self,
        view: &RegimentView<'_>,
        position: Option<&PositionKey>,
        improvement: &ImprovementId,
    ) -> bool {
        let prepared = self.prepare(view);
        match position {
            Some(position) => prepared.is_mandatory_at(position, improvement),
            None => prepared.regiment_mandatory.contains(improvement),
        }
    }

    /// Would buying this improvement for this unit cost nothing?
    ///
    /// Asked before purchase, so usage is counted from the purchases the
    /// regiment already holds.
    pub fn is_improvement_free(
        &self,
        view: &RegimentView<'_>,
        unit: Option<&UnitId>,
        improvement: &ImprovementId,
    ) -> bool {
        let prepared = self.prepare(view);
        let scope = prepared.scope(self.catalog, view);
        let usage = prepared
            .charges
            .iter()
            .fold(UsageState::new(), |usage, charge| {
                self.rules
                    .is_improvement_free(&scope, charge.unit_id.as_ref(), &charge.improvement, usage)
                    .1
            });
        self.rules.is_improvement_free(&scope, unit, improvement, usage).0
    }

    /// Could this unit hold this improvement inside the template?
    pub fn unit_improvement_eligible(
        &self,
        view: &RegimentView<'_>,
        unit: &UnitId,
        improvement: &ImprovementId,
    ) -> bool {
        if view.template.unit_improvement(improvement).is_none() {
            return false;
        }
        let (Some(definition), Some(terms)) = (
            self.catalog.unit(unit),
            self.catalog.unit_improvement_terms(view.template, improvement),
        ) else {
            return false;
        };
        terms.admits(definition)
    }
}

//! The in-memory catalog: every static definition the engine reads.
//!
//! Built once by the loader (or by hand in tests) and treated as immutable
//! for the rest of the session.

use ahash::AHashMap;

use crate::catalog::division::DivisionTemplate;
use crate::catalog::improvement::{ImprovementDefinition, ImprovementTerms};
use crate::catalog::regiment::RegimentTemplate;
use crate::catalog::unit::UnitDefinition;
use crate::core::types::{DivisionId, FactionId, ImprovementId, RegimentId, UnitId};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    units: AHashMap<UnitId, UnitDefinition>,
    improvements: AHashMap<ImprovementId, ImprovementDefinition>,
    /// Templates without a faction scope
    regiments: AHashMap<RegimentId, RegimentTemplate>,
    /// Faction-specific variants
    faction_regiments: AHashMap<(FactionId, RegimentId), RegimentTemplate>,
    divisions: AHashMap<DivisionId, DivisionTemplate>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_unit(&mut self, unit: UnitDefinition) {
        self.units.insert(unit.id.clone(), unit);
    }

    pub fn insert_improvement(&mut self, improvement: ImprovementDefinition) {
        self.improvements.insert(improvement.id.clone(), improvement);
    }

    /// Register a regiment template under its faction scope, if any
    pub fn insert_regiment(&mut self, template: RegimentTemplate) {
        match template.faction.clone() {
            Some(faction) => {
                self.faction_regiments
                    .insert((faction, template.id.clone()), template);
            }
            None => {
                self.regiments.insert(template.id.clone(), template);
            }
        }
    }

    pub fn insert_division(&mut self, template: DivisionTemplate) {
        self.divisions.insert(template.id.clone(), template);
    }

    pub fn unit(&self, id: &UnitId) -> Option<&UnitDefinition> {
        self.units.get(id)
    }

    pub fn improvement(&self, id: &ImprovementId) -> Option<&ImprovementDefinition> {
        self.improvements.get(id)
    }

    /// Faction variant first, shared template otherwise
    pub fn regiment(&self, faction: Option<&FactionId>, id: &RegimentId) -> Option<&RegimentTemplate> {
        faction
            .and_then(|f| self.faction_regiments.get(&(f.clone(), id.clone())))
            .or_else(|| self.regiments.get(id))
    }

    pub fn division(&self, id: &DivisionId) -> Option<&DivisionTemplate> {
        self.divisions.get(id)
    }

    /// Division templates of a faction, ordered by id
    pub fn divisions_of(&self, faction: &FactionId) -> Vec<&DivisionTemplate> {
        let mut found: Vec<&DivisionTemplate> = self
            .divisions
            .values()
            .filter(|d| &d.faction == faction)
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitDefinition> {
        self.units.values()
    }

    pub fn improvements(&self) -> impl Iterator<Item = &ImprovementDefinition> {
        self.improvements.values()
    }

    /// Every regiment template, shared and faction-scoped
    pub fn regiments(&self) -> impl Iterator<Item = &RegimentTemplate> {
        self.regiments.values().chain(self.faction_regiments.values())
    }

    pub fn divisions(&self) -> impl Iterator<Item = &DivisionTemplate> {
        self.divisions.values()
    }

    /// Terms of a unit-scoped improvement inside a template
    pub fn unit_improvement_terms(
        &self,
        template: &RegimentTemplate,
        id: &ImprovementId,
    ) -> Option<ImprovementTerms> {
        ImprovementTerms::merge(id, template.unit_improvement(id), self.improvement(id))
    }

    /// Terms of a regiment-scoped improvement inside a template
    pub fn regiment_improvement_terms(
        &self,
        template: &RegimentTemplate,
        id: &ImprovementId,
    ) -> Option<ImprovementTerms> {
        ImprovementTerms::merge(id, template.regiment_improvement(id), self.improvement(id))
    }
}

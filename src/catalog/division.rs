//! Division templates: regiment slots, support units and division-scope rules

use serde::{Deserialize, Serialize};

use crate::core::types::{DivisionId, FactionId, RegimentId, SlotGroup, UnitId};
use crate::rules::params::RuleInvocation;

/// One regiment slot and the regiments that may fill it
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegimentSlot {
    pub options: Vec<RegimentId>,
}

impl RegimentSlot {
    pub fn new(options: &[&str]) -> Self {
        Self {
            options: options.iter().map(|o| RegimentId::new(*o)).collect(),
        }
    }
}

/// Where a support unit may be attached
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssignmentRules {
    /// Only these regiments may host the unit
    #[serde(default)]
    pub allowed_regiments: Option<Vec<RegimentId>>,
    /// Two units with the same tag cannot share a host
    #[serde(default)]
    pub exclusion_tag: Option<String>,
    /// Units that cannot share a host with this one
    #[serde(default)]
    pub excludes: Vec<UnitId>,
}

/// A support unit the division can buy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportUnitEntry {
    pub unit: UnitId,
    /// Can be bought on its own; otherwise only rules unlock it
    #[serde(default = "default_purchasable")]
    pub purchasable: bool,
    #[serde(default)]
    pub max: Option<u32>,
    #[serde(default)]
    pub assignment: Option<AssignmentRules>,
}

fn default_purchasable() -> bool {
    true
}

impl SupportUnitEntry {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: UnitId::new(unit),
            purchasable: true,
            max: None,
            assignment: None,
        }
    }
}

/// Static definition of a division
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionTemplate {
    pub id: DivisionId,
    pub name: String,
    pub faction: FactionId,
    #[serde(default)]
    pub cost: i32,
    /// Upgrade point budget before unit supply and rule bonuses
    #[serde(default)]
    pub upgrade_points: i32,
    #[serde(default)]
    pub commanders: Vec<UnitId>,
    #[serde(default)]
    pub vanguard: Vec<RegimentSlot>,
    #[serde(default)]
    pub base: Vec<RegimentSlot>,
    #[serde(default)]
    pub additional: Vec<RegimentSlot>,
    #[serde(default)]
    pub support_units: Vec<SupportUnitEntry>,
    /// Regiments fielded as allies in this division
    #[serde(default)]
    pub allied_regiments: Vec<RegimentId>,
    #[serde(default)]
    pub rules: Vec<RuleInvocation>,
}

impl DivisionTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, faction: impl Into<String>) -> Self {
        Self {
            id: DivisionId::new(id),
            name: name.into(),
            faction: FactionId::new(faction),
            cost: 0,
            upgrade_points: 0,
            commanders: Vec::new(),
            vanguard: Vec::new(),
            base: Vec::new(),
            additional: Vec::new(),
            support_units: Vec::new(),
            allied_regiments: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn slots(&self, slot: SlotGroup) -> &[RegimentSlot] {
        match slot {
            SlotGroup::Vanguard => &self.vanguard,
            SlotGroup::Base => &self.base,
            SlotGroup::Additional => &self.additional,
        }
    }

    pub fn is_allied(&self, regiment_id: &RegimentId) -> bool {
        self.allied_regiments.contains(regiment_id)
    }

    pub fn support_entry(&self, unit: &UnitId) -> Option<&SupportUnitEntry> {
        self.support_units.iter().find(|entry| &entry.unit == unit)
    }
}

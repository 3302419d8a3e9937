//! The root working document: one division being built

use serde::{Deserialize, Serialize};

use crate::catalog::division::DivisionTemplate;
use crate::catalog::regiment::RegimentTemplate;
use crate::core::types::{DivisionId, FactionId, RegimentId, RegimentPosition, SlotGroup, UnitId};
use crate::roster::regiment::RegimentConfig;

/// A regiment placed in a division slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimentEntry {
    pub regiment_id: RegimentId,
    #[serde(default)]
    pub custom_name: Option<String>,
    #[serde(default)]
    pub config: RegimentConfig,
}

impl RegimentEntry {
    pub fn new(template: &RegimentTemplate) -> Self {
        Self {
            regiment_id: template.id.clone(),
            custom_name: None,
            config: RegimentConfig::with_defaults(template),
        }
    }
}

/// A bought support unit and where it is attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportPurchase {
    pub unit_id: UnitId,
    #[serde(default)]
    pub assignment: Option<RegimentPosition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionConfig {
    pub division_id: DivisionId,
    pub faction: FactionId,
    #[serde(default)]
    pub commander: Option<UnitId>,
    /// One entry per template slot; `None` while the slot is empty
    #[serde(default)]
    pub vanguard: Vec<Option<RegimentEntry>>,
    #[serde(default)]
    pub base: Vec<Option<RegimentEntry>>,
    #[serde(default)]
    pub additional: Vec<Option<RegimentEntry>>,
    #[serde(default)]
    pub support: Vec<SupportPurchase>,
    #[serde(default)]
    pub preferred_main_force: Option<RegimentPosition>,
}

impl DivisionConfig {
    /// Empty division with one vacant entry per template slot
    pub fn new(template: &DivisionTemplate) -> Self {
        Self {
            division_id: template.id.clone(),
            faction: template.faction.clone(),
            commander: None,
            vanguard: vec![None; template.vanguard.len()],
            base: vec![None; template.base.len()],
            additional: vec![None; template.additional.len()],
            support: Vec::new(),
            preferred_main_force: None,
        }
    }

    pub fn slot(&self, slot: SlotGroup) -> &[Option<RegimentEntry>] {
        match slot {
            SlotGroup::Vanguard => &self.vanguard,
            SlotGroup::Base => &self.base,
            SlotGroup::Additional => &self.additional,
        }
    }

    fn slot_mut(&mut self, slot: SlotGroup) -> &mut Vec<Option<RegimentEntry>> {
        match slot {
            SlotGroup::Vanguard => &mut self.vanguard,
            SlotGroup::Base => &mut self.base,
            SlotGroup::Additional => &mut self.additional,
        }
    }

    pub fn entry(&self, position: RegimentPosition) -> Option<&RegimentEntry> {
        self.slot(position.slot)
            .get(position.index)
            .and_then(Option::as_ref)
    }

    pub fn entry_mut(&mut self, position: RegimentPosition) -> Option<&mut RegimentEntry> {
        self.slot_mut(position.slot)
            .get_mut(position.index)
            .and_then(Option::as_mut)
    }

    /// Filled regiment positions in slot-group then index order
    pub fn regiments(&self) -> impl Iterator<Item = (RegimentPosition, &RegimentEntry)> {
        SlotGroup::ALL.into_iter().flat_map(move |slot| {
            self.slot(slot)
                .iter()
                .enumerate()
                .filter_map(move |(index, entry)| {
                    entry
                        .as_ref()
                        .map(|entry| (RegimentPosition::new(slot, index), entry))
                })
        })
    }

    /// How many times a regiment id is fielded
    pub fn count_regiment(&self, regiment_id: &RegimentId) -> usize {
        self.regiments()
            .filter(|(_, entry)| &entry.regiment_id == regiment_id)
            .count()
    }

    pub fn has_regiment(&self, regiment_id: &RegimentId) -> bool {
        self.count_regiment(regiment_id) > 0
    }

    /// Is the regiment at this position a vanguard (by slot or by flag)?
    pub fn is_vanguard(&self, position: RegimentPosition) -> bool {
        position.slot == SlotGroup::Vanguard
            || self.entry(position).map_or(false, |entry| entry.config.vanguard)
    }

    /// Put a regiment in a slot, replacing whatever was there.
    ///
    /// Support units attached to the old occupant are removed with it.
    pub fn set_regiment(&mut self, position: RegimentPosition, template: &RegimentTemplate) {
        let slot = self.slot_mut(position.slot);
        if slot.len() <= position.index {
            slot.resize(position.index + 1, None);
        }
        slot[position.index] = Some(RegimentEntry::new(template));
        self.drop_support_at(position);
    }

    /// Empty a slot. Support units attached to it are removed.
    pub fn remove_regiment(&mut self, position: RegimentPosition) -> Option<RegimentEntry> {
        let removed = self
            .slot_mut(position.slot)
            .get_mut(position.index)
            .and_then(Option::take);
        if removed.is_some() {
            self.drop_support_at(position);
            if self.preferred_main_force == Some(position) {
                self.preferred_main_force = None;
            }
        }
        removed
    }

    pub fn set_vanguard(&mut self, position: RegimentPosition, vanguard: bool) -> bool {
        match self.entry_mut(position) {
            Some(entry) => {
                entry.config.vanguard = vanguard;
                true
            }
            None => false,
        }
    }

    /// Buy a support unit; returns its index in the support list
    pub fn purchase_support(&mut self, unit_id: UnitId) -> usize {
        self.support.push(SupportPurchase {
            unit_id,
            assignment: None,
        });
        self.support.len() - 1
    }

    pub fn sell_support(&mut self, index: usize) -> Option<SupportPurchase> {
        if index < self.support.len() {
            Some(self.support.remove(index))
        } else {
            None
        }
    }

    /// Attach (or detach with `None`) a bought support unit
    pub fn assign_support(&mut self, index: usize, assignment: Option<RegimentPosition>) -> bool {
        match self.support.get_mut(index) {
            Some(purchase) => {
                purchase.assignment = assignment;
                true
            }
            None => false,
        }
    }

    /// Support units attached to a position
    pub fn support_at(&self, position: RegimentPosition) -> impl Iterator<Item = (usize, &SupportPurchase)> {
        self.support
            .iter()
            .enumerate()
            .filter(move |(_, purchase)| purchase.assignment == Some(position))
    }

    pub fn count_support(&self, unit_id: &UnitId) -> usize {
        self.support.iter().filter(|p| &p.unit_id == unit_id).count()
    }

    fn drop_support_at(&mut self, position: RegimentPosition) {
        let before = self.support.len();
        self.support
            .retain(|purchase| purchase.assignment != Some(position));
        let dropped = before - self.support.len();
        if dropped > 0 {
            tracing::debug!("Removed {} support unit(s) attached to {}", dropped, position);
        }
    }
}

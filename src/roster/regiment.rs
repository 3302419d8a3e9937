//! The user's working state for one regiment
//!
//! Created with defaults when a regiment id is first chosen, mutated in place
//! by user actions, and replaced wholesale when the regiment id changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::regiment::{Group, RegimentTemplate};
use crate::core::types::{Category, ImprovementId, PositionKey, UnitId, OPTIONAL_GROUP};

/// Togglable sub-block with its own pick list
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OptionalBlock {
    #[serde(default)]
    pub enabled: bool,
    /// Chosen key per pod index
    #[serde(default)]
    pub picks: Vec<Option<String>>,
}

/// Picks for one category of the selection structure
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategorySelection {
    /// Group name -> chosen key per pod index
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<Option<String>>>,
    #[serde(default)]
    pub optional: OptionalBlock,
}

impl CategorySelection {
    /// Pick list for a group (the optional block has its own)
    pub fn picks(&self, group: &str) -> &[Option<String>] {
        if group == OPTIONAL_GROUP {
            &self.optional.picks
        } else {
            self.groups.get(group).map(Vec::as_slice).unwrap_or(&[])
        }
    }

    fn picks_mut(&mut self, group: &str) -> &mut Vec<Option<String>> {
        if group == OPTIONAL_GROUP {
            &mut self.optional.picks
        } else {
            self.groups.entry(group.to_string()).or_default()
        }
    }

    fn with_defaults(groups: &[Group]) -> Self {
        let mut selection = CategorySelection::default();
        for group in groups {
            let picks: Vec<Option<String>> = group
                .pods
                .iter()
                .map(|pod| {
                    if pod.is_mandatory() {
                        pod.choices.first().map(|c| c.key.clone())
                    } else {
                        None
                    }
                })
                .collect();
            *selection.picks_mut(&group.name) = picks;
        }
        selection
    }
}

/// Mutable selection state of one regiment
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegimentConfig {
    #[serde(default)]
    pub base: CategorySelection,
    #[serde(default)]
    pub additional: CategorySelection,
    #[serde(default)]
    pub additional_enabled: bool,
    /// Unit occupying the custom-priced slot
    #[serde(default)]
    pub custom_unit: Option<UnitId>,
    /// Purchased unit-scoped improvements per position
    #[serde(default, with = "position_map")]
    pub improvements: BTreeMap<PositionKey, Vec<ImprovementId>>,
    /// Purchased regiment-scoped improvements (a multiset)
    #[serde(default)]
    pub regiment_improvements: Vec<ImprovementId>,
    #[serde(default)]
    pub vanguard: bool,
}

impl RegimentConfig {
    /// Defaults for a freshly chosen regiment: every single-choice pod picked,
    /// optional blocks and the additional category switched off
    pub fn with_defaults(template: &RegimentTemplate) -> Self {
        Self {
            base: CategorySelection::with_defaults(&template.structure.base),
            additional: CategorySelection::with_defaults(&template.structure.additional),
            ..Self::default()
        }
    }

    pub fn selection(&self, category: Category) -> Option<&CategorySelection> {
        match category {
            Category::Base => Some(&self.base),
            Category::Additional => Some(&self.additional),
            Category::Custom => None,
        }
    }

    fn selection_mut(&mut self, category: Category) -> Option<&mut CategorySelection> {
        match category {
            Category::Base => Some(&mut self.base),
            Category::Additional => Some(&mut self.additional),
            Category::Custom => None,
        }
    }

    /// Record (or clear) the pick for one pod.
    ///
    /// Improvements bought at positions under a pod whose pick changes no
    /// longer describe the same units and are dropped.
    pub fn select(&mut self, category: Category, group: &str, pod: usize, key: Option<String>) {
        let Some(selection) = self.selection_mut(category) else {
            return;
        };
        let picks = selection.picks_mut(group);
        if picks.len() <= pod {
            picks.resize(pod + 1, None);
        }
        if picks[pod] == key {
            return;
        }
        picks[pod] = key;

        self.improvements.retain(|position, _| {
            !(position.category == category && position.group == group && position.pod == pod)
        });
    }

    pub fn set_optional(&mut self, category: Category, enabled: bool) {
        if let Some(selection) = self.selection_mut(category) {
            selection.optional.enabled = enabled;
        }
    }

    pub fn set_additional(&mut self, enabled: bool) {
        self.additional_enabled = enabled;
    }

    pub fn set_custom_unit(&mut self, unit: Option<UnitId>) {
        if self.custom_unit != unit {
            self.improvements.remove(&PositionKey::custom());
        }
        self.custom_unit = unit;
    }

    /// Improvements bought at a position
    pub fn improvements_at(&self, position: &PositionKey) -> &[ImprovementId] {
        self.improvements
            .get(position)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Buy an improvement for a unit. Returns false if it was already bought there.
    pub fn purchase_improvement(&mut self, position: PositionKey, improvement: ImprovementId) -> bool {
        let bought = self.improvements.entry(position).or_default();
        if bought.contains(&improvement) {
            return false;
        }
        bought.push(improvement);
        true
    }

    /// Sell an improvement bought for a unit. Returns false if it was not bought.
    pub fn sell_improvement(&mut self, position: &PositionKey, improvement: &ImprovementId) -> bool {
        let Some(bought) = self.improvements.get_mut(position) else {
            return false;
        };
        let before = bought.len();
        bought.retain(|id| id != improvement);
        let removed = bought.len() != before;
        if bought.is_empty() {
            self.improvements.remove(position);
        }
        removed
    }

    pub fn purchase_regiment_improvement(&mut self, improvement: ImprovementId) {
        self.regiment_improvements.push(improvement);
    }

    /// Sell one instance of a regiment-scoped improvement
    pub fn sell_regiment_improvement(&mut self, improvement: &ImprovementId) -> bool {
        match self.regiment_improvements.iter().position(|id| id == improvement) {
            Some(index) => {
                self.regiment_improvements.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Serialize a position-keyed map as a list of `[position, value]` pairs,
/// since JSON object keys must be strings.
mod position_map {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::core::types::PositionKey;

    pub fn serialize<V, S>(map: &BTreeMap<PositionKey, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, V, D>(deserializer: D) -> Result<BTreeMap<PositionKey, V>, D::Error>
    where
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let pairs: Vec<(PositionKey, V)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

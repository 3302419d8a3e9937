//! Regiment templates: the nested selection structure a regiment is built from
//!
//! A template has two categories, `base` (always active) and `additional`
//! (togglable as a whole). Each category is an ordered list of named groups,
//! a group is an ordered list of pods, and a pod offers one or more choices.
//! A pod with a single choice is mandatory; a pod with several needs a pick.
//! The group named `optional` is a sub-block the user switches on and off.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::improvement::ImprovementSlot;
use crate::core::types::{Category, FactionId, ImprovementId, RegimentId, UnitId, OPTIONAL_GROUP};
use crate::rules::params::RuleInvocation;

/// One selectable option within a pod
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub key: String,
    /// Package of catalog units taken together
    pub units: Vec<UnitId>,
    /// Replaces the package's catalog price (charged once, on the first unit)
    #[serde(default)]
    pub cost_override: Option<i32>,
    #[serde(default)]
    pub extra_cost: i32,
    /// Improvements every unit of the package carries without purchase
    #[serde(default)]
    pub mandatory_improvements: Vec<ImprovementId>,
}

impl Choice {
    pub fn new(key: impl Into<String>, units: &[&str]) -> Self {
        Self {
            key: key.into(),
            units: units.iter().map(|u| UnitId::new(*u)).collect(),
            cost_override: None,
            extra_cost: 0,
            mandatory_improvements: Vec::new(),
        }
    }
}

/// A slot resolving to at most one choice
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pod {
    pub choices: Vec<Choice>,
}

impl Pod {
    pub fn new(choices: Vec<Choice>) -> Self {
        Self { choices }
    }

    /// A single-choice pod is selected automatically
    pub fn is_mandatory(&self) -> bool {
        self.choices.len() == 1
    }

    pub fn choice(&self, key: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.key == key)
    }
}

/// A named, ordered list of pods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub pods: Vec<Pod>,
}

impl Group {
    pub fn new(name: impl Into<String>, pods: Vec<Pod>) -> Self {
        Self {
            name: name.into(),
            pods,
        }
    }

    pub fn is_optional(&self) -> bool {
        self.name == OPTIONAL_GROUP
    }
}

/// Both categories of a regiment's selection structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionStructure {
    #[serde(default)]
    pub base: Vec<Group>,
    #[serde(default)]
    pub additional: Vec<Group>,
}

impl SelectionStructure {
    pub fn groups(&self, category: Category) -> &[Group] {
        match category {
            Category::Base => &self.base,
            Category::Additional => &self.additional,
            Category::Custom => &[],
        }
    }

    pub fn group(&self, category: Category, name: &str) -> Option<&Group> {
        self.groups(category).iter().find(|g| g.name == name)
    }
}

/// Price table for the single custom-priced slot
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomSlot {
    pub prices: BTreeMap<UnitId, i32>,
}

/// Static definition of a regiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimentTemplate {
    pub id: RegimentId,
    pub name: String,
    /// Faction-specific variant of a shared regiment id
    #[serde(default)]
    pub faction: Option<FactionId>,
    #[serde(default)]
    pub cost: i32,
    #[serde(default)]
    pub recon: i32,
    #[serde(default)]
    pub activations: i32,
    #[serde(default)]
    pub awareness: i32,
    /// Orders added to the commander slot only
    #[serde(default)]
    pub commander_orders_bonus: i32,
    #[serde(default)]
    pub structure: SelectionStructure,
    #[serde(default)]
    pub custom_slot: Option<CustomSlot>,
    #[serde(default)]
    pub unit_improvements: Vec<ImprovementSlot>,
    #[serde(default)]
    pub regiment_improvements: Vec<ImprovementSlot>,
    #[serde(default)]
    pub rules: Vec<RuleInvocation>,
}

impl RegimentTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: RegimentId::new(id),
            name: name.into(),
            faction: None,
            cost: 0,
            recon: 0,
            activations: 0,
            awareness: 0,
            commander_orders_bonus: 0,
            structure: SelectionStructure::default(),
            custom_slot: None,
            unit_improvements: Vec::new(),
            regiment_improvements: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn unit_improvement(&self, id: &ImprovementId) -> Option<&ImprovementSlot> {
        self.unit_improvements.iter().find(|slot| &slot.id == id)
    }

    pub fn regiment_improvement(&self, id: &ImprovementId) -> Option<&ImprovementSlot> {
        self.regiment_improvements.iter().find(|slot| &slot.id == id)
    }

    /// Every unit id the structure can ever field
    pub fn all_unit_ids(&self) -> impl Iterator<Item = &UnitId> {
        self.structure
            .base
            .iter()
            .chain(self.structure.additional.iter())
            .flat_map(|group| group.pods.iter())
            .flat_map(|pod| pod.choices.iter())
            .flat_map(|choice| choice.units.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_choice_pod_is_mandatory() {
        let pod = Pod::new(vec![Choice::new("a", &["pikemen"])]);
        assert!(pod.is_mandatory());
        let pod = Pod::new(vec![Choice::new("a", &["pikemen"]), Choice::new("b", &["musketeers"])]);
        assert!(!pod.is_mandatory());
        assert_eq!(pod.choice("b").unwrap().units[0], UnitId::new("musketeers"));
    }

    #[test]
    fn test_template_from_toml() {
        let template: RegimentTemplate = toml::from_str(
            r#"
id = "hussar_regiment"
name = "Hussar regiment"
cost = 10
recon = 1
activations = 2

[[structure.base]]
name = "commander"
pods = [[{ key = "colonel", units = ["colonel"] }]]

[[structure.base]]
name = "cavalry"
pods = [
    [{ key = "hussars", units = ["hussars"] }, { key = "cossacks", units = ["cossacks"] }],
]

[[structure.additional]]
name = "optional"
pods = [[{ key = "guns", units = ["light_gun", "gun_crew"], cost_override = 12 }]]

[[unit_improvements]]
id = "veterans"
cost_rule = "double"

[[rules]]
id = "max_units"
params = { units = ["hussars"], max = 2 }
"#,
        )
        .unwrap();

        assert_eq!(template.structure.base.len(), 2);
        assert!(template.structure.additional[0].is_optional());
        assert_eq!(template.structure.base[1].pods[0].choices.len(), 2);
        assert_eq!(
            template.structure.additional[0].pods[0].choices[0].cost_override,
            Some(12)
        );
        assert_eq!(template.rules[0].id, "max_units");
        assert_eq!(template.all_unit_ids().count(), 5);
    }
}

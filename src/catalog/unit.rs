//! Unit definitions and the trait table that drives derived stats
//!
//! A unit is a catalog entry: its costs, its rank tier and a set of combat
//! traits. Every trait nudges reconnaissance by a fixed amount, listed once
//! in [`RECON_TRAIT_DELTAS`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::types::{ImprovementId, UnitId};

/// Rank tier of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankTier {
    #[default]
    Ordinary,
    OrdinaryElite,
    Elite,
    /// Commanders, baggage trains: never combat units, never improvable
    Group,
}

impl RankTier {
    /// Motivation contributed by one unit of this tier
    pub fn motivation(self, half_step: bool) -> f64 {
        match self {
            RankTier::Ordinary if half_step => 0.5,
            RankTier::Ordinary | RankTier::OrdinaryElite => 1.0,
            RankTier::Elite => 2.0,
            RankTier::Group => 0.0,
        }
    }
}

/// Boolean combat trait of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitTrait {
    Mounted,
    LightMounted,
    Lance,
    PikeAndShot,
    UndisciplinedRaider,
    ProxyMounted,
    Scout,
    Dragoon,
    Artillery,
    Wagon,
    Harassing,
    Dispersed,
}

/// Reconnaissance delta per trait
pub const RECON_TRAIT_DELTAS: &[(UnitTrait, i32)] = &[
    (UnitTrait::Mounted, 1),
    (UnitTrait::LightMounted, 1),
    (UnitTrait::Lance, -1),
    (UnitTrait::PikeAndShot, -1),
    (UnitTrait::UndisciplinedRaider, -1),
    (UnitTrait::ProxyMounted, 1),
    (UnitTrait::Scout, 1),
    (UnitTrait::Dragoon, 1),
    (UnitTrait::Artillery, -2),
    (UnitTrait::Wagon, -2),
    (UnitTrait::Harassing, 1),
    (UnitTrait::Dispersed, 1),
];

/// Static definition of a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub id: UnitId,
    pub name: String,
    /// Primary (army point) cost
    #[serde(default)]
    pub cost: i32,
    /// Secondary (upgrade point) upkeep
    #[serde(default)]
    pub upkeep: i32,
    #[serde(default)]
    pub rank: RankTier,
    #[serde(default)]
    pub traits: BTreeSet<UnitTrait>,
    /// Orders generated by this unit
    #[serde(default)]
    pub orders: i32,
    /// Base cost fed into improvement cost rules
    #[serde(default)]
    pub improvement_cost: i32,
    #[serde(default)]
    pub excluded_improvements: Vec<ImprovementId>,
    /// Extra upgrade points granted to the division while this unit is fielded
    #[serde(default)]
    pub additional_supply: i32,
}

impl UnitDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: UnitId::new(id),
            name: name.into(),
            cost: 0,
            upkeep: 0,
            rank: RankTier::default(),
            traits: BTreeSet::new(),
            orders: 0,
            improvement_cost: 0,
            excluded_improvements: Vec::new(),
            additional_supply: 0,
        }
    }

    pub fn has_trait(&self, unit_trait: UnitTrait) -> bool {
        self.traits.contains(&unit_trait)
    }

    pub fn is_group(&self) -> bool {
        self.rank == RankTier::Group
    }

    /// Is this a mounted unit?
    pub fn is_mounted(&self) -> bool {
        self.has_trait(UnitTrait::Mounted)
    }

    /// Sum of the reconnaissance deltas of every trait this unit has
    pub fn recon_delta(&self) -> i32 {
        RECON_TRAIT_DELTAS
            .iter()
            .filter(|(unit_trait, _)| self.has_trait(*unit_trait))
            .map(|(_, delta)| delta)
            .sum()
    }
}

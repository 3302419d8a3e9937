//! Improvement definitions and cost rules
//!
//! Improvements are bought with upgrade points. A unit-scoped improvement's
//! price comes from the unit's base improvement cost run through a cost rule;
//! a regiment-scoped improvement declares its own prices.

use serde::{Deserialize, Serialize};

use crate::catalog::unit::UnitDefinition;
use crate::core::types::{ImprovementId, UnitId};

/// How an improvement's secondary cost is derived from a unit's base cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCostRule", into = "RawCostRule")]
pub enum CostRule {
    /// Base cost unchanged (token `normal` or `identity`)
    Identity,
    Double,
    Triple,
    /// Positive: multiply. Negative: subtract and floor at one.
    Factor(i64),
    /// Unrecognised token; resolves to zero
    Unknown(String),
}

impl Default for CostRule {
    fn default() -> Self {
        CostRule::Identity
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawCostRule {
    Int(i64),
    Token(String),
}

impl From<RawCostRule> for CostRule {
    fn from(raw: RawCostRule) -> Self {
        match raw {
            RawCostRule::Int(k) => CostRule::Factor(k),
            RawCostRule::Token(token) => match token.as_str() {
                "normal" | "identity" => CostRule::Identity,
                "double" => CostRule::Double,
                "triple" => CostRule::Triple,
                _ => match token.parse::<i64>() {
                    Ok(k) => CostRule::Factor(k),
                    Err(_) => CostRule::Unknown(token),
                },
            },
        }
    }
}

impl From<CostRule> for RawCostRule {
    fn from(rule: CostRule) -> Self {
        match rule {
            CostRule::Identity => RawCostRule::Token("normal".into()),
            CostRule::Double => RawCostRule::Token("double".into()),
            CostRule::Triple => RawCostRule::Token("triple".into()),
            CostRule::Factor(k) => RawCostRule::Int(k),
            CostRule::Unknown(token) => RawCostRule::Token(token),
        }
    }
}

impl From<&str> for CostRule {
    fn from(token: &str) -> Self {
        RawCostRule::Token(token.to_string()).into()
    }
}

impl From<i64> for CostRule {
    fn from(k: i64) -> Self {
        CostRule::Factor(k)
    }
}

/// Resolve a cost rule against a unit's base improvement cost.
///
/// Arithmetic saturates and the result is clamped into `i32`.
pub fn resolve_cost_rule(base: i32, rule: &CostRule) -> i32 {
    let base = i64::from(base);
    let cost = match rule {
        CostRule::Identity => base,
        CostRule::Double => base.saturating_mul(2),
        CostRule::Triple => base.saturating_mul(3),
        CostRule::Factor(k) if *k > 0 => base.saturating_mul(*k),
        CostRule::Factor(k) if *k < 0 => base.saturating_add(*k).max(1),
        CostRule::Factor(_) | CostRule::Unknown(_) => 0,
    };
    cost.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Which entity an improvement attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImprovementScope {
    #[default]
    Unit,
    Regiment,
}

/// Common catalog entry for an improvement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementDefinition {
    pub id: ImprovementId,
    pub name: String,
    #[serde(default)]
    pub scope: ImprovementScope,
    #[serde(default)]
    pub cost_rule: Option<CostRule>,
    /// Fixed primary cost added while the improvement is in effect
    #[serde(default)]
    pub primary_cost: Option<i32>,
    /// Declared secondary cost (regiment-scoped improvements)
    #[serde(default)]
    pub secondary_cost: Option<i32>,
    /// Paid in primary points only
    #[serde(default)]
    pub primary_only: bool,
    /// Maximum purchased instances per regiment
    #[serde(default)]
    pub max_amount: Option<u32>,
    #[serde(default)]
    pub allowed_units: Option<Vec<UnitId>>,
    #[serde(default)]
    pub excluded_units: Vec<UnitId>,
}

impl ImprovementDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ImprovementId::new(id),
            name: name.into(),
            scope: ImprovementScope::Unit,
            cost_rule: None,
            primary_cost: None,
            secondary_cost: None,
            primary_only: false,
            max_amount: None,
            allowed_units: None,
            excluded_units: Vec::new(),
        }
    }
}

/// A template's listing of a legal improvement, optionally overriding catalog terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementSlot {
    pub id: ImprovementId,
    #[serde(default)]
    pub cost_rule: Option<CostRule>,
    #[serde(default)]
    pub primary_cost: Option<i32>,
    #[serde(default)]
    pub secondary_cost: Option<i32>,
    #[serde(default)]
    pub max_amount: Option<u32>,
    #[serde(default)]
    pub allowed_units: Option<Vec<UnitId>>,
    #[serde(default)]
    pub excluded_units: Vec<UnitId>,
}

impl ImprovementSlot {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ImprovementId::new(id),
            cost_rule: None,
            primary_cost: None,
            secondary_cost: None,
            max_amount: None,
            allowed_units: None,
            excluded_units: Vec::new(),
        }
    }
}

/// Effective terms of an improvement inside one regiment template
#[derive(Debug, Clone, PartialEq)]
pub struct ImprovementTerms {
    pub id: ImprovementId,
    pub name: String,
    pub cost_rule: CostRule,
    pub primary_cost: i32,
    pub secondary_cost: i32,
    pub primary_only: bool,
    pub max_amount: Option<u32>,
    pub allowed_units: Option<Vec<UnitId>>,
    pub excluded_units: Vec<UnitId>,
}

impl ImprovementTerms {
    /// Merge a template slot over a catalog definition. Slot values win.
    pub fn merge(
        id: &ImprovementId,
        slot: Option<&ImprovementSlot>,
        definition: Option<&ImprovementDefinition>,
    ) -> Option<Self> {
        if slot.is_none() && definition.is_none() {
            return None;
        }

        let cost_rule = slot
            .and_then(|s| s.cost_rule.clone())
            .or_else(|| definition.and_then(|d| d.cost_rule.clone()))
            .unwrap_or_default();
        let primary_cost = slot
            .and_then(|s| s.primary_cost)
            .or_else(|| definition.and_then(|d| d.primary_cost))
            .unwrap_or(0);
        let secondary_cost = slot
            .and_then(|s| s.secondary_cost)
            .or_else(|| definition.and_then(|d| d.secondary_cost))
            .unwrap_or(0);
        let max_amount = slot
            .and_then(|s| s.max_amount)
            .or_else(|| definition.and_then(|d| d.max_amount));
        let allowed_units = slot
            .and_then(|s| s.allowed_units.clone())
            .or_else(|| definition.and_then(|d| d.allowed_units.clone()));

        let mut excluded_units: Vec<UnitId> = definition
            .map(|d| d.excluded_units.clone())
            .unwrap_or_default();
        if let Some(slot) = slot {
            excluded_units.extend(slot.excluded_units.iter().cloned());
        }

        Some(Self {
            id: id.clone(),
            name: definition
                .map(|d| d.name.clone())
                .unwrap_or_else(|| id.to_string()),
            cost_rule,
            primary_cost,
            secondary_cost,
            primary_only: definition.map_or(false, |d| d.primary_only),
            max_amount,
            allowed_units,
            excluded_units,
        })
    }

    /// Can this improvement be bought for the given unit?
    pub fn admits(&self, unit: &UnitDefinition) -> bool {
        if unit.is_group() {
            return false;
        }
        if unit.excluded_improvements.contains(&self.id) {
            return false;
        }
        if self.excluded_units.contains(&unit.id) {
            return false;
        }
        self.allowed_units
            .as_ref()
            .map_or(true, |allowed| allowed.contains(&unit.id))
    }

    /// Secondary cost of this improvement on a unit
    pub fn unit_cost(&self, unit: &UnitDefinition) -> i32 {
        resolve_cost_rule(unit.improvement_cost, &self.cost_rule)
    }

    /// Secondary cost of this improvement bought for a whole regiment
    pub fn regiment_cost(&self) -> i32 {
        if self.primary_only {
            0
        } else {
            self.secondary_cost
        }
    }
}

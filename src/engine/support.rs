//! Support units: standalone purchase allowances and assignment legality

use std::fmt;

use serde::Serialize;

use crate::catalog::division::{AssignmentRules, DivisionTemplate};
use crate::catalog::unit::UnitTrait;
use crate::core::types::{RegimentPosition, UnitId};
use crate::engine::division::DivisionEvaluation;
use crate::engine::stats::FormationType;
use crate::engine::Engine;
use crate::roster::division::DivisionConfig;
use crate::rules::hooks::{unit_name, DivisionScope};

/// How many copies of a support unit may be bought
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "max")]
pub enum SupportAllowance {
    Unlimited,
    UpTo(u32),
    Forbidden,
}

impl SupportAllowance {
    pub fn permits(self, count: usize) -> bool {
        match self {
            SupportAllowance::Unlimited => true,
            SupportAllowance::UpTo(max) => count <= max as usize,
            SupportAllowance::Forbidden => count == 0,
        }
    }
}

impl fmt::Display for SupportAllowance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupportAllowance::Unlimited => write!(f, "unlimited"),
            SupportAllowance::UpTo(max) => write!(f, "up to {}", max),
            SupportAllowance::Forbidden => write!(f, "not purchasable"),
        }
    }
}

/// Do two support units exclude each other at one position?
fn excludes(
    unit: &UnitId,
    rules: Option<&AssignmentRules>,
    other: &UnitId,
    other_rules: Option<&AssignmentRules>,
) -> bool {
    let same_tag = match (
        rules.and_then(|r| r.exclusion_tag.as_ref()),
        other_rules.and_then(|r| r.exclusion_tag.as_ref()),
    ) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };
    same_tag
        || rules.map_or(false, |r| r.excludes.contains(other))
        || other_rules.map_or(false, |r| r.excludes.contains(unit))
}

impl<'a> Engine<'a> {
    /// Standalone purchase allowance of a support unit in this division
    pub fn support_purchase_limit(
        &self,
        template: &DivisionTemplate,
        division: &DivisionConfig,
        unit: &UnitId,
    ) -> SupportAllowance {
        let Some(entry) = template.support_entry(unit) else {
            return SupportAllowance::Forbidden;
        };
        let scope = DivisionScope {
            catalog: self.catalog,
            template,
            division,
        };
        let from_rules = self.rules.support_allowance(&scope, unit);

        match (entry.purchasable, entry.max, from_rules) {
            (true, None, _) => SupportAllowance::Unlimited,
            (true, Some(max), extra) => SupportAllowance::UpTo(max.saturating_add(extra.unwrap_or(0))),
            (false, _, Some(allowed)) => SupportAllowance::UpTo(allowed),
            (false, _, None) => SupportAllowance::Forbidden,
        }
    }

    /// Why a support unit may not sit at a position, considering the
    /// purchases selected by `others` as already attached there
    pub(crate) fn assignment_conflict(
        &self,
        evaluation: &DivisionEvaluation<'_>,
        unit: &UnitId,
        position: RegimentPosition,
        others: impl Fn(usize) -> bool,
    ) -> Option<String> {
        let name = unit_name(self.catalog, unit);
        let Some(host) = evaluation.regiment(position) else {
            return Some(format!("{} is attached to empty position {}", name, position));
        };
        let Some(entry) = evaluation.template.support_entry(unit) else {
            return Some(format!("{} is not a support unit of this division", name));
        };

        if let Some(definition) = self.catalog.unit(unit) {
            if !definition.has_trait(UnitTrait::Dragoon) {
                let required = if definition.is_mounted() && !definition.has_trait(UnitTrait::Artillery) {
                    FormationType::Mounted
                } else {
                    FormationType::Foot
                };
                if host.stats.formation != Some(required) {
                    return Some(format!(
                        "{} requires a {} regiment; {} is {}",
                        name,
                        required,
                        host.name(),
                        host.stats
                            .formation
                            .map_or_else(|| "empty".to_string(), |f| f.to_string())
                    ));
                }
            }
        }

        let rules = entry.assignment.as_ref();
        if let Some(allowed) = rules.and_then(|r| r.allowed_regiments.as_ref()) {
            if !allowed.contains(host.regiment_id()) {
                return Some(format!("{} cannot be attached to {}", name, host.name()));
            }
        }

        for (index, other) in evaluation.division.support_at(position) {
            if !others(index) {
                continue;
            }
            let other_rules = evaluation
                .template
                .support_entry(&other.unit_id)
                .and_then(|e| e.assignment.as_ref());
            if excludes(unit, rules, &other.unit_id, other_rules) {
                return Some(format!(
                    "{} cannot be attached to {} alongside {}",
                    name,
                    host.name(),
                    unit_name(self.catalog, &other.unit_id)
                ));
            }
        }
        None
    }

    /// Can the bought support unit at `index` be attached to `position`?
    pub fn check_assignment(
        &self,
        evaluation: &DivisionEvaluation<'_>,
        index: usize,
        position: RegimentPosition,
    ) -> Result<(), String> {
        let Some(purchase) = evaluation.division.support.get(index) else {
            return Err(format!("No support purchase at index {}", index));
        };
        match self.assignment_conflict(evaluation, &purchase.unit_id, position, |other| other != index) {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// Problems with current support purchases: allowance overruns, then
    /// illegal attachments in purchase order
    pub(crate) fn support_problems(&self, evaluation: &DivisionEvaluation<'_>) -> Vec<String> {
        let division = evaluation.division;
        let mut problems = Vec::new();

        let mut seen: Vec<&UnitId> = Vec::new();
        for purchase in &division.support {
            if seen.contains(&&purchase.unit_id) {
                continue;
            }
            seen.push(&purchase.unit_id);
            let count = division.count_support(&purchase.unit_id);
            let allowance = self.support_purchase_limit(evaluation.template, division, &purchase.unit_id);
            if !allowance.permits(count) {
                let name = unit_name(self.catalog, &purchase.unit_id);
                problems.push(match allowance {
                    SupportAllowance::UpTo(max) => {
                        format!("At most {} {} may be purchased ({} purchased)", max, name, count)
                    }
                    _ => format!("{} cannot be purchased in this division", name),
                });
            }
        }

        for (index, purchase) in division.support.iter().enumerate() {
            let Some(position) = purchase.assignment else {
                continue;
            };
            if let Some(reason) =
                self.assignment_conflict(evaluation, &purchase.unit_id, position, |other| other < index)
            {
                problems.push(reason);
            }
        }
        problems
    }
}

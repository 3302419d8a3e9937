//! Which regiments a division may field together

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::core::types::RegimentId;
use crate::rules::hooks::{DivisionRule, DivisionScope};
use crate::rules::params::RuleParams;

/// At most `max` copies of each listed regiment (of every regiment when
/// the list is empty)
pub struct MaxSameRegiment;

#[derive(Debug, Deserialize)]
struct MaxSameParams {
    #[serde(default)]
    regiments: Vec<RegimentId>,
    max: usize,
}

impl DivisionRule for MaxSameRegiment {
    fn id(&self) -> &'static str {
        "max_same_regiment"
    }

    fn validate(&self, scope: &DivisionScope<'_>, params: &RuleParams) -> Vec<String> {
        let Some(params) = params.decode::<MaxSameParams>(self.id()) else {
            return Vec::new();
        };

        let mut counts: BTreeMap<&RegimentId, usize> = BTreeMap::new();
        for (_, entry) in scope.division.regiments() {
            if params.regiments.is_empty() || params.regiments.contains(&entry.regiment_id) {
                *counts.entry(&entry.regiment_id).or_insert(0) += 1;
            }
        }

        counts
            .into_iter()
            .filter(|(_, count)| *count > params.max)
            .map(|(id, count)| {
                format!(
                    "At most {} {} may be fielded ({} present)",
                    params.max,
                    scope.regiment_name(id),
                    count
                )
            })
            .collect()
    }
}

/// At least `min` regiments drawn from a list
pub struct MinRegimentsPresent;

#[derive(Debug, Deserialize)]
struct MinPresentParams {
    regiments: Vec<RegimentId>,
    #[serde(default = "one")]
    min: usize,
}

fn one() -> usize {
    1
}

impl DivisionRule for MinRegimentsPresent {
    fn id(&self) -> &'static str {
        "min_regiments_present"
    }

    fn validate(&self, scope: &DivisionScope<'_>, params: &RuleParams) -> Vec<String> {
        let Some(params) = params.decode::<MinPresentParams>(self.id()) else {
            return Vec::new();
        };
        let present: usize = params
            .regiments
            .iter()
            .map(|id| scope.division.count_regiment(id))
            .sum();
        if present >= params.min {
            return Vec::new();
        }
        vec![format!(
            "Division requires at least {} regiment(s) from: {} ({} present)",
            params.min,
            scope.regiment_names(&params.regiments).join(", "),
            present
        )]
    }
}

/// Fielding `regiment` requires one of `requires` as well
pub struct RegimentRequires;

#[derive(Debug, Deserialize)]
struct RequiresParams {
    regiment: RegimentId,
    requires: Vec<RegimentId>,
}

impl DivisionRule for RegimentRequires {
    fn id(&self) -> &'static str {
        "regiment_requires"
    }

    fn validate(&self, scope: &DivisionScope<'_>, params: &RuleParams) -> Vec<String> {
        let Some(params) = params.decode::<RequiresParams>(self.id()) else {
            return Vec::new();
        };
        let division = scope.division;
        if !division.has_regiment(&params.regiment)
            || params.requires.iter().any(|id| division.has_regiment(id))
        {
            return Vec::new();
        }
        vec![format!(
            "{} requires {} in the division",
            scope.regiment_name(&params.regiment),
            scope.regiment_names(&params.requires).join(" or ")
        )]
    }
}

/// Only one of the listed regiments may be fielded
pub struct RegimentsExclusive;

#[derive(Debug, Deserialize)]
struct ExclusiveParams {
    regiments: Vec<RegimentId>,
}

impl DivisionRule for RegimentsExclusive {
    fn id(&self) -> &'static str {
        "regiments_exclusive"
    }

    fn validate(&self, scope: &DivisionScope<'_>, params: &RuleParams) -> Vec<String> {
        let Some(params) = params.decode::<ExclusiveParams>(self.id()) else {
            return Vec::new();
        };
        let present: Vec<RegimentId> = params
            .regiments
            .iter()
            .filter(|id| scope.division.has_regiment(id))
            .cloned()
            .collect();
        if present.len() <= 1 {
            return Vec::new();
        }
        vec![format!(
            "Only one of {} may be fielded",
            scope.regiment_names(&present).join(", ")
        )]
    }
}

//! Validator: ordered problem list for a division snapshot
//!
//! Hard problems (cost parity against the main force) block a mutation;
//! everything else is a soft diagnostic shown to the user.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::catalog::division::DivisionTemplate;
use crate::core::types::{Category, ImprovementId, RegimentPosition};
use crate::engine::division::{DivisionEvaluation, RegimentEvaluation};
use crate::engine::resolver::resolve_pod;
use crate::engine::Engine;
use crate::roster::division::DivisionConfig;
use crate::rules::hooks::{unit_name, DivisionScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hard,
    Soft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParityKind {
    Vanguard,
    Allied,
}

/// Which regiment breaks cost parity, and how. Stays the same while the
/// point totals behind the breach move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ParityBreach {
    pub kind: ParityKind,
    pub position: RegimentPosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breach: Option<ParityBreach>,
}

impl Problem {
    pub fn hard(breach: ParityBreach, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Hard,
            message: message.into(),
            breach: Some(breach),
        }
    }

    pub fn soft(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Soft,
            message: message.into(),
            breach: None,
        }
    }

    pub fn is_hard(&self) -> bool {
        self.severity == Severity::Hard
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl<'a> Engine<'a> {
    pub fn validate(&self, template: &DivisionTemplate, division: &DivisionConfig) -> Vec<Problem> {
        let evaluation = self.evaluate(template, division);
        self.validate_evaluation(&evaluation)
    }

    /// Problems of an already evaluated division, in check order
    pub fn validate_evaluation(&self, evaluation: &DivisionEvaluation<'_>) -> Vec<Problem> {
        let mut problems = Vec::new();
        let scope = DivisionScope {
            catalog: self.catalog,
            template: evaluation.template,
            division: evaluation.division,
        };

        problems.extend(self.rules.validate_division(&scope).into_iter().map(Problem::soft));

        for (position, id) in &evaluation.missing {
            problems.push(Problem::soft(format!("Unknown regiment '{}' at {}", id, position)));
        }
        for regiment in &evaluation.regiments {
            let scope = regiment.prepared.scope(self.catalog, &regiment.view);
            problems.extend(
                self.rules
                    .validate_regiment(&scope)
                    .into_iter()
                    .map(|message| Problem::soft(format!("{}: {}", regiment.name(), message))),
            );
        }

        problems.extend(self.parity_problems(evaluation));
        problems.extend(self.support_problems(evaluation).into_iter().map(Problem::soft));

        for regiment in &evaluation.regiments {
            problems.extend(
                self.improvement_problems(regiment)
                    .into_iter()
                    .chain(selection_problems(regiment))
                    .map(|message| Problem::soft(format!("{}: {}", regiment.name(), message))),
            );
        }

        if let Some(commander) = &evaluation.division.commander {
            let allowed = &evaluation.template.commanders;
            if !allowed.is_empty() && !allowed.contains(commander) {
                problems.push(Problem::soft(format!(
                    "{} cannot command this division",
                    unit_name(self.catalog, commander)
                )));
            }
        }

        let remaining = evaluation.secondary_remaining();
        if remaining < 0 {
            problems.push(Problem::soft(format!(
                "Upgrade points overspent by {} ({} of {})",
                -remaining, evaluation.secondary_spend, evaluation.secondary_limit
            )));
        }

        problems
    }

    /// Vanguard and allied regiments may not cost more than the main force
    fn parity_problems(&self, evaluation: &DivisionEvaluation<'_>) -> Vec<Problem> {
        let Some(main) = evaluation.main_force_regiment() else {
            return Vec::new();
        };
        let limit = main.stats.primary_cost;
        let mut problems = Vec::new();

        for regiment in &evaluation.regiments {
            let cost = regiment.stats.primary_cost;
            if cost <= limit {
                continue;
            }
            let mut breach = |kind: ParityKind, label: &str| {
                problems.push(Problem::hard(
                    ParityBreach {
                        kind,
                        position: regiment.position,
                    },
                    format!(
                        "{} regiment {} ({} points) costs more than the main force {} ({} points)",
                        label,
                        regiment.name(),
                        cost,
                        main.name(),
                        limit
                    ),
                ));
            };
            if evaluation.division.is_vanguard(regiment.position) {
                breach(ParityKind::Vanguard, "Vanguard");
            }
            if evaluation.template.is_allied(regiment.regiment_id()) {
                breach(ParityKind::Allied, "Allied");
            }
        }
        problems
    }

    /// Purchased improvements that are not offered, not eligible, or over their cap
    fn improvement_problems(&self, regiment: &RegimentEvaluation<'_>) -> Vec<String> {
        let template = regiment.template();
        let config = &regiment.entry.config;
        let prepared = &regiment.prepared;
        let mut problems = Vec::new();
        let mut counts: BTreeMap<&ImprovementId, u32> = BTreeMap::new();

        for (position, improvements) in &config.improvements {
            let Some(active) = prepared.unit_at(position) else {
                if !improvements.is_empty() {
                    problems.push(format!("improvements recorded for empty position {}", position));
                }
                continue;
            };
            for improvement in improvements {
                if prepared.is_mandatory_at(position, improvement) {
                    continue;
                }
                *counts.entry(improvement).or_insert(0) += 1;
                let terms = template
                    .unit_improvement(improvement)
                    .and_then(|_| self.catalog.unit_improvement_terms(template, improvement));
                let Some(terms) = terms else {
                    problems.push(format!("{} is not offered in this regiment", improvement));
                    continue;
                };
                let eligible = self
                    .catalog
                    .unit(&active.unit_id)
                    .map_or(false, |unit| terms.admits(unit));
                if !eligible {
                    problems.push(format!(
                        "{} cannot take {}",
                        unit_name(self.catalog, &active.unit_id),
                        terms.name
                    ));
                }
            }
        }

        for improvement in &config.regiment_improvements {
            if prepared.regiment_mandatory.contains(improvement) {
                continue;
            }
            *counts.entry(improvement).or_insert(0) += 1;
            if template.regiment_improvement(improvement).is_none() {
                problems.push(format!("{} is not offered in this regiment", improvement));
            }
        }

        for (improvement, count) in counts {
            let terms = self
                .catalog
                .unit_improvement_terms(template, improvement)
                .or_else(|| self.catalog.regiment_improvement_terms(template, improvement));
            if let Some(terms) = terms {
                if let Some(max) = terms.max_amount {
                    if count > max {
                        problems.push(format!(
                            "at most {} {} per regiment ({} purchased)",
                            max, terms.name, count
                        ));
                    }
                }
            }
        }
        problems
    }
}

/// Active pods whose pick does not resolve to a choice
fn selection_problems(regiment: &RegimentEvaluation<'_>) -> Vec<String> {
    let config = &regiment.entry.config;
    let mut problems = Vec::new();
    for category in [Category::Base, Category::Additional] {
        if category == Category::Additional && !config.additional_enabled {
            continue;
        }
        let Some(selection) = config.selection(category) else {
            continue;
        };
        for group in regiment.template().structure.groups(category) {
            if group.is_optional() && !selection.optional.enabled {
                continue;
            }
            let picks = selection.picks(&group.name);
            for (index, pod) in group.pods.iter().enumerate() {
                let pick = picks.get(index).and_then(|p| p.as_deref());
                if resolve_pod(pod, pick).is_none() {
                    problems.push(format!(
                        "no choice selected for {} {} slot {}",
                        category.as_str(),
                        group.name,
                        index + 1
                    ));
                }
            }
        }
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::improvement::{ImprovementDefinition, ImprovementSlot};
    use crate::catalog::registry::Catalog;
    use crate::core::config::EngineConfig;
    use crate::core::types::{PositionKey, RegimentId, RegimentPosition, SlotGroup};
    use crate::rules::fixtures;
    use crate::rules::registry::RuleRegistry;

    fn base(index: usize) -> RegimentPosition {
        RegimentPosition::new(SlotGroup::Base, index)
    }

    fn line(pod: usize) -> PositionKey {
        PositionKey::new(Category::Base, "line", pod, 0)
    }

    /// Fixture catalog where the first pikemen carry veterans structurally
    fn catalog() -> Catalog {
        let mut catalog = fixtures::catalog();
        let mut veterans = ImprovementDefinition::new("veterans", "Veterans");
        veterans.max_amount = Some(1);
        catalog.insert_improvement(veterans);

        let mut foot = catalog.regiment(None, &RegimentId::new("foot")).cloned().unwrap();
        foot.structure.base[1].pods[0].choices[0].mandatory_improvements = vec!["veterans".into()];
        foot.unit_improvements = vec![ImprovementSlot::new("veterans")];
        catalog.insert_regiment(foot);
        catalog
    }

    fn division(catalog: &Catalog, regiments: &[&str]) -> (DivisionTemplate, DivisionConfig) {
        let (mut template, mut division) = fixtures::division(catalog, Vec::new(), regiments);
        template.upgrade_points = 20;
        for (index, id) in regiments.iter().enumerate() {
            if *id == "foot" {
                if let Some(entry) = division.entry_mut(base(index)) {
                    entry.config.select(Category::Base, "line", 1, Some("pikes".into()));
                }
            }
        }
        (template, division)
    }

    #[test]
    fn test_mandatory_copy_exempt_from_cap() {
        let catalog = catalog();
        let rules = RuleRegistry::builtin();
        let config = EngineConfig::default();
        let engine = Engine::with_rules(&catalog, &rules, &config);
        let (template, mut division) = division(&catalog, &["foot"]);

        let regiment = &mut division.entry_mut(base(0)).unwrap().config;
        regiment.purchase_improvement(line(0), "veterans".into());
        regiment.purchase_improvement(line(1), "veterans".into());

        let evaluation = engine.evaluate(&template, &division);
        assert_eq!(evaluation.regiment(base(0)).unwrap().secondary_cost, 2 + 2);
        assert!(engine.validate_evaluation(&evaluation).is_empty());
    }

    #[test]
    fn test_group_unit_purchase_flagged() {
        let catalog = catalog();
        let rules = RuleRegistry::builtin();
        let config = EngineConfig::default();
        let engine = Engine::with_rules(&catalog, &rules, &config);
        let (template, mut division) = division(&catalog, &["foot"]);

        let regiment = &mut division.entry_mut(base(0)).unwrap().config;
        regiment.purchase_improvement(PositionKey::new(Category::Base, "commander", 0, 0), "veterans".into());
        regiment.purchase_improvement(line(1), "veterans".into());

        let messages: Vec<String> = engine
            .validate(&template, &division)
            .into_iter()
            .map(|p| p.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "Foot Regiment: Officer cannot take Veterans",
                "Foot Regiment: at most 1 Veterans per regiment (2 purchased)",
            ]
        );
    }

    #[test]
    fn test_flagged_vanguard_parity_is_hard() {
        let catalog = catalog();
        let rules = RuleRegistry::builtin();
        let config = EngineConfig::default();
        let engine = Engine::with_rules(&catalog, &rules, &config);
        let (template, mut division) = division(&catalog, &["horse", "foot"]);
        assert!(engine.validate(&template, &division).is_empty());

        division.set_vanguard(base(0), true);
        let problems = engine.validate(&template, &division);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].is_hard());
        assert_eq!(
            problems[0].to_string(),
            "Vanguard regiment Horse Regiment (100 points) costs more than the main force Foot Regiment (90 points)"
        );
    }
}

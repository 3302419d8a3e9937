//! Catalog integrity check
//!
//! Dangling references resolve to neutral defaults at evaluation time, so
//! they are caught here instead: run it in tests and from the CLI.

use std::collections::BTreeSet;

use crate::catalog::division::DivisionTemplate;
use crate::catalog::regiment::RegimentTemplate;
use crate::catalog::registry::Catalog;
use crate::core::types::{Category, ImprovementId, UnitId};
use crate::rules::registry::RuleRegistry;

impl Catalog {
    /// Every dangling reference or structural defect in the catalog.
    ///
    /// Messages are sorted by template id so the output is stable.
    pub fn integrity_problems(&self, rules: &RuleRegistry) -> Vec<String> {
        let mut problems = Vec::new();

        let mut improvements: Vec<_> = self.improvements().collect();
        improvements.sort_by(|a, b| a.id.cmp(&b.id));
        for improvement in improvements {
            let owner = format!("improvement {}", improvement.id);
            let allowed = improvement.allowed_units.iter().flatten();
            for unit in allowed.chain(&improvement.excluded_units) {
                self.check_unit(&owner, unit, &mut problems);
            }
        }

        let mut regiments: Vec<&RegimentTemplate> = self.regiments().collect();
        regiments.sort_by(|a, b| (&a.id, &a.faction).cmp(&(&b.id, &b.faction)));
        for template in regiments {
            self.check_regiment(template, rules, &mut problems);
        }

        let mut divisions: Vec<&DivisionTemplate> = self.divisions().collect();
        divisions.sort_by(|a, b| a.id.cmp(&b.id));
        for template in divisions {
            self.check_division(template, rules, &mut problems);
        }

        problems
    }

    fn check_unit(&self, owner: &str, unit: &UnitId, problems: &mut Vec<String>) {
        if self.unit(unit).is_none() {
            problems.push(format!("{}: unknown unit '{}'", owner, unit));
        }
    }

    fn check_improvement(&self, owner: &str, improvement: &ImprovementId, problems: &mut Vec<String>) {
        if self.improvement(improvement).is_none() {
            problems.push(format!("{}: unknown improvement '{}'", owner, improvement));
        }
    }

    fn check_regiment(&self, template: &RegimentTemplate, rules: &RuleRegistry, problems: &mut Vec<String>) {
        let owner = match &template.faction {
            Some(faction) => format!("regiment {} ({})", template.id, faction),
            None => format!("regiment {}", template.id),
        };

        for category in [Category::Base, Category::Additional] {
            let mut names = BTreeSet::new();
            for group in template.structure.groups(category) {
                if !names.insert(group.name.as_str()) {
                    problems.push(format!(
                        "{}: duplicate group '{}' in {}",
                        owner,
                        group.name,
                        category.as_str()
                    ));
                }
                for (index, pod) in group.pods.iter().enumerate() {
                    let at = format!("{} {}/{}/{}", owner, category.as_str(), group.name, index);
                    if pod.choices.is_empty() {
                        problems.push(format!("{}: pod has no choices", at));
                    }
                    let mut keys = BTreeSet::new();
                    for choice in &pod.choices {
                        if !keys.insert(choice.key.as_str()) {
                            problems.push(format!("{}: duplicate choice key '{}'", at, choice.key));
                        }
                        if choice.units.is_empty() {
                            problems.push(format!("{}: choice '{}' has no units", at, choice.key));
                        }
                        for unit in &choice.units {
                            self.check_unit(&at, unit, problems);
                        }
                        for improvement in &choice.mandatory_improvements {
                            self.check_improvement(&at, improvement, problems);
                        }
                    }
                }
            }
        }

        if let Some(slot) = &template.custom_slot {
            for unit in slot.prices.keys() {
                self.check_unit(&owner, unit, problems);
            }
        }

        for slot in template.unit_improvements.iter().chain(&template.regiment_improvements) {
            self.check_improvement(&owner, &slot.id, problems);
        }

        for invocation in &template.rules {
            if !rules.has_regiment_rule(&invocation.id) {
                problems.push(format!("{}: unknown regiment rule '{}'", owner, invocation.id));
            }
        }
    }

    fn check_division(&self, template: &DivisionTemplate, rules: &RuleRegistry, problems: &mut Vec<String>) {
        let owner = format!("division {}", template.id);
        let faction = Some(&template.faction);

        for unit in &template.commanders {
            self.check_unit(&owner, unit, problems);
        }

        let slots = template
            .vanguard
            .iter()
            .chain(&template.base)
            .chain(&template.additional);
        let options = slots.flat_map(|slot| slot.options.iter());
        for regiment in options.chain(&template.allied_regiments) {
            if self.regiment(faction, regiment).is_none() {
                problems.push(format!("{}: unknown regiment '{}'", owner, regiment));
            }
        }

        for entry in &template.support_units {
            self.check_unit(&owner, &entry.unit, problems);
            let Some(assignment) = &entry.assignment else {
                continue;
            };
            for regiment in assignment.allowed_regiments.iter().flatten() {
                if self.regiment(faction, regiment).is_none() {
                    problems.push(format!("{}: unknown regiment '{}'", owner, regiment));
                }
            }
            for unit in &assignment.excludes {
                self.check_unit(&owner, unit, problems);
            }
        }

        for invocation in &template.rules {
            if !rules.has_division_rule(&invocation.id) {
                problems.push(format!("{}: unknown division rule '{}'", owner, invocation.id));
            }
        }
    }
}

//! Speculative mutation: apply an edit to a copy, keep it only if it adds
//! no hard problem

use std::collections::BTreeSet;

use crate::catalog::division::DivisionTemplate;
use crate::core::error::{MusterError, Result};
use crate::engine::validator::{ParityBreach, Problem};
use crate::engine::Engine;
use crate::roster::division::DivisionConfig;

impl<'a> Engine<'a> {
    fn hard_problems(&self, template: &DivisionTemplate, division: &DivisionConfig) -> Vec<Problem> {
        self.validate(template, division)
            .into_iter()
            .filter(Problem::is_hard)
            .collect()
    }

    /// Apply `change` to a copy of `committed`.
    ///
    /// Returns the new division, or `MusterError::Rejected` listing the hard
    /// problems the change would introduce. Hard problems already present
    /// in `committed` do not block the change, even when their point totals
    /// move; problems are matched by their breach, not their message.
    /// `committed` is never touched.
    pub fn propose<F>(
        &self,
        template: &DivisionTemplate,
        committed: &DivisionConfig,
        change: F,
    ) -> Result<DivisionConfig>
    where
        F: FnOnce(&mut DivisionConfig),
    {
        let mut speculative = committed.clone();
        change(&mut speculative);

        let existing: BTreeSet<Option<ParityBreach>> = self
            .hard_problems(template, committed)
            .into_iter()
            .map(|problem| problem.breach)
            .collect();
        let introduced: Vec<String> = self
            .hard_problems(template, &speculative)
            .into_iter()
            .filter(|problem| !existing.contains(&problem.breach))
            .map(|problem| problem.message)
            .collect();

        if introduced.is_empty() {
            Ok(speculative)
        } else {
            tracing::info!("Rejected change to {}: {}", template.id, introduced.join("; "));
            Err(MusterError::Rejected(introduced))
        }
    }

    /// Detach support units whose attachment is no longer legal and sell
    /// purchases beyond their allowance. Returns how many purchases changed.
    pub fn prune_support(&self, template: &DivisionTemplate, division: &mut DivisionConfig) -> usize {
        let detach: Vec<usize> = {
            let evaluation = self.evaluate(template, division);
            let mut detach: Vec<usize> = Vec::new();
            for (index, purchase) in division.support.iter().enumerate() {
                let Some(position) = purchase.assignment else {
                    continue;
                };
                let conflict = self.assignment_conflict(&evaluation, &purchase.unit_id, position, |other| {
                    other < index && !detach.contains(&other)
                });
                if let Some(reason) = conflict {
                    tracing::debug!("Detaching support unit {}: {}", index, reason);
                    detach.push(index);
                }
            }
            detach
        };
        for &index in &detach {
            division.assign_support(index, None);
        }

        let mut sold = 0;
        let mut index = division.support.len();
        while index > 0 {
            index -= 1;
            let unit = division.support[index].unit_id.clone();
            let allowance = self.support_purchase_limit(template, division, &unit);
            let count = division.count_support(&unit);
            if !allowance.permits(count) {
                tracing::debug!("Selling {} beyond allowance ({})", unit, allowance);
                division.sell_support(index);
                sold += 1;
            }
        }

        detach.len() + sold
    }
}

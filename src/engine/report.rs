//! Serialisable evaluation results for presentation and export

use std::fmt;

use serde::Serialize;

use crate::catalog::division::DivisionTemplate;
use crate::core::error::Result;
use crate::core::types::{DivisionId, RegimentId, RegimentPosition, UnitId};
use crate::engine::division::DivisionType;
use crate::engine::improvements::EffectiveImprovement;
use crate::engine::resolver::ActiveUnit;
use crate::engine::stats::Stats;
use crate::engine::validator::Problem;
use crate::engine::Engine;
use crate::roster::division::DivisionConfig;

#[derive(Debug, Clone, Serialize)]
pub struct RegimentReport {
    pub position: RegimentPosition,
    pub regiment_id: RegimentId,
    pub name: String,
    /// Presented stats, main-force bonus included
    pub stats: Stats,
    pub secondary_cost: i32,
    pub main_force: bool,
    pub vanguard: bool,
    pub allied: bool,
    pub units: Vec<ActiveUnit>,
    pub improvements: Vec<EffectiveImprovement>,
    pub support: Vec<UnitId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DivisionReport {
    pub division_id: DivisionId,
    pub name: String,
    pub primary_cost: i32,
    pub secondary_spend: i32,
    pub secondary_limit: i32,
    pub secondary_remaining: i32,
    pub division_type: Option<DivisionType>,
    pub main_force: Option<RegimentPosition>,
    pub commander: Option<UnitId>,
    pub regiments: Vec<RegimentReport>,
    pub unassigned_support: Vec<UnitId>,
    pub problems: Vec<Problem>,
}

impl DivisionReport {
    pub fn has_hard_problems(&self) -> bool {
        self.problems.iter().any(Problem::is_hard)
    }
}

impl<'a> Engine<'a> {
    pub fn report(&self, template: &DivisionTemplate, division: &DivisionConfig) -> DivisionReport {
        let evaluation = self.evaluate(template, division);
        let problems = self.validate_evaluation(&evaluation);

        let regiments = evaluation
            .regiments
            .iter()
            .map(|regiment| RegimentReport {
                position: regiment.position,
                regiment_id: regiment.regiment_id().clone(),
                name: regiment.name().to_string(),
                stats: self
                    .presented_stats(&evaluation, regiment.position)
                    .unwrap_or(regiment.stats),
                secondary_cost: regiment.secondary_cost,
                main_force: evaluation.main_force == Some(regiment.position),
                vanguard: division.is_vanguard(regiment.position),
                allied: template.is_allied(regiment.regiment_id()),
                units: regiment.prepared.units.clone(),
                improvements: self.effective_of(&regiment.view, &regiment.prepared),
                support: division
                    .support_at(regiment.position)
                    .map(|(_, purchase)| purchase.unit_id.clone())
                    .collect(),
            })
            .collect();

        DivisionReport {
            division_id: template.id.clone(),
            name: template.name.clone(),
            primary_cost: evaluation.primary_cost,
            secondary_spend: evaluation.secondary_spend,
            secondary_limit: evaluation.secondary_limit,
            secondary_remaining: evaluation.secondary_remaining(),
            division_type: evaluation.division_type,
            main_force: evaluation.main_force,
            commander: division.commander.clone(),
            regiments,
            unassigned_support: evaluation
                .unassigned_support()
                .map(|purchase| purchase.unit_id.clone())
                .collect(),
            problems,
        }
    }

    /// Report for a division, looking its template up in the catalog
    pub fn report_for(&self, division: &DivisionConfig) -> Result<DivisionReport> {
        let template = self.division_template(division)?;
        Ok(self.report(template, division))
    }
}

impl fmt::Display for DivisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.name, self.division_id)?;
        if let Some(division_type) = self.division_type {
            writeln!(f, "  {}", division_type)?;
        }
        writeln!(f, "  Army points: {}", self.primary_cost)?;
        writeln!(
            f,
            "  Upgrade points: {} of {} ({} remaining)",
            self.secondary_spend, self.secondary_limit, self.secondary_remaining
        )?;

        for regiment in &self.regiments {
            let marker = if regiment.main_force {
                " [main force]"
            } else if regiment.vanguard {
                " [vanguard]"
            } else {
                ""
            };
            writeln!(f, "  {} {}{}", regiment.position, regiment.name, marker)?;
            let stats = &regiment.stats;
            writeln!(
                f,
                "    cost {} | upgrade {} | recon {} | motivation {} | activations {} | orders {} | awareness {} | {}",
                stats.primary_cost,
                regiment.secondary_cost,
                stats.recon,
                stats.motivation,
                stats.activations,
                stats.orders,
                stats.awareness,
                stats.formation.map_or_else(|| "-".to_string(), |formation| formation.to_string())
            )?;
        }

        if !self.unassigned_support.is_empty() {
            let names: Vec<&str> = self.unassigned_support.iter().map(UnitId::as_str).collect();
            writeln!(f, "  Unassigned support: {}", names.join(", "))?;
        }

        if self.problems.is_empty() {
            writeln!(f, "  No problems")?;
        } else {
            writeln!(f, "  Problems:")?;
            for problem in &self.problems {
                let tag = if problem.is_hard() { "!" } else { "-" };
                writeln!(f, "    {} {}", tag, problem)?;
            }
        }
        Ok(())
    }
}

//! Cost Engine: primary (army point) and secondary (upgrade point) costs

use crate::catalog::regiment::RegimentTemplate;
use crate::engine::improvements::PreparedRegiment;
use crate::engine::resolver::ActiveUnit;
use crate::engine::view::RegimentView;
use crate::engine::Engine;

impl<'a> Engine<'a> {
    /// Primary cost of one active unit
    pub fn unit_primary_cost(&self, template: &RegimentTemplate, unit: &ActiveUnit) -> i32 {
        let catalog_cost = || self.catalog.unit(&unit.unit_id).map_or(0, |u| u.cost);
        let base = match unit.cost_override {
            Some(cost) => cost,
            None if unit.custom_priced => template
                .custom_slot
                .as_ref()
                .and_then(|slot| slot.prices.get(&unit.unit_id).copied())
                .unwrap_or_else(|| {
                    tracing::warn!(
                        "No custom price for '{}' in {}, using catalog cost",
                        unit.unit_id,
                        template.id
                    );
                    catalog_cost()
                }),
            None => catalog_cost(),
        };
        base + unit.extra_cost
    }

    pub fn regiment_primary_cost(&self, view: &RegimentView<'_>) -> i32 {
        let prepared = self.prepare(view);
        self.primary_cost_of(view, &prepared)
    }

    pub fn regiment_secondary_cost(&self, view: &RegimentView<'_>) -> i32 {
        let prepared = self.prepare(view);
        self.secondary_cost_of(view, &prepared)
    }

    pub(crate) fn primary_cost_of(&self, view: &RegimentView<'_>, prepared: &PreparedRegiment) -> i32 {
        let scope = prepared.scope(self.catalog, view);
        let base = self.rules.modify_cost(view.template.cost, &scope);

        let units: i32 = prepared
            .units
            .iter()
            .map(|unit| self.unit_primary_cost(view.template, unit))
            .sum();

        let improvements = self.improvement_primary_cost(view, prepared);

        let (support, modifier) = match view.division {
            Some(link) => {
                let support: i32 = link
                    .config
                    .support_at(link.position)
                    .filter_map(|(_, purchase)| self.catalog.unit(&purchase.unit_id))
                    .map(|unit| unit.cost)
                    .sum();
                let modifier = self.rules.regiment_cost_modifier(link, view.regiment_id);
                (support, modifier.primary_cost)
            }
            None => (0, 0),
        };

        base + units + improvements + support + modifier
    }

    pub(crate) fn secondary_cost_of(&self, view: &RegimentView<'_>, prepared: &PreparedRegiment) -> i32 {
        let upkeep: i32 = prepared
            .units
            .iter()
            .filter_map(|unit| self.catalog.unit(&unit.unit_id))
            .filter(|unit| !unit.is_group())
            .map(|unit| unit.upkeep)
            .sum();

        let scope = prepared.scope(self.catalog, view);
        let gross: i32 = prepared.charges.iter().map(|charge| charge.cost).sum();
        let improvements = gross - self.rules.improvement_discount(&scope);

        let (support, modifier) = match view.division {
            Some(link) => {
                let support: i32 = link
                    .config
                    .support_at(link.position)
                    .filter_map(|(_, purchase)| self.catalog.unit(&purchase.unit_id))
                    .filter(|unit| !unit.is_group())
                    .map(|unit| unit.upkeep)
                    .sum();
                let modifier = self.rules.regiment_cost_modifier(link, view.regiment_id);
                (support, modifier.secondary_points)
            }
            None => (0, 0),
        };

        upkeep + improvements + support + modifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::improvement::{CostRule, ImprovementDefinition, ImprovementSlot};
    use crate::catalog::regiment::{Choice, CustomSlot, Group, Pod};
    use crate::catalog::registry::Catalog;
    use crate::catalog::unit::{RankTier, UnitDefinition};
    use crate::core::config::EngineConfig;
    use crate::core::types::{Category, PositionKey};
    use crate::roster::regiment::RegimentConfig;
    use crate::rules::params::{RuleInvocation, RuleParams};
    use crate::rules::registry::RuleRegistry;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        for (id, cost, upkeep) in [("pikemen", 30, 1), ("musketeers", 35, 1), ("cannon", 60, 2)] {
            let mut unit = UnitDefinition::new(id, id);
            unit.cost = cost;
            unit.upkeep = upkeep;
            unit.improvement_cost = 3;
            catalog.insert_unit(unit);
        }
        let mut colonel = UnitDefinition::new("colonel", "Colonel");
        colonel.cost = 25;
        colonel.upkeep = 4;
        colonel.rank = RankTier::Group;
        catalog.insert_unit(colonel);

        let mut veteran = ImprovementDefinition::new("veteran", "Veteran");
        veteran.cost_rule = Some(CostRule::Double);
        catalog.insert_improvement(veteran);
        catalog.insert_improvement(ImprovementDefinition::new("drilled", "Drilled"));

        let mut banner = ImprovementDefinition::new("banner", "Banner");
        banner.scope = crate::catalog::improvement::ImprovementScope::Regiment;
        banner.primary_cost = Some(10);
        banner.secondary_cost = Some(2);
        catalog.insert_improvement(banner);
        catalog
    }

    fn template() -> RegimentTemplate {
        let mut template = RegimentTemplate::new("foot", "Foot");
        template.cost = 20;
        let mut shot = Choice::new("shot", &["musketeers", "musketeers"]);
        shot.cost_override = Some(50);
        shot.extra_cost = 4;
        template.structure.base = vec![
            Group::new("commander", vec![Pod::new(vec![Choice::new("colonel", &["colonel"])])]),
            Group::new(
                "line",
                vec![
                    Pod::new(vec![Choice::new("pikes", &["pikemen"])]),
                    Pod::new(vec![shot]),
                ],
            ),
        ];
        template.unit_improvements = vec![ImprovementSlot::new("veteran"), ImprovementSlot::new("drilled")];
        template.regiment_improvements = vec![ImprovementSlot::new("banner")];
        template
    }

    fn pikes() -> PositionKey {
        PositionKey::new(Category::Base, "line", 0, 0)
    }

    #[test]
    fn test_unit_primary_cost_sources() {
        let catalog = catalog();
        let rules = RuleRegistry::builtin();
        let config = EngineConfig::default();
        let engine = Engine::with_rules(&catalog, &rules, &config);
        let mut template = template();

        let mut unit = ActiveUnit::new(pikes(), "pikemen".into());
        assert_eq!(engine.unit_primary_cost(&template, &unit), 30);
        unit.extra_cost = 5;
        assert_eq!(engine.unit_primary_cost(&template, &unit), 35);
        unit.cost_override = Some(10);
        assert_eq!(engine.unit_primary_cost(&template, &unit), 15);

        let mut custom = ActiveUnit::new(PositionKey::custom(), "cannon".into());
        custom.custom_priced = true;
        assert_eq!(engine.unit_primary_cost(&template, &custom), 60);
        let mut slot = CustomSlot::default();
        slot.prices.insert("cannon".into(), 45);
        template.custom_slot = Some(slot);
        assert_eq!(engine.unit_primary_cost(&template, &custom), 45);

        let unknown = ActiveUnit::new(pikes(), "ghosts".into());
        assert_eq!(engine.unit_primary_cost(&template, &unknown), 0);
    }

    #[test]
    fn test_regiment_primary_cost() {
        let catalog = catalog();
        let rules = RuleRegistry::builtin();
        let config = EngineConfig::default();
        let engine = Engine::with_rules(&catalog, &rules, &config);
        let template = template();
        let mut regiment = RegimentConfig::with_defaults(&template);

        // base 20 + colonel 25 + pikemen 30 + package (50 + 4) + second musketeer 35
        let view = RegimentView::standalone(&template, &regiment);
        assert_eq!(engine.regiment_primary_cost(&view), 164);

        regiment.purchase_regiment_improvement("banner".into());
        let view = RegimentView::standalone(&template, &regiment);
        assert_eq!(engine.regiment_primary_cost(&view), 174);
    }

    #[test]
    fn test_regiment_secondary_cost() {
        let catalog = catalog();
        let rules = RuleRegistry::builtin();
        let config = EngineConfig::default();
        let engine = Engine::with_rules(&catalog, &rules, &config);
        let template = template();
        let mut regiment = RegimentConfig::with_defaults(&template);

        // upkeep of the three combat units; the colonel is group rank
        let view = RegimentView::standalone(&template, &regiment);
        assert_eq!(engine.regiment_secondary_cost(&view), 3);

        regiment.purchase_improvement(pikes(), "veteran".into());
        regiment.purchase_improvement(pikes(), "drilled".into());
        regiment.purchase_regiment_improvement("banner".into());
        let view = RegimentView::standalone(&template, &regiment);
        // veteran double 6, drilled identity 3, banner 2
        assert_eq!(engine.regiment_secondary_cost(&view), 14);
    }

    #[test]
    fn test_group_rank_improvement_adds_no_cost() {
        let mut catalog = catalog();
        let mut marksmen = ImprovementDefinition::new("marksmen", "Marksmen");
        marksmen.primary_cost = Some(5);
        catalog.insert_improvement(marksmen);
        let rules = RuleRegistry::builtin();
        let config = EngineConfig::default();
        let engine = Engine::with_rules(&catalog, &rules, &config);
        let mut template = template();
        template.unit_improvements.push(ImprovementSlot::new("marksmen"));

        let mut regiment = RegimentConfig::with_defaults(&template);
        regiment.purchase_improvement(PositionKey::new(Category::Base, "commander", 0, 0), "marksmen".into());
        let view = RegimentView::standalone(&template, &regiment);
        assert_eq!(engine.regiment_primary_cost(&view), 164);
        assert_eq!(engine.regiment_secondary_cost(&view), 3);

        regiment.purchase_improvement(pikes(), "marksmen".into());
        let view = RegimentView::standalone(&template, &regiment);
        assert_eq!(engine.regiment_primary_cost(&view), 169);
        assert_eq!(engine.regiment_secondary_cost(&view), 3 + 3);
    }

    #[test]
    fn test_structural_mandatory_improvement_not_charged() {
        let catalog = catalog();
        let rules = RuleRegistry::builtin();
        let config = EngineConfig::default();
        let engine = Engine::with_rules(&catalog, &rules, &config);
        let mut template = template();
        let mut pikes_choice = Choice::new("pikes", &["pikemen"]);
        pikes_choice.mandatory_improvements = vec!["veteran".into()];
        template.structure.base[1].pods[0] = Pod::new(vec![pikes_choice]);

        let mut regiment = RegimentConfig::with_defaults(&template);
        regiment.purchase_improvement(pikes(), "veteran".into());
        let view = RegimentView::standalone(&template, &regiment);
        assert_eq!(engine.regiment_secondary_cost(&view), 3);
        assert!(engine.is_improvement_mandatory(&view, Some(&pikes()), &"veteran".into()));
    }

    #[test]
    fn test_improvement_eligibility() {
        let catalog = catalog();
        let rules = RuleRegistry::builtin();
        let config = EngineConfig::default();
        let engine = Engine::with_rules(&catalog, &rules, &config);
        let template = template();
        let regiment = RegimentConfig::with_defaults(&template);
        let view = RegimentView::standalone(&template, &regiment);

        assert!(engine.unit_improvement_eligible(&view, &"pikemen".into(), &"veteran".into()));
        // group rank, unknown unit, and an improvement the template does not list
        assert!(!engine.unit_improvement_eligible(&view, &"colonel".into(), &"veteran".into()));
        assert!(!engine.unit_improvement_eligible(&view, &"ghosts".into(), &"veteran".into()));
        assert!(!engine.unit_improvement_eligible(&view, &"pikemen".into(), &"banner".into()));
    }

    #[test]
    fn test_rules_adjust_costs() {
        let catalog = catalog();
        let rules = RuleRegistry::builtin();
        let config = EngineConfig::default();
        let engine = Engine::with_rules(&catalog, &rules, &config);
        let mut template = template();
        template.rules = vec![
            RuleInvocation::new("base_cost_modifier", RuleParams::new().with("amount", -20)),
            RuleInvocation::new("first_free_improvement", RuleParams::new().with("improvement", "veteran")),
        ];

        let mut regiment = RegimentConfig::with_defaults(&template);
        regiment.purchase_improvement(pikes(), "veteran".into());
        regiment.purchase_improvement(PositionKey::new(Category::Base, "line", 1, 0), "veteran".into());
        let view = RegimentView::standalone(&template, &regiment);

        assert_eq!(engine.regiment_primary_cost(&view), 144);
        // two veterans at 6 each, the first refunded
        assert_eq!(engine.regiment_secondary_cost(&view), 3 + 6);
        assert!(!engine.is_improvement_free(&view, Some(&"pikemen".into()), &"veteran".into()));

        let effective = engine.effective_improvements(&view);
        assert_eq!(effective.len(), 2);
        assert!(effective[0].free);
        assert!(!effective[1].free);
    }
}

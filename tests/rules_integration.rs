//! Rule system integration tests
//!
//! Catalog definitions are parsed from inline TOML, the same shape the
//! loader reads from disk, and each test attaches the rules it exercises.

use std::path::Path;

use muster::catalog::loader::{parse_improvements, parse_units};
use muster::catalog::*;
use muster::core::*;
use muster::engine::*;
use muster::roster::*;
use muster::rules::{RegimentRule, RegimentScope, RuleInvocation, RuleParams, RuleRegistry};

const UNITS: &str = r#"
[[unit]]
id = "colonel"
name = "Colonel"
cost = 20
rank = "group"
orders = 2

[[unit]]
id = "pikemen"
name = "Pikemen"
cost = 30
upkeep = 1
improvement_cost = 2
traits = ["pike_and_shot"]

[[unit]]
id = "musketeers"
name = "Musketeers"
cost = 32
upkeep = 1
improvement_cost = 2

[[unit]]
id = "hussars"
name = "Hussars"
cost = 55
upkeep = 2
improvement_cost = 3
rank = "elite"
traits = ["mounted", "lance"]

[[unit]]
id = "heavy_gun"
name = "Heavy gun"
cost = 40
upkeep = 2
traits = ["artillery"]
"#;

const IMPROVEMENTS: &str = r#"
[[improvement]]
id = "veterans"
name = "Veterans"
cost_rule = "double"

[[improvement]]
id = "drilled"
name = "Drilled"
cost_rule = "normal"
"#;

const PIKE_REGIMENT: &str = r#"
id = "pike_regiment"
name = "Pike regiment"
cost = 10

[[structure.base]]
name = "commander"
pods = [[{ key = "colonel", units = ["colonel"] }]]

[[structure.base]]
name = "line"
pods = [
    [{ key = "pikes", units = ["pikemen"] }],
    [{ key = "pikes", units = ["pikemen"] }, { key = "shot", units = ["musketeers"] }],
    [{ key = "shot", units = ["musketeers"] }],
]

[[unit_improvements]]
id = "veterans"

[[unit_improvements]]
id = "drilled"

[[rules]]
id = "max_units"
params = { units = ["musketeers"], max = 1 }
"#;

const HUSSAR_REGIMENT: &str = r#"
id = "hussar_regiment"
name = "Hussar regiment"
cost = 15

[[structure.base]]
name = "commander"
pods = [[{ key = "colonel", units = ["colonel"] }]]

[[structure.base]]
name = "cavalry"
pods = [
    [{ key = "hussars", units = ["hussars"] }],
    [{ key = "hussars", units = ["hussars"] }],
]

[[unit_improvements]]
id = "veterans"

[[rules]]
id = "first_free_improvement"
params = { improvement = "veterans" }
"#;

const DIVISION: &str = r#"
id = "crown"
name = "Crown division"
faction = "crown"
upgrade_points = 10
base = [
    ["pike_regiment", "hussar_regiment"],
    ["pike_regiment", "hussar_regiment"],
]

[[support_units]]
unit = "heavy_gun"
purchasable = false
"#;

/// Catalog whose division carries `rules` (TOML `[[rules]]` tables)
fn catalog(rules: &str) -> Catalog {
    let mut catalog = Catalog::new();
    for unit in parse_units(UNITS, Path::new("units.toml")).unwrap() {
        catalog.insert_unit(unit);
    }
    for improvement in parse_improvements(IMPROVEMENTS, Path::new("improvements.toml")).unwrap() {
        catalog.insert_improvement(improvement);
    }
    catalog.insert_regiment(toml::from_str(PIKE_REGIMENT).unwrap());
    catalog.insert_regiment(toml::from_str(HUSSAR_REGIMENT).unwrap());
    catalog.insert_division(toml::from_str(&format!("{}\n{}", DIVISION, rules)).unwrap());
    catalog
}

fn division_template(catalog: &Catalog) -> &DivisionTemplate {
    catalog.division(&DivisionId::new("crown")).unwrap()
}

fn regiment_template<'c>(catalog: &'c Catalog, id: &str) -> &'c RegimentTemplate {
    catalog.regiment(None, &RegimentId::new(id)).unwrap()
}

fn base(index: usize) -> RegimentPosition {
    RegimentPosition::new(SlotGroup::Base, index)
}

fn line(pod: usize) -> PositionKey {
    PositionKey::new(Category::Base, "line", pod, 0)
}

fn cavalry(pod: usize) -> PositionKey {
    PositionKey::new(Category::Base, "cavalry", pod, 0)
}

/// Place a pike regiment, picking `second` for the open line pod
fn place_pikes(catalog: &Catalog, division: &mut DivisionConfig, position: RegimentPosition, second: &str) {
    division.set_regiment(position, regiment_template(catalog, "pike_regiment"));
    division
        .entry_mut(position)
        .unwrap()
        .config
        .select(Category::Base, "line", 1, Some(second.to_string()));
}

fn place_hussars(catalog: &Catalog, division: &mut DivisionConfig, position: RegimentPosition) {
    division.set_regiment(position, regiment_template(catalog, "hussar_regiment"));
}

fn messages(problems: &[Problem]) -> Vec<&str> {
    problems.iter().map(|p| p.message.as_str()).collect()
}

#[test]
fn test_first_free_improvement() {
    let catalog = catalog("");
    let rules = RuleRegistry::builtin();
    let config = EngineConfig::default();
    let engine = Engine::with_rules(&catalog, &rules, &config);
    let template = regiment_template(&catalog, "hussar_regiment");
    let hussars = UnitId::new("hussars");
    let veterans = ImprovementId::new("veterans");

    let mut regiment = RegimentConfig::with_defaults(template);
    assert!(engine.is_improvement_free(&RegimentView::standalone(template, &regiment), Some(&hussars), &veterans));

    regiment.purchase_improvement(cavalry(0), veterans.clone());
    assert!(!engine.is_improvement_free(&RegimentView::standalone(template, &regiment), Some(&hussars), &veterans));

    regiment.purchase_improvement(cavalry(1), veterans.clone());
    let view = RegimentView::standalone(template, &regiment);
    // Two purchases at 6 each, the first refunded
    assert_eq!(engine.regiment_secondary_cost(&view), 4 + 6);

    let effective = engine.effective_improvements(&view);
    assert_eq!(effective.len(), 2);
    assert_eq!(effective[0].position, Some(cavalry(0)));
    assert!(effective[0].free);
    assert!(!effective[1].free);
    assert!(effective.iter().all(|e| !e.mandatory));
}

#[test]
fn test_division_free_improvement() {
    let catalog = catalog(
        r#"
[[rules]]
id = "free_improvement"
params = { improvement = "drilled", regiments = ["pike_regiment"], units = ["pikemen"] }
"#,
    );
    let rules = RuleRegistry::builtin();
    let config = EngineConfig::default();
    let engine = Engine::with_rules(&catalog, &rules, &config);
    let template = division_template(&catalog);

    let mut division = DivisionConfig::new(template);
    place_pikes(&catalog, &mut division, base(0), "pikes");
    let entry = division.entry_mut(base(0)).unwrap();
    entry.config.purchase_improvement(line(0), ImprovementId::new("drilled"));
    entry.config.purchase_improvement(line(2), ImprovementId::new("drilled"));

    let evaluation = engine.evaluate(template, &division);
    let pike = evaluation.regiment(base(0)).unwrap();
    // Three upkeep, then two drilled at 2 each with the pikemen's refunded
    assert_eq!(pike.secondary_cost, 3 + 2);

    let drilled = ImprovementId::new("drilled");
    assert!(engine.is_improvement_free(&pike.view, Some(&UnitId::new("pikemen")), &drilled));
    assert!(!engine.is_improvement_free(&pike.view, Some(&UnitId::new("musketeers")), &drilled));

    // The same regiment outside the division pays full price
    let standalone = RegimentView::standalone(pike.template(), &pike.entry.config);
    assert_eq!(engine.regiment_secondary_cost(&standalone), 3 + 4);
}

#[test]
fn test_overlapping_free_grants_refund_once() {
    let mut catalog = catalog(
        r#"
[[rules]]
id = "free_improvement"
params = { improvement = "veterans", regiments = ["hussar_regiment"] }
"#,
    );
    let mut hussar = regiment_template(&catalog, "hussar_regiment").clone();
    hussar.unit_improvements.push(ImprovementSlot::new("drilled"));
    catalog.insert_regiment(hussar);

    let rules = RuleRegistry::builtin();
    let config = EngineConfig::default();
    let engine = Engine::with_rules(&catalog, &rules, &config);
    let template = division_template(&catalog);

    let mut division = DivisionConfig::new(template);
    place_hussars(&catalog, &mut division, base(0));
    let entry = division.entry_mut(base(0)).unwrap();
    entry.config.purchase_improvement(cavalry(0), ImprovementId::new("veterans"));
    entry.config.purchase_improvement(cavalry(1), ImprovementId::new("drilled"));

    let evaluation = engine.evaluate(template, &division);
    let hussars = evaluation.regiment(base(0)).unwrap();
    // Veterans (6) is free under both grants, drilled (3) is still paid
    assert_eq!(hussars.secondary_cost, 4 + 3);

    let effective = engine.effective_improvements(&hussars.view);
    assert_eq!(effective.len(), 2);
    assert!(effective[0].free);
    assert!(!effective[1].free);
}

#[test]
fn test_mandatory_improvement_is_never_charged() {
    let catalog = catalog(
        r#"
[[rules]]
id = "mandatory_improvement"
params = { improvement = "veterans", regiments = ["hussar_regiment"] }
"#,
    );
    let rules = RuleRegistry::builtin();
    let config = EngineConfig::default();
    let engine = Engine::with_rules(&catalog, &rules, &config);
    let template = division_template(&catalog);

    let mut division = DivisionConfig::new(template);
    place_hussars(&catalog, &mut division, base(0));
    division
        .entry_mut(base(0))
        .unwrap()
        .config
        .purchase_improvement(cavalry(0), ImprovementId::new("veterans"));

    let evaluation = engine.evaluate(template, &division);
    let hussars = evaluation.regiment(base(0)).unwrap();
    assert_eq!(hussars.secondary_cost, 4);

    let veterans = ImprovementId::new("veterans");
    assert!(engine.is_improvement_mandatory(&hussars.view, Some(&cavalry(1)), &veterans));
    assert!(!engine.is_improvement_mandatory(&hussars.view, None, &veterans));

    let effective = engine.effective_improvements(&hussars.view);
    assert_eq!(effective.len(), 2);
    assert!(effective.iter().all(|e| e.mandatory && !e.free));
    assert!(engine.validate_evaluation(&evaluation).is_empty());
}

#[test]
fn test_composition_rules_in_declared_order() {
    let catalog = catalog(
        r#"
[[rules]]
id = "max_same_regiment"
params = { max = 1 }

[[rules]]
id = "regiment_requires"
params = { regiment = "hussar_regiment", requires = ["pike_regiment"] }
"#,
    );
    let rules = RuleRegistry::builtin();
    let config = EngineConfig::default();
    let engine = Engine::with_rules(&catalog, &rules, &config);
    let template = division_template(&catalog);

    let mut division = DivisionConfig::new(template);
    place_hussars(&catalog, &mut division, base(0));
    place_hussars(&catalog, &mut division, base(1));

    let problems = engine.validate(template, &division);
    assert_eq!(
        messages(&problems),
        vec![
            "At most 1 Hussar regiment may be fielded (2 present)",
            "Hussar regiment requires Pike regiment in the division",
        ]
    );
    assert!(problems.iter().all(|p| !p.is_hard()));

    // Soft problems never block a change
    let committed = DivisionConfig::new(template);
    assert!(engine
        .propose(template, &committed, |d| place_hussars(&catalog, d, base(0)))
        .is_ok());
}

#[test]
fn test_mandatory_support_unlocks_purchases() {
    let catalog = catalog(
        r#"
[[rules]]
id = "mandatory_support_per_regiment"
params = { unit = "heavy_gun", regiments = ["pike_regiment"] }
"#,
    );
    let rules = RuleRegistry::builtin();
    let config = EngineConfig::default();
    let engine = Engine::with_rules(&catalog, &rules, &config);
    let template = division_template(&catalog);
    let heavy_gun = UnitId::new("heavy_gun");

    let mut division = DivisionConfig::new(template);
    assert_eq!(
        engine.support_purchase_limit(template, &division, &heavy_gun),
        SupportAllowance::UpTo(0)
    );

    place_pikes(&catalog, &mut division, base(0), "pikes");
    place_pikes(&catalog, &mut division, base(1), "pikes");
    assert_eq!(
        engine.support_purchase_limit(template, &division, &heavy_gun),
        SupportAllowance::UpTo(2)
    );
    let problems = engine.validate(template, &division);
    assert_eq!(
        messages(&problems),
        vec!["2 Heavy gun required for Pike regiment but 0 purchased"]
    );

    for _ in 0..3 {
        division.purchase_support(heavy_gun.clone());
    }
    let problems = engine.validate(template, &division);
    assert!(messages(&problems).contains(&"At most 2 Heavy gun may be purchased (3 purchased)"));
    assert_eq!(engine.prune_support(template, &mut division), 1);
    assert_eq!(division.count_support(&heavy_gun), 2);
}

#[test]
fn test_support_forbidden_without_rule() {
    let catalog = catalog("");
    let rules = RuleRegistry::builtin();
    let config = EngineConfig::default();
    let engine = Engine::with_rules(&catalog, &rules, &config);
    let template = division_template(&catalog);
    let division = DivisionConfig::new(template);

    assert_eq!(
        engine.support_purchase_limit(template, &division, &UnitId::new("heavy_gun")),
        SupportAllowance::Forbidden
    );
    assert_eq!(
        engine.support_purchase_limit(template, &division, &UnitId::new("pikemen")),
        SupportAllowance::Forbidden
    );
}

#[test]
fn test_division_bonus_requires_regiment() {
    let catalog = catalog(
        r#"
[[rules]]
id = "division_bonus"
params = { secondary_points = 3, cost = 5, requires_regiment = "hussar_regiment" }
"#,
    );
    let rules = RuleRegistry::builtin();
    let config = EngineConfig::default();
    let engine = Engine::with_rules(&catalog, &rules, &config);
    let template = division_template(&catalog);

    let mut division = DivisionConfig::new(template);
    place_pikes(&catalog, &mut division, base(0), "pikes");
    let evaluation = engine.evaluate(template, &division);
    assert_eq!(evaluation.secondary_limit, 10);
    assert_eq!(evaluation.primary_cost, 122);

    place_hussars(&catalog, &mut division, base(1));
    let evaluation = engine.evaluate(template, &division);
    assert_eq!(evaluation.secondary_limit, 13);
    assert_eq!(evaluation.primary_cost, 122 + 145 + 5);
}

#[test]
fn test_regiment_stats_and_cost_modifiers() {
    let catalog = catalog(
        r#"
[[rules]]
id = "regiment_stats_bonus"
params = { regiments = ["pike_regiment"], motivation = 1, recon = 2 }

[[rules]]
id = "regiment_cost_modifier"
params = { regiments = ["pike_regiment"], primary_cost = -5, secondary_points = 1 }
"#,
    );
    let rules = RuleRegistry::builtin();
    let config = EngineConfig::default();
    let engine = Engine::with_rules(&catalog, &rules, &config);
    let template = division_template(&catalog);

    let mut division = DivisionConfig::new(template);
    place_pikes(&catalog, &mut division, base(0), "pikes");
    place_hussars(&catalog, &mut division, base(1));
    let evaluation = engine.evaluate(template, &division);

    let pike = evaluation.regiment(base(0)).unwrap();
    let alone = RegimentView::standalone(pike.template(), &pike.entry.config);
    let plain = engine.regiment_stats(&alone);
    assert_eq!(plain.motivation, 2);
    assert_eq!(plain.recon, -2);
    assert_eq!(pike.stats.motivation, plain.motivation + 1);
    assert_eq!(pike.stats.recon, plain.recon + 2);
    assert_eq!(pike.stats.primary_cost, plain.primary_cost - 5);
    assert_eq!(pike.secondary_cost, engine.regiment_secondary_cost(&alone) + 1);

    let hussars = evaluation.regiment(base(1)).unwrap();
    let alone = RegimentView::standalone(hussars.template(), &hussars.entry.config);
    assert_eq!(hussars.stats, engine.regiment_stats(&alone));
}

#[test]
fn test_regiment_rule_problem_is_prefixed() {
    let catalog = catalog("");
    let rules = RuleRegistry::builtin();
    let config = EngineConfig::default();
    let engine = Engine::with_rules(&catalog, &rules, &config);
    let template = division_template(&catalog);

    let mut division = DivisionConfig::new(template);
    place_pikes(&catalog, &mut division, base(0), "shot");
    division.base[0].as_mut().unwrap().custom_name = Some("Red Pikes".to_string());

    let problems = engine.validate(template, &division);
    assert_eq!(
        messages(&problems),
        vec!["Red Pikes: At most 1 of Musketeers allowed (2 selected)"]
    );
}

#[test]
fn test_unselected_pod_is_reported() {
    let catalog = catalog("");
    let rules = RuleRegistry::builtin();
    let config = EngineConfig::default();
    let engine = Engine::with_rules(&catalog, &rules, &config);
    let template = division_template(&catalog);

    let mut division = DivisionConfig::new(template);
    division.set_regiment(base(0), regiment_template(&catalog, "pike_regiment"));
    let problems = engine.validate(template, &division);
    assert_eq!(
        messages(&problems),
        vec!["Pike regiment: no choice selected for base line slot 2"]
    );
}

#[test]
fn test_unknown_and_malformed_rules_are_neutral() {
    let plain = catalog("");
    let noisy = catalog(
        r#"
[[rules]]
id = "no_such_rule"

[[rules]]
id = "max_same_regiment"
params = { max = "two" }

[[rules]]
id = "division_bonus"
params = { secondary_points = "lots" }
"#,
    );
    let rules = RuleRegistry::builtin();
    let config = EngineConfig::default();

    let totals = |catalog: &Catalog| {
        let engine = Engine::with_rules(catalog, &rules, &config);
        let template = division_template(catalog);
        let mut division = DivisionConfig::new(template);
        place_hussars(catalog, &mut division, base(0));
        place_hussars(catalog, &mut division, base(1));
        let evaluation = engine.evaluate(template, &division);
        let problems = engine.validate_evaluation(&evaluation);
        (
            evaluation.primary_cost,
            evaluation.secondary_spend,
            evaluation.secondary_limit,
            problems.len(),
        )
    };
    assert_eq!(totals(&noisy), totals(&plain));
}

/// Adds a flat amount to the regiment's base cost
struct FlatSurcharge;

impl RegimentRule for FlatSurcharge {
    fn id(&self) -> &'static str {
        "flat_surcharge"
    }

    fn modify_cost(&self, running: i32, _scope: &RegimentScope<'_>, params: &RuleParams) -> i32 {
        #[derive(serde::Deserialize)]
        struct Params {
            amount: i32,
        }
        params
            .decode::<Params>(self.id())
            .map_or(running, |p| running + p.amount)
    }
}

#[test]
fn test_custom_rule_registration() {
    let catalog = catalog("");
    let config = EngineConfig::default();
    let mut template = regiment_template(&catalog, "pike_regiment").clone();
    template.rules.push(RuleInvocation::new(
        "flat_surcharge",
        RuleParams::new().with("amount", 7),
    ));
    let mut regiment = RegimentConfig::with_defaults(&template);
    regiment.select(Category::Base, "line", 1, Some("pikes".to_string()));
    let view = RegimentView::standalone(&template, &regiment);

    let builtin = RuleRegistry::builtin();
    assert!(!builtin.has_regiment_rule("flat_surcharge"));
    let engine = Engine::with_rules(&catalog, &builtin, &config);
    assert_eq!(engine.regiment_primary_cost(&view), 122);

    let mut extended = RuleRegistry::builtin();
    extended.register_regiment(Box::new(FlatSurcharge));
    let engine = Engine::with_rules(&catalog, &extended, &config);
    assert_eq!(engine.regiment_primary_cost(&view), 129);
}

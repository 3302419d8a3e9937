//! Small catalog shared by the rule unit tests

use crate::catalog::division::{DivisionTemplate, RegimentSlot};
use crate::catalog::regiment::{Choice, Group, Pod, RegimentTemplate};
use crate::catalog::registry::Catalog;
use crate::catalog::unit::{RankTier, UnitDefinition, UnitTrait};
use crate::core::types::{RegimentPosition, SlotGroup};
use crate::roster::division::DivisionConfig;
use crate::rules::params::RuleInvocation;

fn unit(id: &str, name: &str, cost: i32, traits: &[UnitTrait]) -> UnitDefinition {
    let mut unit = UnitDefinition::new(id, name);
    unit.cost = cost;
    unit.upkeep = 1;
    unit.improvement_cost = 2;
    unit.traits = traits.iter().copied().collect();
    unit
}

pub fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.insert_unit(unit("pikemen", "Pikemen", 30, &[UnitTrait::PikeAndShot]));
    catalog.insert_unit(unit("musketeers", "Musketeers", 35, &[]));
    catalog.insert_unit(unit("horse", "Horse", 50, &[UnitTrait::Mounted]));
    catalog.insert_unit(unit("cannon", "Cannon", 40, &[UnitTrait::Artillery]));
    let mut officer = unit("officer", "Officer", 20, &[]);
    officer.rank = RankTier::Group;
    catalog.insert_unit(officer);

    let mut foot = RegimentTemplate::new("foot", "Foot Regiment");
    foot.cost = 10;
    foot.structure.base = vec![
        Group::new("commander", vec![Pod::new(vec![Choice::new("officer", &["officer"])])]),
        Group::new(
            "line",
            vec![
                Pod::new(vec![Choice::new("pikes", &["pikemen"])]),
                Pod::new(vec![
                    Choice::new("pikes", &["pikemen"]),
                    Choice::new("shot", &["musketeers"]),
                ]),
            ],
        ),
    ];
    catalog.insert_regiment(foot);

    let mut horse = RegimentTemplate::new("horse", "Horse Regiment");
    horse.structure.base = vec![Group::new(
        "line",
        vec![
            Pod::new(vec![Choice::new("horse", &["horse"])]),
            Pod::new(vec![Choice::new("horse", &["horse"])]),
        ],
    )];
    catalog.insert_regiment(horse);

    catalog
}

/// A division fielding `regiments` in consecutive base slots
pub fn division(
    catalog: &Catalog,
    rules: Vec<RuleInvocation>,
    regiments: &[&str],
) -> (DivisionTemplate, DivisionConfig) {
    let mut template = DivisionTemplate::new("test", "Test Division", "test");
    template.base = regiments.iter().map(|_| RegimentSlot::new(&["foot", "horse"])).collect();
    template.rules = rules;

    let mut config = DivisionConfig::new(&template);
    for (index, id) in regiments.iter().enumerate() {
        let regiment = catalog
            .regiment(None, &(*id).into())
            .expect("fixture regiment");
        config.set_regiment(RegimentPosition::new(SlotGroup::Base, index), regiment);
    }
    (template, config)
}

/// Active units at consecutive base positions
pub fn active(ids: &[&str]) -> Vec<crate::engine::resolver::ActiveUnit> {
    use crate::core::types::{Category, PositionKey};
    ids.iter()
        .enumerate()
        .map(|(pod, id)| {
            crate::engine::resolver::ActiveUnit::new(
                PositionKey::new(Category::Base, "line", pod, 0),
                (*id).into(),
            )
        })
        .collect()
}

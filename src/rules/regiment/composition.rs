//! Unit-count constraints inside one regiment

use serde::Deserialize;

use crate::core::types::UnitId;
use crate::rules::hooks::{RegimentRule, RegimentScope};
use crate::rules::params::RuleParams;

pub struct MaxUnits;

#[derive(Debug, Deserialize)]
struct MaxParams {
    units: Vec<UnitId>,
    max: usize,
}

impl RegimentRule for MaxUnits {
    fn id(&self) -> &'static str {
        "max_units"
    }

    fn validate(&self, scope: &RegimentScope<'_>, params: &RuleParams) -> Option<String> {
        let params = params.decode::<MaxParams>(self.id())?;
        let count = scope.count_units(&params.units);
        (count > params.max).then(|| {
            format!(
                "At most {} of {} allowed ({} selected)",
                params.max,
                scope.unit_names(&params.units),
                count
            )
        })
    }
}

pub struct RequiresUnit;

#[derive(Debug, Deserialize)]
struct RequiresParams {
    units: Vec<UnitId>,
    #[serde(default = "one")]
    min: usize,
}

fn one() -> usize {
    1
}

impl RegimentRule for RequiresUnit {
    fn id(&self) -> &'static str {
        "requires_unit"
    }

    fn validate(&self, scope: &RegimentScope<'_>, params: &RuleParams) -> Option<String> {
        let params = params.decode::<RequiresParams>(self.id())?;
        let count = scope.count_units(&params.units);
        (count < params.min).then(|| {
            format!(
                "Requires at least {} of {} ({} selected)",
                params.min,
                scope.unit_names(&params.units),
                count
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RegimentId;
    use crate::roster::regiment::RegimentConfig;
    use crate::rules::fixtures;

    fn validate(rule: &dyn RegimentRule, params: &RuleParams, units: &[&str]) -> Option<String> {
        let catalog = fixtures::catalog();
        let id = RegimentId::new("foot");
        let template = catalog.regiment(None, &id).unwrap();
        let config = RegimentConfig::with_defaults(template);
        let units = fixtures::active(units);
        let scope = RegimentScope {
            catalog: &catalog,
            regiment_id: &id,
            template,
            config: &config,
            units: &units,
            purchases: &[],
            division: None,
        };
        rule.validate(&scope, params)
    }

    #[test]
    fn test_max_units() {
        let params = RuleParams::new().with("units", vec!["musketeers"]).with("max", 1);
        assert_eq!(validate(&MaxUnits, &params, &["pikemen", "musketeers"]), None);
        assert_eq!(
            validate(&MaxUnits, &params, &["musketeers", "musketeers"]).as_deref(),
            Some("At most 1 of Musketeers allowed (2 selected)")
        );
    }

    #[test]
    fn test_requires_unit() {
        let params = RuleParams::new().with("units", vec!["musketeers", "horse"]);
        assert!(validate(&RequiresUnit, &params, &["pikemen"]).is_some());
        assert!(validate(&RequiresUnit, &params, &["pikemen", "horse"]).is_none());
    }
}

//! Support units demanded by the regiments a division fields

use serde::Deserialize;

use crate::core::types::{RegimentId, UnitId};
use crate::rules::hooks::{DivisionRule, DivisionScope};
use crate::rules::params::RuleParams;

/// Every matching regiment must be accompanied by `per_regiment` copies of
/// a support unit. The same count unlocks standalone purchases of that
/// unit even when its catalog entry forbids them.
pub struct MandatorySupportPerRegiment;

#[derive(Debug, Deserialize)]
struct Params {
    unit: UnitId,
    regiments: Vec<RegimentId>,
    #[serde(default = "one")]
    per_regiment: u32,
}

fn one() -> u32 {
    1
}

impl Params {
    fn required(&self, scope: &DivisionScope<'_>) -> u32 {
        let matching: usize = self
            .regiments
            .iter()
            .map(|id| scope.division.count_regiment(id))
            .sum();
        self.per_regiment.saturating_mul(matching as u32)
    }
}

impl DivisionRule for MandatorySupportPerRegiment {
    fn id(&self) -> &'static str {
        "mandatory_support_per_regiment"
    }

    fn validate(&self, scope: &DivisionScope<'_>, params: &RuleParams) -> Vec<String> {
        let Some(params) = params.decode::<Params>(self.id()) else {
            return Vec::new();
        };
        let required = params.required(scope);
        let bought = scope.division.count_support(&params.unit) as u32;
        if bought >= required {
            return Vec::new();
        }
        vec![format!(
            "{} {} required for {} but {} purchased",
            required,
            scope.unit_name(&params.unit),
            scope.regiment_names(&params.regiments).join(", "),
            bought
        )]
    }

    fn support_allowance(
        &self,
        scope: &DivisionScope<'_>,
        unit: &UnitId,
        params: &RuleParams,
    ) -> Option<u32> {
        let params = params.decode::<Params>(self.id())?;
        (&params.unit == unit).then(|| params.required(scope))
    }
}

//! Borrowed views the engine evaluates

use crate::catalog::division::DivisionTemplate;
use crate::catalog::regiment::RegimentTemplate;
use crate::core::types::{RegimentId, RegimentPosition};
use crate::roster::division::{DivisionConfig, RegimentEntry};
use crate::roster::regiment::RegimentConfig;

/// The division a regiment is evaluated inside, and where it sits
#[derive(Debug, Clone, Copy)]
pub struct DivisionLink<'a> {
    pub config: &'a DivisionConfig,
    pub template: &'a DivisionTemplate,
    pub position: RegimentPosition,
}

/// One regiment as the engine sees it
#[derive(Debug, Clone, Copy)]
pub struct RegimentView<'a> {
    pub regiment_id: &'a RegimentId,
    pub template: &'a RegimentTemplate,
    pub config: &'a RegimentConfig,
    pub division: Option<DivisionLink<'a>>,
}

impl<'a> RegimentView<'a> {
    /// A regiment evaluated on its own, outside any division
    pub fn standalone(template: &'a RegimentTemplate, config: &'a RegimentConfig) -> Self {
        Self {
            regiment_id: &template.id,
            template,
            config,
            division: None,
        }
    }

    /// A regiment placed in a division slot
    pub fn in_division(
        template: &'a RegimentTemplate,
        entry: &'a RegimentEntry,
        division: DivisionLink<'a>,
    ) -> Self {
        Self {
            regiment_id: &entry.regiment_id,
            template,
            config: &entry.config,
            division: Some(division),
        }
    }
}

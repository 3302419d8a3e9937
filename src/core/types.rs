//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Group key that marks a togglable sub-block inside a category
pub const OPTIONAL_GROUP: &str = "optional";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Catalog identifier of a unit definition
    UnitId
);
string_id!(
    /// Catalog identifier of an improvement definition
    ImprovementId
);
string_id!(
    /// Catalog identifier of a regiment template
    RegimentId
);
string_id!(
    /// Catalog identifier of a division template
    DivisionId
);
string_id!(
    /// Faction scope for templates
    FactionId
);

/// Top-level category of a regiment's selection structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Mandatory-by-default block
    Base,
    /// Togglable as a whole
    Additional,
    /// The single custom-priced slot
    Custom,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Base => "base",
            Category::Additional => "additional",
            Category::Custom => "custom",
        }
    }
}

/// Structural address of an active unit instance inside one regiment.
///
/// Ordering follows resolution order: category, group name, pod index, sub-index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PositionKey {
    pub category: Category,
    pub group: String,
    pub pod: usize,
    pub sub: usize,
}

impl PositionKey {
    pub fn new(category: Category, group: impl Into<String>, pod: usize, sub: usize) -> Self {
        Self {
            category,
            group: group.into(),
            pod,
            sub,
        }
    }

    /// Key of the custom-priced slot
    pub fn custom() -> Self {
        Self::new(Category::Custom, "custom", 0, 0)
    }

    /// Is this position inside an optional sub-block?
    pub fn is_optional(&self) -> bool {
        self.group == OPTIONAL_GROUP
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.category.as_str(),
            self.group,
            self.pod,
            self.sub
        )
    }
}

/// Regiment slot-group within a division
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotGroup {
    Vanguard,
    Base,
    Additional,
}

impl SlotGroup {
    pub const ALL: [SlotGroup; 3] = [SlotGroup::Vanguard, SlotGroup::Base, SlotGroup::Additional];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotGroup::Vanguard => "vanguard",
            SlotGroup::Base => "base",
            SlotGroup::Additional => "additional",
        }
    }
}

/// Address of one regiment inside a division
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegimentPosition {
    pub slot: SlotGroup,
    pub index: usize,
}

impl RegimentPosition {
    pub fn new(slot: SlotGroup, index: usize) -> Self {
        Self { slot, index }
    }
}

impl fmt::Display for RegimentPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.slot.as_str(), self.index)
    }
}

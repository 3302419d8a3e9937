pub mod config;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::{MusterError, Result};
pub use types::{
    Category, DivisionId, FactionId, ImprovementId, PositionKey, RegimentId, RegimentPosition,
    SlotGroup, UnitId, OPTIONAL_GROUP,
};

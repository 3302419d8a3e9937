//! User working documents: the regiment and division being built
//!
//! The engine never mutates these; the helpers here are what the application
//! layer calls before re-running the engine.

pub mod division;
pub mod regiment;

pub use division::{DivisionConfig, RegimentEntry, SupportPurchase};
pub use regiment::{CategorySelection, OptionalBlock, RegimentConfig};

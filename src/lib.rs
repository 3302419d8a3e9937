//! Muster - army list resolution and rule evaluation
//!
//! Turns a division being built (selections, purchases, assignments) plus a
//! static catalog into active units, army and upgrade point totals, derived
//! stats and an ordered list of problems.

pub mod catalog;
pub mod core;
pub mod engine;
pub mod roster;
pub mod rules;

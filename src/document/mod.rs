//! Wire-format boundary: raw serde schema plus property interpretation.

pub mod property;
pub mod schema;

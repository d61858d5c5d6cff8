//! Evaluated composition model and its builder from raw documents.

pub mod build;
pub mod model;

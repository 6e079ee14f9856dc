//! Reporting results back to the CI platform

pub mod actions;

pub use actions::{escape_data, ActionOutput, COVERAGE_OUTPUT};

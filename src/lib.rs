//! Status reduction for the real-estate sales pipeline: sheet rows in,
//! one current status per client, unique sales and funnel KPIs out.

pub mod alerts;
pub mod config;
pub mod crm;
pub mod domain;
pub mod errors;
pub mod normalize;
pub mod pipeline;
pub mod planning;
pub mod portfolio;
pub mod sources;
pub mod spreadsheets;

pub use errors::{PipelineError, Result};
pub use pipeline::{run, PipelineReport, PipelineSettings};

#[cfg(test)]
mod tests;

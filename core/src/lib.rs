//! Coverage-analytics core for the Rust multibeam assessment platform.
//!
//! The modules mirror the legacy swath coverage plotter pipeline while
//! providing typed records, explicit configuration, and well-defined
//! processing stages.

pub mod math;
pub mod prelude;
pub mod processing;
pub mod sonar_interface;
pub mod telemetry;

pub use prelude::{AnalysisConfig, PipelineError, PipelineResult};

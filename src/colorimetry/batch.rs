//! Batch orchestration module
//!
//! Drives the per-image Sampler → Model → Classifier chain over dye-labeled
//! image collections, and runs calibration sweeps over known-concentration
//! image sets.

mod calibration_run;
mod cancel;
mod config;
mod discovery;
mod orchestrator;
pub mod types;


pub use cancel::CancellationFlag;
pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use discovery::{
    DyeCollection, DyeDiscovery, IMAGE_EXTENSIONS, discover_dye_collections, list_images,
    parse_concentration,
};
pub use orchestrator::BatchOrchestrator;
pub use types::{
    BatchReport, CalibrationReport, CalibrationSample, ConcentrationResult, DyeDataset,
    DyeRunSummary, ImageFailure, ReportedConcentration,
};

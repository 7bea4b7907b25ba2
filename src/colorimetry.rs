//! Colorimetric dye-array analysis
//!
//! This module turns sample images into dye concentration estimates: ROI
//! sampling, calibration-curve inversion, threshold classification and
//! per-dye batch aggregation, plus the calibration fitter that produces the
//! curves in the first place.

pub mod batch;
pub mod calibration;
pub mod classify;
pub mod common;
pub mod image;
pub mod output;
pub mod roi;

pub use common::{
    ColorimetryError,
    Result,
};

pub use image::{
    ImageCrateReader,
    RgbImageData,
    SampleReader,
};

pub use roi::{
    Channel,
    ChannelStatistics,
    RgbMeans,
    Roi,
    RoiSampler,
};

pub use calibration::{
    CalibrationFit,
    CalibrationRecord,
    CalibrationStore,
    ModelKind,
    Observation,
};

pub use classify::{
    Label,
    Thresholds,
};

pub use batch::{
    AnalysisConfig,
    BatchOrchestrator,
    BatchReport,
    CalibrationReport,
    DyeCollection,
    DyeDataset,
};

pub use output::{
    CsvTableWriter,
    ReportExporter,
};

//! Batch result types

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::colorimetry::calibration::{CalibrationFit, CalibrationRecord, ModelKind};
use crate::colorimetry::classify::{Label, Thresholds};
use crate::colorimetry::common::error::ColorimetryError;
use crate::colorimetry::roi::{Channel, ChannelStatistics, RgbMeans};

/// Concentration as reported in result tables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportedConcentration {
    Quantified(f64),
    /// Below the hit threshold (carried value, ppm); not quantified further
    BelowThreshold(f64),
}

impl ReportedConcentration {
    pub fn from_value(concentration: f64, thresholds: &Thresholds) -> Self {
        if concentration < thresholds.hit() {
            Self::BelowThreshold(thresholds.hit())
        } else {
            Self::Quantified(concentration)
        }
    }

    /// Value used for plot series; below-threshold samples sit at zero.
    pub fn plot_value(&self) -> f64 {
        match self {
            Self::Quantified(c) => *c,
            Self::BelowThreshold(_) => 0.0,
        }
    }
}

impl fmt::Display for ReportedConcentration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quantified(c) => write!(f, "{:.3}", c),
            Self::BelowThreshold(t) => write!(f, "< {} ppm", t),
        }
    }
}

/// Outcome of one successfully processed image.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationResult {
    pub filename: String,
    pub path: PathBuf,
    pub statistics: ChannelStatistics,
    /// Unrounded inverted concentration (ppm)
    pub concentration: f64,
    pub reported: ReportedConcentration,
    pub label: Label,
}

/// Ordered results for one dye and the record that produced them.
#[derive(Debug, Clone)]
pub struct DyeDataset {
    pub dye: String,
    pub record: Arc<CalibrationRecord>,
    pub results: Vec<ConcentrationResult>,
}

impl DyeDataset {
    pub fn new(dye: impl Into<String>, record: Arc<CalibrationRecord>) -> Self {
        Self {
            dye: dye.into(),
            record,
            results: Vec::new(),
        }
    }

    /// (selected-channel intensity, concentration) pairs for plotting.
    pub fn channel_series(&self) -> Vec<(f64, f64)> {
        self.results
            .iter()
            .map(|r| {
                (
                    r.statistics.intensity(self.record.channel),
                    r.reported.plot_value(),
                )
            })
            .collect()
    }

    pub fn count_label(&self, label: Label) -> usize {
        self.results.iter().filter(|r| r.label == label).count()
    }
}

/// An image that was skipped, and why.
#[derive(Debug)]
pub struct ImageFailure {
    pub filename: String,
    pub error: ColorimetryError,
}

impl ImageFailure {
    pub fn is_load_error(&self) -> bool {
        matches!(self.error, ColorimetryError::ImageLoadError { .. })
    }

    pub fn is_roi_error(&self) -> bool {
        matches!(self.error, ColorimetryError::RoiOutOfBoundsError { .. })
    }
}

/// Per-dye image accounting.
#[derive(Debug, Default)]
pub struct DyeRunSummary {
    pub discovered: usize,
    pub processed: usize,
    pub failures: Vec<ImageFailure>,
    /// Images never started because the run was cancelled or timed out
    pub not_dispatched: usize,
}

impl DyeRunSummary {
    pub fn skipped(&self) -> usize {
        self.failures.len() + self.not_dispatched
    }

    pub fn load_errors(&self) -> usize {
        self.failures.iter().filter(|f| f.is_load_error()).count()
    }

    pub fn roi_errors(&self) -> usize {
        self.failures.iter().filter(|f| f.is_roi_error()).count()
    }
}

/// Everything a batch analysis run produced.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub datasets: BTreeMap<String, DyeDataset>,
    pub summaries: BTreeMap<String, DyeRunSummary>,
    /// Dyes aborted by a configuration error, with that error
    pub skipped_dyes: BTreeMap<String, ColorimetryError>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn dyes_processed(&self) -> usize {
        self.datasets.len()
    }

    pub fn images_skipped(&self) -> usize {
        self.summaries.values().map(DyeRunSummary::skipped).sum()
    }
}

/// One sampled calibration image.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSample {
    pub filename: String,
    pub concentration: f64,
    pub statistics: ChannelStatistics,
    /// Per-channel absorbance (R, G, B) against the background or full scale
    pub absorbance: RgbMeans,
}

/// Result of a calibration sweep for one dye.
#[derive(Debug)]
pub struct CalibrationReport {
    pub dye: String,
    pub model: ModelKind,
    /// Fit whose record is used for analysis
    pub selected: CalibrationFit,
    /// Fits of every channel that could be fitted, in R, G, B order
    pub fits: Vec<CalibrationFit>,
    /// Samples in ascending concentration order
    pub samples: Vec<CalibrationSample>,
    pub failures: Vec<ImageFailure>,
}

impl CalibrationReport {
    /// (concentration, fitted intensity) on `channel`.
    pub fn intensity_series(&self, channel: Channel) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .map(|s| (s.concentration, s.statistics.intensity(channel)))
            .collect()
    }

    /// (concentration, absorbance) on `channel`.
    pub fn absorbance_series(&self, channel: Channel) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .map(|s| (s.concentration, s.absorbance.channel(channel)))
            .collect()
    }
}

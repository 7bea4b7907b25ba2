//! Analysis run configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::colorimetry::classify::Thresholds;
use crate::colorimetry::roi::Roi;

/// Target ROI of the reference imaging rig.
const DEFAULT_TARGET_ROI: Roi = Roi {
    x: 922,
    y: 616,
    width: 50,
    height: 50,
};

/// Configuration shared by analysis and calibration runs
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Region sampled for the dye signal
    pub target_roi: Roi,
    /// Region subtracted from the target; calibration also uses it as the
    /// absorbance reference
    pub background_roi: Option<Roi>,
    pub thresholds: Thresholds,
    /// Whether to compute L*a*b* statistics during analysis
    pub compute_lab: bool,
    /// Directory for ROI-annotated TIFF copies of each processed image
    pub annotate_dir: Option<PathBuf>,
    /// Stop dispatching new images once this much time has elapsed
    pub timeout: Option<Duration>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_roi: DEFAULT_TARGET_ROI,
            background_roi: None,
            thresholds: Thresholds::default(),
            compute_lab: false,
            annotate_dir: None,
            timeout: None,
        }
    }
}

impl AnalysisConfig {
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }
}

/// Builder for AnalysisConfig
#[derive(Default)]
pub struct AnalysisConfigBuilder {
    target_roi: Option<Roi>,
    background_roi: Option<Option<Roi>>,
    thresholds: Option<Thresholds>,
    compute_lab: Option<bool>,
    annotate_dir: Option<Option<PathBuf>>,
    timeout: Option<Option<Duration>>,
}

impl AnalysisConfigBuilder {
    pub fn target_roi(mut self, roi: Roi) -> Self {
        self.target_roi = Some(roi);
        self
    }

    pub fn background_roi(mut self, roi: Option<Roi>) -> Self {
        self.background_roi = Some(roi);
        self
    }

    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn compute_lab(mut self, enable: bool) -> Self {
        self.compute_lab = Some(enable);
        self
    }

    pub fn annotate_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.annotate_dir = Some(dir);
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> AnalysisConfig {
        let default = AnalysisConfig::default();
        AnalysisConfig {
            target_roi: self.target_roi.unwrap_or(default.target_roi),
            background_roi: self.background_roi.unwrap_or(default.background_roi),
            thresholds: self.thresholds.unwrap_or(default.thresholds),
            compute_lab: self.compute_lab.unwrap_or(default.compute_lab),
            annotate_dir: self.annotate_dir.unwrap_or(default.annotate_dir),
            timeout: self.timeout.unwrap_or(default.timeout),
        }
    }
}

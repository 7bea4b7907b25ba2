use thiserror::Error;

#[derive(Error, Debug)]
pub enum ColorimetryError {
    #[error("Failed to load image {path}: {reason}")]
    ImageLoadError { path: String, reason: String },

    #[error("ROI {roi} exceeds image bounds {width}x{height}")]
    RoiOutOfBoundsError {
        roi: String,
        width: usize,
        height: usize,
    },

    #[error("Invalid ROI: {0}")]
    InvalidRoi(String),

    #[error("Calibration model error for {dye}: {reason}")]
    CalibrationModelError { dye: String, reason: String },

    #[error("Insufficient calibration data: {distinct} distinct concentration(s), at least 2 required")]
    InsufficientDataError { distinct: usize },

    #[error("Invalid threshold: {0}")]
    ThresholdError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to write output: {0}")]
    OutputWriteError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ColorimetryError {
    pub fn calibration(dye: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CalibrationModelError {
            dye: dye.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ColorimetryError>;

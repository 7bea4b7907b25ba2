use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::colorimetry::common::error::{ColorimetryError, Result};
use crate::colorimetry::roi::Channel;

/// Functional form of a calibration curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// `intensity = intercept - slope * c`
    #[default]
    Linear,
    /// `intensity = intercept * exp(-slope * c)`
    Logarithmic,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Linear => f.write_str("linear"),
            ModelKind::Logarithmic => f.write_str("logarithmic"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = ColorimetryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" | "lin" => Ok(ModelKind::Linear),
            "logarithmic" | "log" => Ok(ModelKind::Logarithmic),
            other => Err(ColorimetryError::ConfigError(format!(
                "unknown model kind '{}', expected linear or logarithmic",
                other
            ))),
        }
    }
}

/// Fitted calibration parameters for one dye.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationRecord {
    pub dye: String,
    pub slope: f64,
    pub intercept: f64,
    pub channel: Channel,
    pub model: ModelKind,
}

impl CalibrationRecord {
    /// Builds a record and validates it for inversion.
    pub fn new(
        dye: impl Into<String>,
        slope: f64,
        intercept: f64,
        channel: Channel,
        model: ModelKind,
    ) -> Result<Self> {
        let record = Self {
            dye: dye.into(),
            slope,
            intercept,
            channel,
            model,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.slope.is_finite() || !self.intercept.is_finite() {
            return Err(ColorimetryError::calibration(
                &self.dye,
                format!(
                    "slope and intercept must be finite (slope={}, intercept={})",
                    self.slope, self.intercept
                ),
            ));
        }
        if self.slope == 0.0 {
            return Err(ColorimetryError::calibration(
                &self.dye,
                "slope is zero, inversion is undefined",
            ));
        }
        if self.model == ModelKind::Logarithmic && self.intercept <= 0.0 {
            return Err(ColorimetryError::calibration(
                &self.dye,
                format!(
                    "logarithmic model requires a positive intercept, got {}",
                    self.intercept
                ),
            ));
        }
        Ok(())
    }

    /// Forward model: expected intensity at concentration `c`.
    pub fn predict(&self, concentration: f64) -> f64 {
        match self.model {
            ModelKind::Linear => self.intercept - self.slope * concentration,
            ModelKind::Logarithmic => self.intercept * (-self.slope * concentration).exp(),
        }
    }
}

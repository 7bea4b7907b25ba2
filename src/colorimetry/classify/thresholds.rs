use crate::colorimetry::common::error::{ColorimetryError, Result};

/// Hit threshold used when none is configured, in ppm.
pub const DEFAULT_HIT_THRESHOLD: f64 = 1.0;

/// Classification thresholds in ppm.
///
/// `hit` is always present. `moderate` is an explicit, optional upper bound
/// for the moderate-fade band; without it only `Hit` and `None` are produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    hit: f64,
    moderate: Option<f64>,
}

impl Thresholds {
    pub fn new(hit: f64, moderate: Option<f64>) -> Result<Self> {
        if !hit.is_finite() || hit < 0.0 {
            return Err(ColorimetryError::ThresholdError(format!(
                "hit threshold must be a finite, non-negative ppm value, got {}",
                hit
            )));
        }
        if let Some(moderate) = moderate {
            if !moderate.is_finite() || moderate <= hit {
                return Err(ColorimetryError::ThresholdError(format!(
                    "moderate threshold must be finite and greater than the hit threshold ({}), got {}",
                    hit, moderate
                )));
            }
        }
        Ok(Self { hit, moderate })
    }

    pub fn hit_only(hit: f64) -> Result<Self> {
        Self::new(hit, None)
    }

    pub fn hit(&self) -> f64 {
        self.hit
    }

    pub fn moderate(&self) -> Option<f64> {
        self.moderate
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            hit: DEFAULT_HIT_THRESHOLD,
            moderate: None,
        }
    }
}

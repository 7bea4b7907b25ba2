use crate::colorimetry::calibration::record::{CalibrationRecord, ModelKind};
use crate::colorimetry::common::error::{ColorimetryError, Result};
use crate::colorimetry::roi::ChannelStatistics;

/// Converts a measured intensity into a concentration (ppm).
pub fn invert(intensity: f64, record: &CalibrationRecord) -> Result<f64> {
    if record.slope == 0.0 {
        return Err(ColorimetryError::calibration(
            &record.dye,
            "slope is zero, inversion is undefined",
        ));
    }

    match record.model {
        ModelKind::Linear => Ok((record.intercept - intensity) / record.slope),
        ModelKind::Logarithmic => {
            if intensity <= 0.0 || record.intercept <= 0.0 {
                return Err(ColorimetryError::calibration(
                    &record.dye,
                    format!(
                        "logarithmic inversion needs intensity > 0 and intercept > 0 (intensity={}, intercept={})",
                        intensity, record.intercept
                    ),
                ));
            }
            Ok(-(intensity / record.intercept).ln() / record.slope)
        }
    }
}

/// Inverts the record's selected channel of `stats`.
pub fn invert_statistics(stats: &ChannelStatistics, record: &CalibrationRecord) -> Result<f64> {
    invert(stats.intensity(record.channel), record)
}

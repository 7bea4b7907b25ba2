//! Least-squares calibration fitter.
//!
//! Fits the forward relationship between known concentration and measured
//! intensity, then re-expresses it in the parameterization used by
//! [`invert`](super::invert), so that inversion is the exact algebraic
//! inverse of the fitted curve.

use tracing::debug;

use crate::colorimetry::calibration::record::{CalibrationRecord, ModelKind};
use crate::colorimetry::common::error::{ColorimetryError, Result};
use crate::colorimetry::roi::{Channel, RgbMeans};

/// Full-scale 8-bit intensity; intensities are normalized by it before the
/// logarithmic transform.
pub const FULL_SCALE_INTENSITY: f64 = 255.0;

/// Offset keeping absorbance finite for zero intensities.
const ABSORBANCE_EPSILON: f64 = 1e-6;

/// One (known concentration, measured intensity) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub concentration: f64,
    pub intensity: f64,
}

impl Observation {
    pub fn new(concentration: f64, intensity: f64) -> Self {
        Self {
            concentration,
            intensity,
        }
    }
}

/// A fitted record plus its goodness-of-fit diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationFit {
    pub record: CalibrationRecord,
    /// Coefficient of determination of the forward fit, in the regressed space
    pub r_squared: f64,
    pub observations: usize,
}

/// `-log10(measured / reference)`, offset to stay finite at zero.
pub fn absorbance(measured: f64, reference: f64) -> f64 {
    ((reference + ABSORBANCE_EPSILON) / (measured + ABSORBANCE_EPSILON)).log10()
}

/// Fits a calibration curve for `dye` measured on `channel`.
pub fn fit(
    dye: &str,
    channel: Channel,
    observations: &[Observation],
    kind: ModelKind,
) -> Result<CalibrationFit> {
    if let Some(bad) = observations
        .iter()
        .find(|o| !o.concentration.is_finite() || !o.intensity.is_finite())
    {
        return Err(ColorimetryError::ConfigError(format!(
            "non-finite calibration observation for {}: {:?}",
            dye, bad
        )));
    }

    let distinct = distinct_concentrations(observations);
    if distinct < 2 {
        return Err(ColorimetryError::InsufficientDataError { distinct });
    }

    let xs: Vec<f64> = observations.iter().map(|o| o.concentration).collect();
    let (slope, intercept, r_squared) = match kind {
        ModelKind::Linear => {
            let ys: Vec<f64> = observations.iter().map(|o| o.intensity).collect();
            let line = least_squares(&xs, &ys);
            // I = a + b*c  ->  c = (a - I) / (-b)
            (-line.slope, line.intercept, line.r_squared)
        }
        ModelKind::Logarithmic => {
            if let Some(bad) = observations.iter().find(|o| o.intensity <= 0.0) {
                return Err(ColorimetryError::calibration(
                    dye,
                    format!(
                        "logarithmic fit needs positive intensities, got {} at {} ppm",
                        bad.intensity, bad.concentration
                    ),
                ));
            }
            let ys: Vec<f64> = observations
                .iter()
                .map(|o| (o.intensity / FULL_SCALE_INTENSITY).ln())
                .collect();
            let line = least_squares(&xs, &ys);
            // ln(I / I_norm) = a + b*c  ->  I = I_norm*e^a * exp(-(-b)*c)
            (
                -line.slope,
                FULL_SCALE_INTENSITY * line.intercept.exp(),
                line.r_squared,
            )
        }
    };

    let record = CalibrationRecord::new(dye, slope, intercept, channel, kind)?;
    debug!(
        dye,
        channel = %channel,
        model = %kind,
        slope,
        intercept,
        r_squared,
        "Fitted calibration curve"
    );

    Ok(CalibrationFit {
        record,
        r_squared,
        observations: observations.len(),
    })
}

/// Fits `channel` of sampled means taken at known concentrations.
pub fn fit_channel(
    dye: &str,
    channel: Channel,
    samples: &[(f64, RgbMeans)],
    kind: ModelKind,
) -> Result<CalibrationFit> {
    let observations: Vec<Observation> = samples
        .iter()
        .map(|(c, means)| Observation::new(*c, means.channel(channel)))
        .collect();
    fit(dye, channel, &observations, kind)
}

fn distinct_concentrations(observations: &[Observation]) -> usize {
    let mut values: Vec<f64> = observations.iter().map(|o| o.concentration).collect();
    values.sort_by(f64::total_cmp);
    values.dedup();
    values.len()
}

struct Line {
    slope: f64,
    intercept: f64,
    r_squared: f64,
}

/// Ordinary least squares of `ys` on `xs`. Requires at least two distinct xs.
fn least_squares(xs: &[f64], ys: &[f64]) -> Line {
    let n = xs.len() as f64;
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - x_mean;
        let dy = y - y_mean;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let ss_res: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| {
            let r = y - (intercept + slope * x);
            r * r
        })
        .sum();
    // a flat response is fully explained by a flat line
    let r_squared = if syy == 0.0 { 1.0 } else { 1.0 - ss_res / syy };

    Line {
        slope,
        intercept,
        r_squared,
    }
}

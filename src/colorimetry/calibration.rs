//! Calibration module
//!
//! Calibration records map a measured channel intensity to a dye
//! concentration. This module holds the record types, the inversion model,
//! the JSON-backed record store and the least-squares fitter that produces
//! records from known-concentration observations.

mod fitter;
mod model;
mod record;
mod store;

#[cfg(test)]
mod tests;

pub use fitter::{CalibrationFit, FULL_SCALE_INTENSITY, Observation, absorbance, fit, fit_channel};
pub use model::{invert, invert_statistics};
pub use record::{CalibrationRecord, ModelKind};
pub use store::CalibrationStore;

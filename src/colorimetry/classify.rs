//! Threshold classification module

mod classifier;
mod thresholds;

pub use classifier::{Label, classify};
pub use thresholds::{DEFAULT_HIT_THRESHOLD, Thresholds};

//! ROI sampling module
//!
//! Extracts per-channel mean intensities from rectangular regions of a decoded
//! image, with optional background correction and CIE Lab diagnostics.

mod lab;
mod sampler;
pub mod types;

#[cfg(test)]
mod tests;

pub use lab::mean_lab;
pub use sampler::{RoiSampler, extract};
pub use types::{Channel, ChannelStatistics, LabMeans, RgbMeans, Roi};

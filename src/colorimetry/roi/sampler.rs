use tracing::trace;

use crate::colorimetry::common::error::Result;
use crate::colorimetry::image::RgbImageData;
use crate::colorimetry::roi::lab::mean_lab;
use crate::colorimetry::roi::types::{ChannelStatistics, RgbMeans, Roi};

/// Arithmetic mean of each channel over `roi`.
pub fn extract(image: &RgbImageData, roi: &Roi) -> Result<RgbMeans> {
    roi.check_bounds(image.width, image.height)?;

    let mut sum = [0u64; 3];
    for y in roi.y..roi.y + roi.height {
        for px in image.row_segment(y, roi.x, roi.width).chunks_exact(3) {
            sum[0] += px[0] as u64;
            sum[1] += px[1] as u64;
            sum[2] += px[2] as u64;
        }
    }

    let n = roi.area() as f64;
    let means = RgbMeans::new(sum[0] as f64 / n, sum[1] as f64 / n, sum[2] as f64 / n);
    trace!(roi = %roi, r = means.r, g = means.g, b = means.b, "Sampled ROI");
    Ok(means)
}

/// Samples a target region, an optional background region and optional Lab
/// statistics from the same image.
#[derive(Debug, Clone)]
pub struct RoiSampler {
    target: Roi,
    background: Option<Roi>,
    compute_lab: bool,
}

impl RoiSampler {
    pub fn new(target: Roi, background: Option<Roi>) -> Self {
        Self {
            target,
            background,
            compute_lab: false,
        }
    }

    pub fn with_lab(mut self, enable: bool) -> Self {
        self.compute_lab = enable;
        self
    }

    pub fn target(&self) -> &Roi {
        &self.target
    }

    pub fn background(&self) -> Option<&Roi> {
        self.background.as_ref()
    }

    pub fn sample(&self, image: &RgbImageData) -> Result<ChannelStatistics> {
        let target = extract(image, &self.target)?;
        let background = self
            .background
            .as_ref()
            .map(|roi| extract(image, roi))
            .transpose()?;
        let lab = self.compute_lab.then(|| mean_lab(image, &self.target));

        Ok(ChannelStatistics {
            target,
            background,
            lab,
        })
    }
}

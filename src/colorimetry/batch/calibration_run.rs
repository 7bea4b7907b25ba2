use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::colorimetry::batch::discovery::parse_concentration;
use crate::colorimetry::batch::orchestrator::{BatchOrchestrator, ImageOutcome, file_name};
use crate::colorimetry::batch::types::{CalibrationReport, CalibrationSample, ImageFailure};
use crate::colorimetry::calibration::{
    CalibrationFit, FULL_SCALE_INTENSITY, ModelKind, absorbance, fit_channel,
};
use crate::colorimetry::common::error::{ColorimetryError, Result};
use crate::colorimetry::image::SampleReader;
use crate::colorimetry::roi::{Channel, ChannelStatistics, RgbMeans, RoiSampler};

fn sample_absorbance(statistics: &ChannelStatistics) -> RgbMeans {
    let reference = statistics
        .background
        .unwrap_or(RgbMeans::new(FULL_SCALE_INTENSITY, FULL_SCALE_INTENSITY, FULL_SCALE_INTENSITY));
    RgbMeans::new(
        absorbance(statistics.target.r, reference.r),
        absorbance(statistics.target.g, reference.g),
        absorbance(statistics.target.b, reference.b),
    )
}

impl<R: SampleReader + Sync> BatchOrchestrator<R> {
    fn sample_calibration_image(
        &self,
        path: &Path,
        concentration: f64,
        sampler: &RoiSampler,
    ) -> Result<CalibrationSample> {
        let image = self.load_image(path)?;
        let statistics = sampler.sample(&image)?;
        Ok(CalibrationSample {
            filename: file_name(path),
            concentration,
            absorbance: sample_absorbance(&statistics),
            statistics,
        })
    }

    /// Samples known-concentration images and fits a calibration curve.
    ///
    /// Concentrations come from the file names. Every channel is fitted on the
    /// same background-corrected intensity that analysis inverts; `channel`
    /// selects the record to keep, otherwise the channel with the highest R²
    /// wins. The background mean is also the absorbance reference.
    #[instrument(skip(self, images), fields(images = images.len()))]
    pub fn calibrate(
        &self,
        images: &[PathBuf],
        dye: &str,
        model: ModelKind,
        channel: Option<Channel>,
    ) -> Result<CalibrationReport> {
        info!("Starting calibration run");
        let deadline = self.deadline();
        let mut failures = Vec::new();

        let mut labelled: Vec<(f64, PathBuf)> = Vec::new();
        for path in images {
            match parse_concentration(path) {
                Some(c) => labelled.push((c, path.clone())),
                None => {
                    warn!(file = %path.display(), "No concentration in file name, skipping");
                    failures.push(ImageFailure {
                        filename: file_name(path),
                        error: ColorimetryError::ConfigError(
                            "file name does not encode a concentration".to_string(),
                        ),
                    });
                }
            }
        }
        labelled.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        let sampler = RoiSampler::new(self.config().target_roi, self.config().background_roi)
            .with_lab(true);
        let outcomes = self.dispatch(&labelled, deadline, |(concentration, path)| {
            self.sample_calibration_image(path, *concentration, &sampler)
        });

        let mut samples = Vec::new();
        let mut not_dispatched = 0;
        for outcome in outcomes {
            match outcome {
                ImageOutcome::Done(sample) => samples.push(sample),
                ImageOutcome::Failed(failure) => failures.push(failure),
                ImageOutcome::NotDispatched => not_dispatched += 1,
            }
        }
        if not_dispatched > 0 {
            warn!(not_dispatched, "Calibration run stopped before all images were sampled");
        }

        let means: Vec<(f64, RgbMeans)> = samples
            .iter()
            .map(|s| (s.concentration, s.statistics.corrected()))
            .collect();

        let mut fits: Vec<CalibrationFit> = Vec::new();
        let mut first_error = None;
        for candidate in Channel::ALL {
            match fit_channel(dye, candidate, &means, model) {
                Ok(fit) => fits.push(fit),
                Err(e) => {
                    warn!(channel = %candidate, error = %e, "Channel could not be fitted");
                    if channel == Some(candidate) || first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        let selected = match channel {
            Some(wanted) => fits.iter().find(|f| f.record.channel == wanted).cloned(),
            None => fits
                .iter()
                .max_by(|a, b| a.r_squared.total_cmp(&b.r_squared))
                .cloned(),
        };
        let Some(selected) = selected else {
            return Err(first_error.unwrap_or(ColorimetryError::InsufficientDataError {
                distinct: 0,
            }));
        };

        info!(
            dye,
            channel = %selected.record.channel,
            slope = selected.record.slope,
            intercept = selected.record.intercept,
            r_squared = selected.r_squared,
            samples = samples.len(),
            "Calibration complete"
        );

        Ok(CalibrationReport {
            dye: dye.to_string(),
            model,
            selected,
            fits,
            samples,
            failures,
        })
    }
}

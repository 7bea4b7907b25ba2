use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, error, info, instrument, warn};

use crate::colorimetry::batch::cancel::CancellationFlag;
use crate::colorimetry::batch::config::AnalysisConfig;
use crate::colorimetry::batch::discovery::DyeCollection;
use crate::colorimetry::batch::types::{
    BatchReport, ConcentrationResult, DyeDataset, DyeRunSummary, ImageFailure,
    ReportedConcentration,
};
use crate::colorimetry::calibration::{CalibrationRecord, CalibrationStore, invert_statistics};
use crate::colorimetry::classify::classify;
use crate::colorimetry::common::error::{ColorimetryError, Result};
use crate::colorimetry::image::{ImageCrateReader, RgbImageData, SampleReader};
use crate::colorimetry::output::{TiffAnnotationWriter, draw_rois};
use crate::colorimetry::roi::RoiSampler;

pub(crate) enum ImageOutcome<T> {
    Done(T),
    Failed(ImageFailure),
    NotDispatched,
}

pub struct BatchOrchestrator<R: SampleReader> {
    reader: R,
    config: AnalysisConfig,
    cancel: CancellationFlag,
}

impl BatchOrchestrator<ImageCrateReader> {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            reader: ImageCrateReader,
            config,
            cancel: CancellationFlag::new(),
        }
    }
}

/// Anything dispatched to the worker pool that is backed by one image file.
pub(crate) trait ImageItem: Sync {
    fn image_path(&self) -> &Path;
}

impl ImageItem for PathBuf {
    fn image_path(&self) -> &Path {
        self
    }
}

impl ImageItem for (f64, PathBuf) {
    fn image_path(&self) -> &Path {
        &self.1
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl<R: SampleReader + Sync> BatchOrchestrator<R> {
    pub fn with_custom(reader: R, config: AnalysisConfig) -> Self {
        Self {
            reader,
            config,
            cancel: CancellationFlag::new(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AnalysisConfig) {
        self.config = config;
    }

    /// Flag that stops this orchestrator from dispatching further images.
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub(crate) fn should_stop(&self, deadline: Option<Instant>) -> bool {
        self.cancel.is_cancelled() || deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Deadline for a whole run, measured from the moment it is taken.
    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.config.timeout.map(|t| Instant::now() + t)
    }

    /// Reads and decodes one image file.
    pub(crate) fn load_image(&self, path: &Path) -> Result<RgbImageData> {
        let load_error = |reason: String| ColorimetryError::ImageLoadError {
            path: path.display().to_string(),
            reason,
        };

        let bytes = {
            let _span = tracing::debug_span!("read_input_file").entered();
            std::fs::read(path).map_err(|e| load_error(e.to_string()))?
        };

        let _span = tracing::debug_span!("decode_image", size = bytes.len()).entered();
        self.reader.read_image(&bytes).map_err(|e| match e {
            ColorimetryError::ImageLoadError { reason, .. } => load_error(reason),
            other => other,
        })
    }

    /// Runs `work` over `items` on the rayon pool. Each worker folds into its
    /// own buffer; buffers are joined once and put back in input order.
    /// Nothing new is started once `deadline` has passed.
    pub(crate) fn dispatch<I, T, F>(
        &self,
        items: &[I],
        deadline: Option<Instant>,
        work: F,
    ) -> Vec<ImageOutcome<T>>
    where
        I: ImageItem,
        T: Send,
        F: Fn(&I) -> Result<T> + Sync,
    {
        let mut outcomes: Vec<(usize, ImageOutcome<T>)> = items
            .par_iter()
            .enumerate()
            .fold(Vec::new, |mut buffer, (index, item)| {
                let path = item.image_path();
                let outcome = if self.should_stop(deadline) {
                    ImageOutcome::NotDispatched
                } else {
                    match work(item) {
                        Ok(value) => ImageOutcome::Done(value),
                        Err(error) => {
                            warn!(file = %path.display(), error = %error, "Skipping image");
                            ImageOutcome::Failed(ImageFailure {
                                filename: file_name(path),
                                error,
                            })
                        }
                    }
                };
                buffer.push((index, outcome));
                buffer
            })
            .reduce(Vec::new, |mut a, mut b| {
                a.append(&mut b);
                a
            });

        outcomes.sort_by_key(|(index, _)| *index);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }

    fn write_annotation(&self, path: &Path, dye: &str, image: &RgbImageData) {
        let Some(dir) = &self.config.annotate_dir else {
            return;
        };

        let _span = tracing::debug_span!("annotate_image").entered();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let out_dir = dir.join(dye);
        let out_path = out_dir.join(format!("roi_{}.tiff", stem));

        let annotated = draw_rois(
            image,
            &self.config.target_roi,
            self.config.background_roi.as_ref(),
        );
        let written = std::fs::create_dir_all(&out_dir)
            .map_err(ColorimetryError::from)
            .and_then(|_| Ok(std::fs::File::create(&out_path)?))
            .and_then(|mut file| TiffAnnotationWriter.write_rgb_tiff(&annotated, &mut file));

        if let Err(e) = written {
            warn!(file = %out_path.display(), error = %e, "Failed to write annotated image");
        }
    }

    /// Load → sample → invert → classify for one image.
    #[instrument(name = "sample_image", skip(self, path, sampler, record), fields(file = %file_name(path)))]
    pub(crate) fn process_image(
        &self,
        path: &Path,
        sampler: &RoiSampler,
        record: &CalibrationRecord,
    ) -> Result<ConcentrationResult> {
        let image = self.load_image(path)?;
        let statistics = sampler.sample(&image)?;
        let concentration = invert_statistics(&statistics, record)?;
        let thresholds = &self.config.thresholds;
        let label = classify(concentration, thresholds);

        debug!(
            intensity = statistics.intensity(record.channel),
            concentration,
            label = %label,
            "Sample processed"
        );

        self.write_annotation(path, &record.dye, &image);

        Ok(ConcentrationResult {
            filename: file_name(path),
            path: path.to_path_buf(),
            statistics,
            concentration,
            reported: ReportedConcentration::from_value(concentration, thresholds),
            label,
        })
    }

    #[instrument(name = "process_dye", skip(self, collection, store, deadline), fields(dye = %collection.dye, images = collection.images.len()))]
    fn run_dye(
        &self,
        collection: &DyeCollection,
        store: &CalibrationStore,
        deadline: Option<Instant>,
    ) -> Result<(DyeDataset, DyeRunSummary)> {
        let record = store.record(&collection.dye)?;
        let sampler = RoiSampler::new(self.config.target_roi, self.config.background_roi)
            .with_lab(self.config.compute_lab);

        let mut dataset = DyeDataset::new(collection.dye.clone(), record.clone());
        let mut summary = DyeRunSummary {
            discovered: collection.images.len(),
            ..Default::default()
        };

        let outcomes = self.dispatch(&collection.images, deadline, |path| {
            self.process_image(path, &sampler, &record)
        });

        for outcome in outcomes {
            match outcome {
                ImageOutcome::Done(result) => dataset.results.push(result),
                ImageOutcome::Failed(failure) => summary.failures.push(failure),
                ImageOutcome::NotDispatched => summary.not_dispatched += 1,
            }
        }
        summary.processed = dataset.results.len();

        info!(
            processed = summary.processed,
            skipped = summary.failures.len(),
            not_dispatched = summary.not_dispatched,
            "Dye complete"
        );
        Ok((dataset, summary))
    }

    /// Analyzes every collection. Per-image and per-dye failures are recorded
    /// in the report; the run itself never fails.
    #[instrument(skip(self, collections, store), fields(dyes = collections.len()))]
    pub fn run(&self, collections: &[DyeCollection], store: &CalibrationStore) -> BatchReport {
        info!("Starting batch analysis");
        let mut report = BatchReport::default();
        let deadline = self.deadline();

        for collection in collections {
            match self.run_dye(collection, store, deadline) {
                Ok((dataset, summary)) => {
                    report.cancelled |= summary.not_dispatched > 0;
                    report.summaries.insert(collection.dye.clone(), summary);
                    report.datasets.insert(collection.dye.clone(), dataset);
                }
                Err(e) => {
                    error!(dye = %collection.dye, error = %e, "Skipping dye");
                    report.skipped_dyes.insert(collection.dye.clone(), e);
                }
            }
        }

        info!(
            dyes_processed = report.dyes_processed(),
            dyes_skipped = report.skipped_dyes.len(),
            images_skipped = report.images_skipped(),
            cancelled = report.cancelled,
            "Batch analysis complete"
        );
        report
    }
}

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use dye_colorimetry_rs::colorimetry::batch::{discover_dye_collections, list_images};
use dye_colorimetry_rs::colorimetry::{
    AnalysisConfig, BatchOrchestrator, CalibrationStore, Channel, ModelKind, ReportExporter, Roi,
    Thresholds,
};
use dye_colorimetry_rs::logger::{self, error, info, warn};

#[derive(Parser)]
#[command(name = "dye-colorimetry")]
#[command(version, about = "Colorimetric dye-array calibration and analysis", long_about = None)]
struct Cli {
    /// Default log level when RUST_LOG is not set
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Number of worker threads (defaults to one per core)
    #[arg(short = 'j', long, global = true, value_name = "N")]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a calibration curve from images named by known concentration
    Calibrate {
        /// Folder of calibration images (e.g. 0.jpg, 2.5.jpg, 10.jpg)
        #[arg(long, value_name = "DIR")]
        image_folder: PathBuf,

        /// Folder for calibration_data.csv and calibration_fit.csv
        #[arg(long, value_name = "DIR")]
        output_folder: PathBuf,

        /// Target ROI (x,y,width,height)
        #[arg(long, value_name = "X,Y,W,H")]
        target_roi: Roi,

        /// Background ROI subtracted from the target and used as absorbance reference (x,y,width,height)
        #[arg(long, value_name = "X,Y,W,H")]
        background_roi: Option<Roi>,

        /// Dye identifier (defaults to the image folder name)
        #[arg(long)]
        dye: Option<String>,

        /// Calibration model: linear or logarithmic
        #[arg(long, value_name = "KIND", default_value = "linear")]
        model: ModelKind,

        /// Channel to keep (R, G or B); best R² when omitted
        #[arg(long, value_name = "CHANNEL")]
        channel: Option<Channel>,

        /// Calibration JSON to add the fitted record to (created if missing)
        #[arg(long, value_name = "FILE")]
        calibration_json: Option<PathBuf>,
    },

    /// Compute concentrations and classify sample images per dye
    Analyze {
        /// Folder with one sub-folder of sample images per dye
        #[arg(long, value_name = "DIR")]
        data_folder: PathBuf,

        /// Calibration constants JSON
        #[arg(long, value_name = "FILE")]
        calibration_json: PathBuf,

        /// Target ROI (x,y,width,height)
        #[arg(long, value_name = "X,Y,W,H")]
        roi: Roi,

        /// Background ROI subtracted from the target (x,y,width,height)
        #[arg(long, value_name = "X,Y,W,H")]
        background_roi: Option<Roi>,

        /// Concentrations strictly below this are hits (ppm)
        #[arg(long, value_name = "PPM", default_value = "1.0")]
        hit_threshold: f64,

        /// Upper bound of the moderate-fade band (ppm); must exceed the hit threshold
        #[arg(long, value_name = "PPM")]
        moderate_threshold: Option<f64>,

        /// Folder for per-dye result tables
        #[arg(long, value_name = "DIR")]
        output_folder: PathBuf,

        /// Write ROI-annotated TIFF copies under <output-folder>/annotated
        #[arg(long)]
        annotate: bool,

        /// Include L*a*b* statistics in the result tables
        #[arg(long)]
        lab: bool,

        /// Stop dispatching new images after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(&cli.log_level);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    match cli.command {
        Commands::Calibrate {
            image_folder,
            output_folder,
            target_roi,
            background_roi,
            dye,
            model,
            channel,
            calibration_json,
        } => {
            let dye = match dye {
                Some(dye) => dye,
                None => image_folder
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .context("Cannot derive a dye name from the image folder, pass --dye")?,
            };

            let images = list_images(&image_folder)?;
            if images.is_empty() {
                bail!("No images found in {}", image_folder.display());
            }

            let config = AnalysisConfig::builder()
                .target_roi(target_roi)
                .background_roi(background_roi)
                .build();
            let orchestrator = BatchOrchestrator::new(config);
            let report = orchestrator
                .calibrate(&images, &dye, model, channel)
                .with_context(|| format!("Calibration of {} failed", dye))?;

            ReportExporter::new(&output_folder).export_calibration(&report)?;

            let record = &report.selected.record;
            info!(
                "{}: slope={:.4} intercept={:.4} channel={} model={} R²={:.4}",
                dye, record.slope, record.intercept, record.channel, record.model, report.selected.r_squared
            );

            if let Some(path) = calibration_json {
                let mut store = if path.exists() {
                    CalibrationStore::from_json_file(&path)?
                } else {
                    CalibrationStore::default()
                };
                store.insert(record.clone())?;
                std::fs::write(&path, store.to_json_string()?)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Calibration record saved to {}", path.display());
            }
        }

        Commands::Analyze {
            data_folder,
            calibration_json,
            roi,
            background_roi,
            hit_threshold,
            moderate_threshold,
            output_folder,
            annotate,
            lab,
            timeout,
        } => {
            let thresholds = Thresholds::new(hit_threshold, moderate_threshold)?;
            let store = CalibrationStore::from_json_file(&calibration_json)?;
            let discovery = discover_dye_collections(&data_folder)?;
            if discovery.is_empty() {
                bail!("No dye folders found in {}", data_folder.display());
            }

            let config = AnalysisConfig::builder()
                .target_roi(roi)
                .background_roi(background_roi)
                .thresholds(thresholds)
                .compute_lab(lab)
                .annotate_dir(annotate.then(|| output_folder.join("annotated")))
                .timeout(timeout.map(Duration::from_secs))
                .build();

            let orchestrator = BatchOrchestrator::new(config);
            let mut report = orchestrator.run(&discovery.collections, &store);
            report.skipped_dyes.extend(discovery.unreadable);
            ReportExporter::new(&output_folder).export_batch(&report)?;

            for (dye, summary) in &report.summaries {
                info!(
                    "{}: {} processed, {} skipped ({} unreadable, {} ROI out of bounds)",
                    dye,
                    summary.processed,
                    summary.skipped(),
                    summary.load_errors(),
                    summary.roi_errors()
                );
            }
            for (dye, e) in &report.skipped_dyes {
                error!("{}: not analyzed: {}", dye, e);
            }
            if report.cancelled {
                warn!("Run stopped early; some images were not processed");
            }
        }
    }

    Ok(())
}

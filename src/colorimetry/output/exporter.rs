use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::colorimetry::batch::{BatchReport, CalibrationReport};
use crate::colorimetry::common::error::{ColorimetryError, Result};
use crate::colorimetry::output::csv_writer::CsvTableWriter;
use crate::colorimetry::output::writer::TableWriter;

/// Writes run reports into an output directory.
pub struct ReportExporter<W: TableWriter> {
    writer: W,
    output_dir: PathBuf,
}

impl ReportExporter<CsvTableWriter> {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            writer: CsvTableWriter,
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }
}

impl<W: TableWriter> ReportExporter<W> {
    pub fn with_custom<P: AsRef<Path>>(writer: W, output_dir: P) -> Self {
        Self {
            writer,
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write_file<F>(&self, name: &str, write: F) -> Result<PathBuf>
    where
        F: FnOnce(&mut dyn Write) -> Result<()>,
    {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            ColorimetryError::OutputWriteError(format!("{}: {}", self.output_dir.display(), e))
        })?;

        let path = self.output_dir.join(name);
        let file = File::create(&path).map_err(|e| {
            ColorimetryError::OutputWriteError(format!("{}: {}", path.display(), e))
        })?;
        let mut out = BufWriter::new(file);
        write(&mut out)?;
        out.flush()?;
        Ok(path)
    }

    /// Writes `<dye>_results.csv` and `<dye>_series.csv` for every dataset.
    #[instrument(skip(self, report), fields(dyes = report.datasets.len()))]
    pub fn export_batch(&self, report: &BatchReport) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for (dye, dataset) in &report.datasets {
            written.push(self.write_file(&format!("{}_results.csv", dye), |out| {
                self.writer.write_dataset(dataset, out)
            })?);
            written.push(self.write_file(&format!("{}_series.csv", dye), |out| {
                self.writer.write_series(dataset, out)
            })?);
            info!(dye = %dye, rows = dataset.results.len(), "Results written");
        }
        Ok(written)
    }

    /// Writes `calibration_data.csv` and `calibration_fit.csv`.
    #[instrument(skip(self, report), fields(dye = %report.dye))]
    pub fn export_calibration(&self, report: &CalibrationReport) -> Result<Vec<PathBuf>> {
        let data = self.write_file("calibration_data.csv", |out| {
            self.writer.write_calibration_data(report, out)
        })?;
        let fits = self.write_file("calibration_fit.csv", |out| {
            self.writer.write_calibration_fits(report, out)
        })?;
        info!(samples = report.samples.len(), "Calibration diagnostics written");
        Ok(vec![data, fits])
    }
}

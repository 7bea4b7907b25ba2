use std::io::Write;

use tracing::debug;

use crate::colorimetry::batch::{CalibrationReport, DyeDataset};
use crate::colorimetry::common::error::Result;
use crate::colorimetry::output::writer::TableWriter;
use crate::colorimetry::roi::{LabMeans, RgbMeans};

/// Writes result tables as comma-separated values with a header row.
pub struct CsvTableWriter;

/// Quotes a field when it contains a separator, quote or line break.
fn field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn rgb_fields(means: Option<&RgbMeans>) -> String {
    match means {
        Some(m) => format!("{:.4},{:.4},{:.4}", m.r, m.g, m.b),
        None => ",,".to_string(),
    }
}

fn lab_fields(lab: Option<&LabMeans>) -> String {
    match lab {
        Some(m) => format!("{:.4},{:.4},{:.4}", m.l, m.a, m.b),
        None => ",,".to_string(),
    }
}

impl TableWriter for CsvTableWriter {
    fn write_dataset(&self, dataset: &DyeDataset, output: &mut dyn Write) -> Result<()> {
        debug!(dye = %dataset.dye, rows = dataset.results.len(), "Writing result table");

        let with_lab = dataset.results.iter().any(|r| r.statistics.lab.is_some());
        write!(output, "Filename,R,G,B,Concentration,Label")?;
        if with_lab {
            write!(output, ",L*,a*,b*")?;
        }
        writeln!(output)?;

        for result in &dataset.results {
            write!(
                output,
                "{},{},{},{}",
                field(&result.filename),
                rgb_fields(Some(&result.statistics.target)),
                field(&result.reported.to_string()),
                result.label
            )?;
            if with_lab {
                write!(output, ",{}", lab_fields(result.statistics.lab.as_ref()))?;
            }
            writeln!(output)?;
        }
        Ok(())
    }

    fn write_series(&self, dataset: &DyeDataset, output: &mut dyn Write) -> Result<()> {
        writeln!(output, "{}_Intensity,Concentration", dataset.record.channel)?;
        for (intensity, concentration) in dataset.channel_series() {
            writeln!(output, "{:.4},{:.4}", intensity, concentration)?;
        }
        Ok(())
    }

    fn write_calibration_data(&self, report: &CalibrationReport, output: &mut dyn Write) -> Result<()> {
        writeln!(
            output,
            "Filename,Concentration,R,G,B,Bg_R,Bg_G,Bg_B,L*,a*,b*,Abs_R,Abs_G,Abs_B"
        )?;
        for sample in &report.samples {
            writeln!(
                output,
                "{},{},{},{},{},{:.6},{:.6},{:.6}",
                field(&sample.filename),
                sample.concentration,
                rgb_fields(Some(&sample.statistics.target)),
                rgb_fields(sample.statistics.background.as_ref()),
                lab_fields(sample.statistics.lab.as_ref()),
                sample.absorbance.r,
                sample.absorbance.g,
                sample.absorbance.b
            )?;
        }
        Ok(())
    }

    fn write_calibration_fits(&self, report: &CalibrationReport, output: &mut dyn Write) -> Result<()> {
        writeln!(output, "Dye,Channel,Model,Slope,Intercept,R2,Observations,Selected")?;
        for fit in &report.fits {
            let record = &fit.record;
            writeln!(
                output,
                "{},{},{},{:.6},{:.6},{:.6},{},{}",
                field(&report.dye),
                record.channel,
                record.model,
                record.slope,
                record.intercept,
                fit.r_squared,
                fit.observations,
                record.channel == report.selected.record.channel
            )?;
        }
        Ok(())
    }
}

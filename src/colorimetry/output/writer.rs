use std::io::Write;

use crate::colorimetry::batch::{CalibrationReport, DyeDataset};
use crate::colorimetry::common::error::Result;

pub trait TableWriter {
    fn write_dataset(&self, dataset: &DyeDataset, output: &mut dyn Write) -> Result<()>;
    fn write_series(&self, dataset: &DyeDataset, output: &mut dyn Write) -> Result<()>;
    fn write_calibration_data(&self, report: &CalibrationReport, output: &mut dyn Write) -> Result<()>;
    fn write_calibration_fits(&self, report: &CalibrationReport, output: &mut dyn Write) -> Result<()>;
}

//! Output module
//!
//! Result tables, calibration diagnostics, plot series and ROI-annotated
//! images written to disk.

mod annotate;
mod csv_writer;
mod exporter;
mod writer;

pub use annotate::{BACKGROUND_COLOR, TARGET_COLOR, TiffAnnotationWriter, draw_rois};
pub use csv_writer::CsvTableWriter;
pub use exporter::ReportExporter;
pub use writer::TableWriter;

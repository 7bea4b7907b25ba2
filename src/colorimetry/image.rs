//! Image decoding module
//!
//! This module provides format-agnostic decoding of sample images into
//! interleaved 8-bit RGB buffers.

mod reader;
mod image_crate_reader;
pub mod types;

pub use reader::SampleReader;
pub use image_crate_reader::ImageCrateReader;
pub use types::RgbImageData;

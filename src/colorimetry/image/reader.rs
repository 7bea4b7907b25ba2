use crate::colorimetry::common::error::Result;
use crate::colorimetry::image::types::RgbImageData;

pub trait SampleReader {
    fn read_image(&self, data: &[u8]) -> Result<RgbImageData>;
}

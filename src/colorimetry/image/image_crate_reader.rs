//! Sample image reader backed by the `image` crate.
//!
//! Handles JPEG, PNG, TIFF and BMP inputs. Every decoded image is converted to
//! 8-bit RGB so that channel statistics are comparable across formats.

use tracing::debug;

use crate::colorimetry::common::error::{ColorimetryError, Result};
use crate::colorimetry::image::reader::SampleReader;
use crate::colorimetry::image::types::RgbImageData;

/// Reader that decodes images with the `image` crate.
pub struct ImageCrateReader;

impl SampleReader for ImageCrateReader {
    /// Decodes an in-memory image file.
    ///
    /// # Returns
    ///
    /// * `Ok(RgbImageData)` - Decoded image as interleaved 8-bit RGB
    /// * `Err(ColorimetryError::ImageLoadError)` - The bytes are not a decodable image
    fn read_image(&self, data: &[u8]) -> Result<RgbImageData> {
        debug!("Decoding image, {} bytes", data.len());

        let decoded = ::image::load_from_memory(data).map_err(|e| ColorimetryError::ImageLoadError {
            path: "<memory>".to_string(),
            reason: e.to_string(),
        })?;

        // 16-bit and alpha inputs are narrowed here
        let rgb = decoded.into_rgb8();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);

        debug!("Decoded image: {}x{}", width, height);

        Ok(RgbImageData {
            width,
            height,
            data: rgb.into_raw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    #[test]
    fn test_decodes_png() {
        let img = RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]));
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png).unwrap();

        let decoded = ImageCrateReader.read_image(bytes.get_ref()).unwrap();

        assert_eq!(decoded.width, 4);
        assert_eq!(decoded.height, 3);
        assert_eq!(decoded.pixel(3, 2), [10, 20, 30]);
    }

    #[test]
    fn test_garbage_is_image_load_error() {
        let result = ImageCrateReader.read_image(b"definitely not an image");
        assert!(matches!(result, Err(ColorimetryError::ImageLoadError { .. })));
    }
}

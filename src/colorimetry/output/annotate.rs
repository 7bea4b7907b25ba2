use std::io::Write;

use tracing::debug;

use crate::colorimetry::common::error::{ColorimetryError, Result};
use crate::colorimetry::image::RgbImageData;
use crate::colorimetry::roi::Roi;

pub const TARGET_COLOR: [u8; 3] = [255, 0, 0];
pub const BACKGROUND_COLOR: [u8; 3] = [0, 255, 0];

const OUTLINE_WIDTH: usize = 2;

fn draw_outline(image: &mut RgbImageData, roi: &Roi, color: [u8; 3]) {
    let x_end = (roi.x + roi.width).min(image.width);
    let y_end = (roi.y + roi.height).min(image.height);

    for y in roi.y..y_end {
        for x in roi.x..x_end {
            let on_edge = x < roi.x + OUTLINE_WIDTH
                || y < roi.y + OUTLINE_WIDTH
                || x + OUTLINE_WIDTH >= roi.x + roi.width
                || y + OUTLINE_WIDTH >= roi.y + roi.height;
            if on_edge {
                image.set_pixel(x, y, color);
            }
        }
    }
}

/// Copy of `image` with the target outlined in red and the background in green.
pub fn draw_rois(image: &RgbImageData, target: &Roi, background: Option<&Roi>) -> RgbImageData {
    let mut annotated = image.clone();
    if let Some(bg) = background {
        draw_outline(&mut annotated, bg, BACKGROUND_COLOR);
    }
    draw_outline(&mut annotated, target, TARGET_COLOR);
    annotated
}

/// Writes RGB images as LZW-compressed 8-bit TIFF.
pub struct TiffAnnotationWriter;

impl TiffAnnotationWriter {
    pub fn write_rgb_tiff(&self, image: &RgbImageData, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding annotated TIFF: {}x{}", image.width, image.height);

        let mut buffer = Vec::new();
        {
            let mut encoder = tiff::encoder::TiffEncoder::new(std::io::Cursor::new(&mut buffer))
                .map_err(|e| ColorimetryError::OutputWriteError(e.to_string()))?
                .with_compression(tiff::encoder::Compression::Lzw);

            encoder
                .write_image::<tiff::encoder::colortype::RGB8>(
                    image.width as u32,
                    image.height as u32,
                    &image.data,
                )
                .map_err(|e| ColorimetryError::OutputWriteError(e.to_string()))?;
        }

        output.write_all(&buffer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_drawn_inside_roi_only() {
        let image = RgbImageData::uniform(30, 30, [9, 9, 9]);
        let target = Roi::new(5, 5, 10, 10).unwrap();
        let background = Roi::new(20, 20, 6, 6).unwrap();

        let annotated = draw_rois(&image, &target, Some(&background));

        assert_eq!(annotated.pixel(5, 5), TARGET_COLOR);
        assert_eq!(annotated.pixel(14, 10), TARGET_COLOR);
        assert_eq!(annotated.pixel(10, 6), TARGET_COLOR);
        assert_eq!(annotated.pixel(10, 10), [9, 9, 9]);
        assert_eq!(annotated.pixel(4, 4), [9, 9, 9]);
        assert_eq!(annotated.pixel(20, 25), BACKGROUND_COLOR);
        // source untouched
        assert_eq!(image.pixel(5, 5), [9, 9, 9]);
    }

    #[test]
    fn test_tiff_output_decodes() {
        let image = draw_rois(
            &RgbImageData::uniform(16, 12, [1, 2, 3]),
            &Roi::new(2, 2, 8, 8).unwrap(),
            None,
        );
        let mut bytes = Vec::new();
        TiffAnnotationWriter.write_rgb_tiff(&image, &mut bytes).unwrap();

        let decoded = ::image::load_from_memory_with_format(&bytes, ::image::ImageFormat::Tiff)
            .unwrap()
            .into_rgb8();
        assert_eq!(decoded.dimensions(), (16, 12));
        assert_eq!(decoded.get_pixel(2, 2).0, TARGET_COLOR);
        assert_eq!(decoded.get_pixel(0, 0).0, [1, 2, 3]);
    }
}

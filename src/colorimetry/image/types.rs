//! Decoded image types

/// Decoded RGB image data
#[derive(Debug, Clone, PartialEq)]
pub struct RgbImageData {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// RGB pixel data interleaved [R, G, B, R, G, B, ...]
    pub data: Vec<u8>,
}

impl RgbImageData {
    /// Creates an image filled with a single color.
    pub fn uniform(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let data = std::iter::repeat_n(rgb, width * height).flatten().collect();
        Self { width, height, data }
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let i = (y * self.width + x) * 3;
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Returns the interleaved bytes of one row segment `[x, x + len)`.
    pub fn row_segment(&self, y: usize, x: usize, len: usize) -> &[u8] {
        let start = (y * self.width + x) * 3;
        &self.data[start..start + len * 3]
    }
}

use palette::{IntoColor, Lab, Srgb};

use crate::colorimetry::image::RgbImageData;
use crate::colorimetry::roi::types::{LabMeans, Roi};

/// Mean L*a*b* over `roi`, converting every pixel from sRGB (D65 white point)
/// before averaging. The caller has already checked the ROI bounds.
pub fn mean_lab(image: &RgbImageData, roi: &Roi) -> LabMeans {
    let mut sum = [0.0f64; 3];

    for y in roi.y..roi.y + roi.height {
        for px in image.row_segment(y, roi.x, roi.width).chunks_exact(3) {
            let srgb = Srgb::new(px[0], px[1], px[2]).into_format::<f32>();
            let lab: Lab = srgb.into_linear().into_color();
            sum[0] += lab.l as f64;
            sum[1] += lab.a as f64;
            sum[2] += lab.b as f64;
        }
    }

    let n = roi.area() as f64;
    LabMeans {
        l: sum[0] / n,
        a: sum[1] / n,
        b: sum[2] / n,
    }
}

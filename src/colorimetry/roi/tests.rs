use crate::colorimetry::common::error::ColorimetryError;
use crate::colorimetry::image::RgbImageData;
use crate::colorimetry::roi::{Channel, RoiSampler, Roi, extract, mean_lab};

fn split_image() -> RgbImageData {
    // left half (0..10) is dark, right half (10..20) is bright
    let mut image = RgbImageData::uniform(20, 10, [40, 50, 60]);
    for y in 0..10 {
        for x in 10..20 {
            image.set_pixel(x, y, [200, 180, 160]);
        }
    }
    image
}

#[test]
fn test_uniform_image_any_roi_returns_fill_color() {
    let image = RgbImageData::uniform(64, 48, [100, 150, 164]);
    let rois = [
        Roi::new(0, 0, 64, 48).unwrap(),
        Roi::new(10, 10, 20, 20).unwrap(),
        Roi::new(63, 47, 1, 1).unwrap(),
        Roi::new(5, 30, 17, 3).unwrap(),
    ];

    for roi in rois {
        let means = extract(&image, &roi).unwrap();
        assert_eq!(means.as_array(), [100.0, 150.0, 164.0], "roi {}", roi);
    }
}

#[test]
fn test_mean_over_mixed_region() {
    let image = split_image();
    let roi = Roi::new(5, 0, 10, 10).unwrap();

    let means = extract(&image, &roi).unwrap();

    assert_eq!(means.r, 120.0);
    assert_eq!(means.g, 115.0);
    assert_eq!(means.b, 110.0);
}

#[test]
fn test_roi_out_of_bounds() {
    let image = RgbImageData::uniform(20, 10, [0, 0, 0]);

    for roi in [
        Roi::new(15, 0, 6, 5).unwrap(),
        Roi::new(0, 8, 5, 3).unwrap(),
        Roi::new(usize::MAX, 0, 1, 1).unwrap(),
    ] {
        let result = extract(&image, &roi);
        assert!(matches!(
            result,
            Err(ColorimetryError::RoiOutOfBoundsError { width: 20, height: 10, .. })
        ));
    }
}

#[test]
fn test_zero_sized_roi_rejected() {
    assert!(matches!(Roi::new(0, 0, 0, 5), Err(ColorimetryError::InvalidRoi(_))));
    assert!(matches!(Roi::new(0, 0, 5, 0), Err(ColorimetryError::InvalidRoi(_))));
}

#[test]
fn test_roi_parsing() {
    let roi: Roi = "922, 616,50,50".parse().unwrap();
    assert_eq!(roi, Roi::new(922, 616, 50, 50).unwrap());
    assert_eq!(roi.to_string(), "922,616,50,50");

    assert!("1,2,3".parse::<Roi>().is_err());
    assert!("1,2,x,4".parse::<Roi>().is_err());
    assert!("1,2,0,4".parse::<Roi>().is_err());
}

#[test]
fn test_background_correction_never_negative() {
    let image = split_image();
    let dark = Roi::new(0, 0, 10, 10).unwrap();
    let bright = Roi::new(10, 0, 10, 10).unwrap();

    // bright target over dark background: plain difference
    let stats = RoiSampler::new(bright, Some(dark)).sample(&image).unwrap();
    assert_eq!(stats.corrected().as_array(), [160.0, 130.0, 100.0]);

    // dark target over bright background: clamped to zero
    let stats = RoiSampler::new(dark, Some(bright)).sample(&image).unwrap();
    let corrected = stats.corrected();
    assert_eq!(corrected.as_array(), [0.0, 0.0, 0.0]);
    assert_eq!(stats.target.as_array(), [40.0, 50.0, 60.0]);
    assert_eq!(stats.intensity(Channel::B), 0.0);
}

#[test]
fn test_background_out_of_bounds_fails_sample() {
    let image = split_image();
    let sampler = RoiSampler::new(
        Roi::new(0, 0, 5, 5).unwrap(),
        Some(Roi::new(18, 0, 5, 5).unwrap()),
    );
    assert!(matches!(
        sampler.sample(&image),
        Err(ColorimetryError::RoiOutOfBoundsError { .. })
    ));
}

#[test]
fn test_lab_of_white_and_black() {
    let white = RgbImageData::uniform(4, 4, [255, 255, 255]);
    let black = RgbImageData::uniform(4, 4, [0, 0, 0]);
    let roi = Roi::new(0, 0, 4, 4).unwrap();

    let lab = mean_lab(&white, &roi);
    assert!((lab.l - 100.0).abs() < 0.05, "L* = {}", lab.l);
    assert!(lab.a.abs() < 0.05 && lab.b.abs() < 0.05);

    let lab = mean_lab(&black, &roi);
    assert!(lab.l.abs() < 1e-6);
}

#[test]
fn test_lab_only_when_requested() {
    let image = RgbImageData::uniform(8, 8, [120, 60, 30]);
    let roi = Roi::new(0, 0, 8, 8).unwrap();

    assert!(RoiSampler::new(roi, None).sample(&image).unwrap().lab.is_none());

    let lab = RoiSampler::new(roi, None)
        .with_lab(true)
        .sample(&image)
        .unwrap()
        .lab
        .unwrap();
    // warm orange: positive a* and b*
    assert!(lab.a > 0.0 && lab.b > 0.0);
}

#[test]
fn test_channel_parsing() {
    assert_eq!("b".parse::<Channel>().unwrap(), Channel::B);
    assert_eq!("Green".parse::<Channel>().unwrap(), Channel::G);
    assert!(matches!(
        "L".parse::<Channel>(),
        Err(ColorimetryError::ConfigError(_))
    ));
}

use std::fmt;

use crate::colorimetry::classify::thresholds::Thresholds;

/// Adsorption outcome for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Hit,
    ModerateFade,
    None,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Hit => "Hit",
            Label::ModerateFade => "Moderate fade",
            Label::None => "None",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Hit` strictly below the hit threshold, `ModerateFade` strictly below the
/// moderate threshold, `None` otherwise. NaN is never a hit.
pub fn classify(concentration: f64, thresholds: &Thresholds) -> Label {
    if concentration < thresholds.hit() {
        Label::Hit
    } else if thresholds.moderate().is_some_and(|m| concentration < m) {
        Label::ModerateFade
    } else {
        Label::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorimetry::common::error::ColorimetryError;

    #[test]
    fn test_hit_iff_strictly_below_threshold() {
        let t = Thresholds::hit_only(1.0).unwrap();
        assert_eq!(classify(0.1308, &t), Label::Hit);
        assert_eq!(classify(-2.0, &t), Label::Hit);
        assert_eq!(classify(0.999_999, &t), Label::Hit);
        assert_eq!(classify(1.0, &t), Label::None);
        assert_eq!(classify(1.000_001, &t), Label::None);
        assert_eq!(classify(f64::NAN, &t), Label::None);
    }

    #[test]
    fn test_without_moderate_threshold_no_moderate_fade() {
        let t = Thresholds::hit_only(1.0).unwrap();
        for c in [1.0, 2.0, 50.0, 1e9] {
            assert_ne!(classify(c, &t), Label::ModerateFade);
        }
    }

    #[test]
    fn test_three_level_classification() {
        let t = Thresholds::new(1.0, Some(5.0)).unwrap();
        assert_eq!(classify(0.5, &t), Label::Hit);
        assert_eq!(classify(1.0, &t), Label::ModerateFade);
        assert_eq!(classify(4.99, &t), Label::ModerateFade);
        assert_eq!(classify(5.0, &t), Label::None);
        assert_eq!(classify(12.0, &t), Label::None);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(Thresholds::hit_only(0.0).is_ok());
        for bad in [-0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Thresholds::hit_only(bad),
                Err(ColorimetryError::ThresholdError(_))
            ));
        }
        assert!(Thresholds::new(1.0, Some(1.0)).is_err());
        assert!(Thresholds::new(1.0, Some(0.5)).is_err());
        assert!(Thresholds::new(1.0, Some(f64::NAN)).is_err());
    }

    #[test]
    fn test_labels_display() {
        assert_eq!(Label::Hit.to_string(), "Hit");
        assert_eq!(Label::ModerateFade.to_string(), "Moderate fade");
        assert_eq!(Label::None.to_string(), "None");
    }
}

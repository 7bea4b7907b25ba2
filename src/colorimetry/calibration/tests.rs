use crate::colorimetry::calibration::{
    CalibrationRecord, CalibrationStore, ModelKind, Observation, absorbance, fit, fit_channel,
    invert, invert_statistics,
};
use crate::colorimetry::common::error::ColorimetryError;
use crate::colorimetry::roi::{Channel, ChannelStatistics, RgbMeans};

fn record(slope: f64, intercept: f64, model: ModelKind) -> CalibrationRecord {
    CalibrationRecord {
        dye: "dye1".to_string(),
        slope,
        intercept,
        channel: Channel::B,
        model,
    }
}

#[test]
fn test_linear_inversion_reference_values() {
    let rec = record(2.8291, 164.37, ModelKind::Linear);
    let c = invert(164.0, &rec).unwrap();
    assert!((c - 0.1308).abs() < 1e-4, "c = {}", c);
}

#[test]
fn test_linear_round_trip() {
    for (slope, intercept) in [(2.8291, 164.37), (9.5192, 156.91), (-1.5, 20.0), (0.01, 0.0)] {
        let rec = record(slope, intercept, ModelKind::Linear);
        for c in [0.0, 0.25, 1.0, 7.5, 42.0] {
            let recovered = invert(rec.predict(c), &rec).unwrap();
            assert!((recovered - c).abs() < 1e-9, "{} -> {}", c, recovered);
        }
    }
}

#[test]
fn test_logarithmic_round_trip() {
    let rec = record(0.0198, 151.4, ModelKind::Logarithmic);
    for c in [0.0, 0.5, 3.0, 20.0] {
        let recovered = invert(rec.predict(c), &rec).unwrap();
        assert!((recovered - c).abs() < 1e-9);
    }
}

#[test]
fn test_logarithmic_strictly_decreasing() {
    let rec = record(0.05, 150.0, ModelKind::Logarithmic);
    let mut previous = f64::INFINITY;
    for intensity in (1..=300).map(|i| i as f64 * 0.75) {
        let c = invert(intensity, &rec).unwrap();
        assert!(c < previous, "not decreasing at intensity {}", intensity);
        previous = c;
    }
}

#[test]
fn test_zero_slope_is_model_error() {
    for model in [ModelKind::Linear, ModelKind::Logarithmic] {
        let rec = record(0.0, 150.0, model);
        assert!(matches!(
            invert(100.0, &rec),
            Err(ColorimetryError::CalibrationModelError { .. })
        ));
        assert!(rec.validate().is_err());
    }
}

#[test]
fn test_logarithmic_rejects_non_positive_arguments() {
    let rec = record(0.05, 150.0, ModelKind::Logarithmic);
    assert!(invert(0.0, &rec).is_err());
    assert!(invert(-3.0, &rec).is_err());

    let rec = record(0.05, -150.0, ModelKind::Logarithmic);
    assert!(invert(10.0, &rec).is_err());
    assert!(matches!(
        rec.validate(),
        Err(ColorimetryError::CalibrationModelError { dye, .. }) if dye == "dye1"
    ));
}

#[test]
fn test_invert_statistics_uses_selected_channel() {
    let stats = ChannelStatistics {
        target: RgbMeans::new(100.0, 150.0, 164.0),
        background: None,
        lab: None,
    };
    let mut rec = record(2.0, 170.0, ModelKind::Linear);
    assert_eq!(invert_statistics(&stats, &rec).unwrap(), 3.0);

    rec.channel = Channel::G;
    assert_eq!(invert_statistics(&stats, &rec).unwrap(), 10.0);
}

#[test]
fn test_fit_single_observation_is_insufficient() {
    let result = fit(
        "dye1",
        Channel::B,
        &[Observation::new(1.0, 160.0)],
        ModelKind::Linear,
    );
    assert!(matches!(
        result,
        Err(ColorimetryError::InsufficientDataError { distinct: 1 })
    ));
}

#[test]
fn test_fit_repeated_concentration_is_insufficient() {
    let obs = [Observation::new(2.0, 160.0), Observation::new(2.0, 158.0)];
    assert!(matches!(
        fit("dye1", Channel::B, &obs, ModelKind::Linear),
        Err(ColorimetryError::InsufficientDataError { distinct: 1 })
    ));
}

#[test]
fn test_linear_fit_recovers_exact_curve() {
    let truth = record(2.8291, 164.37, ModelKind::Linear);
    let obs: Vec<Observation> = [0.0, 1.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|&c| Observation::new(c, truth.predict(c)))
        .collect();

    let fitted = fit("dye1", Channel::B, &obs, ModelKind::Linear).unwrap();

    assert!((fitted.record.slope - 2.8291).abs() < 1e-9);
    assert!((fitted.record.intercept - 164.37).abs() < 1e-9);
    assert!((fitted.r_squared - 1.0).abs() < 1e-12);
    assert_eq!(fitted.observations, 5);
}

#[test]
fn test_two_point_fit_round_trip() {
    let obs = [Observation::new(0.5, 150.0), Observation::new(4.0, 120.0)];
    let fitted = fit("dye2", Channel::G, &obs, ModelKind::Linear).unwrap();

    for o in obs {
        let c = invert(o.intensity, &fitted.record).unwrap();
        assert!((c - o.concentration).abs() < 1e-9);
    }
    for c in [0.0, 1.0, 3.3] {
        let back = invert(fitted.record.predict(c), &fitted.record).unwrap();
        assert!((back - c).abs() < 1e-9);
    }
}

#[test]
fn test_noisy_linear_fit_has_partial_r_squared() {
    let obs = [
        Observation::new(0.0, 160.0),
        Observation::new(1.0, 159.0),
        Observation::new(2.0, 150.0),
        Observation::new(3.0, 151.0),
    ];
    let fitted = fit("dye3", Channel::R, &obs, ModelKind::Linear).unwrap();
    assert!(fitted.record.slope > 0.0);
    assert!(fitted.r_squared > 0.5 && fitted.r_squared < 1.0);
}

#[test]
fn test_logarithmic_fit_recovers_exact_curve() {
    let truth = record(0.0198, 151.4, ModelKind::Logarithmic);
    let obs: Vec<Observation> = [0.0, 2.0, 5.0, 10.0, 20.0]
        .iter()
        .map(|&c| Observation::new(c, truth.predict(c)))
        .collect();

    let fitted = fit("dye4", Channel::G, &obs, ModelKind::Logarithmic).unwrap();

    assert!((fitted.record.slope - 0.0198).abs() < 1e-9);
    assert!((fitted.record.intercept - 151.4).abs() < 1e-6);
    assert_eq!(fitted.record.model, ModelKind::Logarithmic);
    for c in [1.0, 7.0] {
        let back = invert(fitted.record.predict(c), &fitted.record).unwrap();
        assert!((back - c).abs() < 1e-9);
    }
}

#[test]
fn test_logarithmic_fit_rejects_zero_intensity() {
    let obs = [Observation::new(0.0, 100.0), Observation::new(5.0, 0.0)];
    assert!(matches!(
        fit("dye4", Channel::G, &obs, ModelKind::Logarithmic),
        Err(ColorimetryError::CalibrationModelError { .. })
    ));
}

#[test]
fn test_flat_response_cannot_be_inverted() {
    let obs = [Observation::new(0.0, 100.0), Observation::new(5.0, 100.0)];
    assert!(matches!(
        fit("dye5", Channel::R, &obs, ModelKind::Linear),
        Err(ColorimetryError::CalibrationModelError { .. })
    ));
}

#[test]
fn test_fit_channel_selects_intensity() {
    let samples = [
        (0.0, RgbMeans::new(200.0, 100.0, 50.0)),
        (10.0, RgbMeans::new(180.0, 100.0, 30.0)),
    ];
    let fitted = fit_channel("dye1", Channel::R, &samples, ModelKind::Linear).unwrap();
    assert!((fitted.record.slope - 2.0).abs() < 1e-12);
    assert_eq!(fitted.record.channel, Channel::R);
}

#[test]
fn test_absorbance() {
    assert!(absorbance(100.0, 100.0).abs() < 1e-12);
    assert!((absorbance(10.0, 100.0) - 1.0).abs() < 1e-6);
    assert!(absorbance(0.0, 100.0).is_finite());
}

#[test]
fn test_store_loads_valid_and_rejects_invalid_per_dye() {
    let json = r#"{
        "dye1": {"slope": 2.8291, "intercept": 164.37, "channel": "B"},
        "dye4": {"slope": 0.0198, "intercept": 151.4, "channel": "g", "model": "logarithmic"},
        "dye7": {"slope": 1.0, "intercept": 100.0, "channel": "L"},
        "dye8": {"slope": 0.0, "intercept": 100.0, "channel": "R"},
        "dye9": {"intercept": 100.0, "channel": "R"}
    }"#;

    let store = CalibrationStore::from_json_str(json).unwrap();

    assert_eq!(store.len(), 2);
    let dye4 = store.record("dye4").unwrap();
    assert_eq!(dye4.channel, Channel::G);
    assert_eq!(dye4.model, ModelKind::Logarithmic);
    assert_eq!(store.record("dye1").unwrap().model, ModelKind::Linear);

    assert_eq!(store.rejected().len(), 3);
    for dye in ["dye7", "dye8", "dye9", "dye_missing"] {
        assert!(matches!(
            store.record(dye),
            Err(ColorimetryError::CalibrationModelError { dye: d, .. }) if d == dye
        ));
    }
}

#[test]
fn test_store_malformed_json_fails() {
    assert!(matches!(
        CalibrationStore::from_json_str("{ not json"),
        Err(ColorimetryError::ConfigError(_))
    ));
}

#[test]
fn test_store_json_round_trip() {
    let mut store = CalibrationStore::default();
    store
        .insert(record(5.8655, 165.77, ModelKind::Linear))
        .unwrap();
    let json = store.to_json_string().unwrap();

    let reloaded = CalibrationStore::from_json_str(&json).unwrap();
    assert_eq!(
        reloaded.record("dye1").unwrap().as_ref(),
        &record(5.8655, 165.77, ModelKind::Linear)
    );
}

#[test]
fn test_store_write_back_keeps_rejected_entries() {
    let json = r#"{
        "dye4": {"slope": 0.0198, "intercept": 151.4, "channel": "G", "model": "logarithmic"},
        "dye7": {"slope": 0.0, "intercept": 100.0, "channel": "B"},
        "dye9": {"slope": 1.0, "intercept": 100.0, "channel": "Blue-ish", "note": "typo"}
    }"#;
    let mut store = CalibrationStore::from_json_str(json).unwrap();
    store.insert(record(2.8291, 164.37, ModelKind::Linear)).unwrap();

    let written: serde_json::Value = serde_json::from_str(&store.to_json_string().unwrap()).unwrap();
    let original: serde_json::Value = serde_json::from_str(json).unwrap();
    assert_eq!(written["dye7"], original["dye7"]);
    assert_eq!(written["dye9"], original["dye9"]);
    assert_eq!(written["dye1"]["channel"], "B");
    assert_eq!(written["dye4"]["model"], "logarithmic");

    let reloaded = CalibrationStore::from_json_str(&store.to_json_string().unwrap()).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.rejected().len(), 2);
}

#[test]
fn test_store_insert_replaces_rejected_entry() {
    let mut store =
        CalibrationStore::from_json_str(r#"{"dye1": {"slope": 0.0, "intercept": 100.0, "channel": "B"}}"#).unwrap();
    assert_eq!(store.rejected().len(), 1);

    store.insert(record(2.8291, 164.37, ModelKind::Linear)).unwrap();
    let reloaded = CalibrationStore::from_json_str(&store.to_json_string().unwrap()).unwrap();

    assert!(reloaded.rejected().is_empty());
    assert_eq!(reloaded.record("dye1").unwrap().slope, 2.8291);
}

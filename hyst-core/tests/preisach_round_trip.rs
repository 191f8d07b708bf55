//! End-to-end checks of the Preisach model's persistence and queries.

use hyst_core::{Branch, Density, HysteresisModel, Preisach, PreisachConfig, QueryError};

fn model() -> Preisach {
    let config = PreisachConfig::new(1.35e6, 400.0, 20.0, 2.0).with_density(Density::Gaussian {
        mean: [-0.2, 0.2],
        cov: [[0.2, 0.0], [0.0, 0.2]],
    });
    Preisach::new(config).unwrap()
}

#[test]
fn save_load_round_trip_reproduces_point_and_path() {
    let original = model();
    let mut blob = Vec::new();
    original.save(&mut blob).unwrap();
    let restored = Preisach::load(blob.as_slice()).unwrap();

    assert_eq!(restored.config(), original.config());
    assert_eq!(restored.major_loop(), original.major_loop());

    let h = 0.3 * original.saturation_field();
    assert_eq!(
        original.point(h, Branch::Upper).unwrap(),
        restored.point(h, Branch::Upper).unwrap()
    );

    let m0 = original.point(h, Branch::Lower).unwrap();
    let trace = original.path(&[h, h + 100.0, h - 60.0], m0).unwrap();
    let replayed = restored.path(&[h, h + 100.0, h - 60.0], m0).unwrap();
    assert_eq!(trace, replayed);
}

#[test]
fn query_beyond_the_support_is_out_of_range() {
    let model = model();
    let h_sat = model.saturation_field();

    assert!(model.point(h_sat, Branch::Upper).is_ok());
    let err = model.point(h_sat + model.config().dh, Branch::Upper).unwrap_err();
    assert!(matches!(err, QueryError::OutOfRange { .. }));
}

#[test]
fn relay_sweep_is_rate_independent() {
    // The same endpoints reached through intermediate checkpoints latch the
    // same relays, so magnetization depends on the turning points only.
    let model = model();
    let m0 = model.point(0.0, Branch::Lower).unwrap();

    let direct = model.path(&[0.0, 300.0, -150.0], m0).unwrap();
    let via = model.path(&[0.0, 150.0, 300.0, 0.0, -150.0], m0).unwrap();

    assert_eq!(direct.last().unwrap(), via.last().unwrap());
}

//! End-to-end checks of a Jiles-Atherton model built with realistic
//! soft-iron constants.

use approx::assert_relative_eq;
use hyst_core::{
    Branch, HysteresisModel, JilesAtherton, JilesAthertonConfig, QueryError, StatePoint,
};

fn scenario_config() -> JilesAthertonConfig {
    JilesAthertonConfig::new(4.93e-4, 399.0, 1.35e6, 300.0, 0.12, 1.0).with_sat_tol(2.5e-4)
}

fn scenario_model() -> JilesAtherton {
    JilesAtherton::new(scenario_config()).unwrap()
}

#[test]
fn remanence_and_coercivity_are_finite_and_nonzero() {
    let model = scenario_model();

    let [mr_upper, mr_lower] = model.remanence();
    assert!(mr_upper.is_finite() && mr_upper > 0.0);
    assert!(mr_lower.is_finite() && mr_lower < 0.0);

    let [hc_lower, hc_upper] = model.coercivity();
    assert!(hc_lower.is_finite() && hc_lower > 0.0);
    assert!(hc_upper.is_finite() && hc_upper < 0.0);
}

#[test]
fn critical_points_are_sign_symmetric() {
    let model = scenario_model();

    let [mr_upper, mr_lower] = model.remanence();
    assert_relative_eq!(mr_upper, -mr_lower, max_relative = 0.01);

    let [hc_lower, hc_upper] = model.coercivity();
    assert_relative_eq!(hc_lower, -hc_upper, max_relative = 0.01);
}

#[test]
fn major_loop_is_point_symmetric_through_the_origin() {
    let model = scenario_model();
    let ms = model.config().ms;
    let h_sat = model.saturation_field();

    for frac in [0.0, 0.1, 0.25, 0.5, 0.75, 1.0] {
        let h = frac * h_sat;
        let upper = model.point(h, Branch::Upper).unwrap();
        let mirrored = model.point(-h, Branch::Lower).unwrap();
        assert!(
            (upper + mirrored).abs() < 0.02 * ms,
            "M_upper({h}) = {upper} vs -M_lower({}) = {}",
            -h,
            -mirrored
        );
    }
}

#[test]
fn zero_length_path_returns_the_queried_magnetization() {
    let model = scenario_model();
    let h = 0.25 * model.saturation_field();
    let m = model.point(h, Branch::Upper).unwrap();

    let trace = model.path(&[h, h], m).unwrap();
    assert_eq!(trace.last(), Some((h, m)));
}

#[test]
fn construction_is_deterministic() {
    let first = scenario_model();
    let second = scenario_model();

    assert_eq!(first.major_loop(), second.major_loop());
    assert_eq!(first.remanence(), second.remanence());
    assert_eq!(first.coercivity(), second.coercivity());
}

#[test]
fn point_succeeds_at_the_saturation_edge_and_fails_one_step_beyond() {
    let model = scenario_model();
    let h_sat = model.saturation_field();
    let dh = model.config().dh;

    for branch in [Branch::Upper, Branch::Lower] {
        assert!(model.point(h_sat, branch).is_ok());
        assert!(model.point(-h_sat, branch).is_ok());

        let err = model.point(h_sat + dh, branch).unwrap_err();
        assert!(matches!(err, QueryError::OutOfRange { .. }), "{err:?}");
    }
}

#[test]
fn save_load_round_trip_reproduces_point_and_path() {
    let model = scenario_model();
    let mut blob = Vec::new();
    model.save(&mut blob).unwrap();
    let restored = JilesAtherton::load(blob.as_slice()).unwrap();

    assert_eq!(restored.config(), model.config());
    assert_eq!(restored.major_loop(), model.major_loop());

    let h = 0.4 * model.saturation_field();
    assert_eq!(
        model.point(h, Branch::Upper).unwrap(),
        restored.point(h, Branch::Upper).unwrap()
    );

    let m0 = model.point(h, Branch::Lower).unwrap();
    let original = model.path(&[h, h + 50.0, h - 25.0], m0).unwrap();
    let replayed = restored.path(&[h, h + 50.0, h - 25.0], m0).unwrap();
    assert_eq!(original, replayed);
}

#[test]
fn wrong_model_kind_is_rejected_on_load() {
    let model = scenario_model();
    let mut blob = Vec::new();
    model.save(&mut blob).unwrap();

    let err = hyst_core::Preisach::load(blob.as_slice()).unwrap_err();
    assert!(matches!(err, hyst_core::PersistError::ModelMismatch { .. }));
}

#[test]
fn small_minor_loop_approximately_closes() {
    let model = scenario_model();
    let config = model.config();

    // Excursion well below the domain-wall density `a`. Closure is
    // approximate: reversing the field pulls the state toward the
    // anhysteretic curve, so the gap shrinks with the excursion but never
    // reaches zero.
    let h0 = 0.5 * model.saturation_field();
    let excursion = 0.05 * config.a;
    let m0 = model.point(h0, Branch::Lower).unwrap();

    let trace = model.path(&[h0, h0 + excursion, h0], m0).unwrap();
    let (h_end, m_end) = trace.last().unwrap();
    assert_eq!(h_end, h0);
    assert!(
        (m_end - m0).abs() < 0.02 * config.ms,
        "minor loop gap {} exceeds tolerance",
        m_end - m0
    );
}

#[test]
fn stepping_and_tracing_agree() {
    let model = scenario_model();
    let targets = [150.0, 400.0, 100.0, -50.0];

    let mut state = StatePoint::demagnetized();
    for &target in &targets {
        state = model.apply_step(state, target).unwrap();
    }

    let mut checkpoints = vec![0.0];
    checkpoints.extend_from_slice(&targets);
    let trace = model.path(&checkpoints, 0.0).unwrap();

    assert_eq!(state.h, *checkpoints.last().unwrap());
    assert_eq!(state.branch, Branch::Upper);
    assert_relative_eq!(state.m, trace.last().unwrap().1, max_relative = 1e-9);
}

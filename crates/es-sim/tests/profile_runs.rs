//! Integration test: components driven over load profiles.

use es_components::{
    CarrierSet, ComponentError, CurveDef, EccParameter, EccParameterDef, EnergyCarrier,
    EnergyConversionComponent, EnergyStorageComponent, EscParameter, EscParameterDef,
};
use es_core::units::minutes;
use es_sim::{
    LoadProfile, SimError, SimOptions, run_profile, stationary_sweep, timestep_study,
};
use proptest::prelude::*;

fn sofc() -> EccParameter {
    EccParameter::new(
        EccParameterDef {
            name: "SOFC".to_string(),
            t_start: 10.0,
            e_start: 10.0,
            eta_start: 0.5,
            p_out_rated: 2000.0,
            p_out_min_rel: 0.15,
            p_change_pos: 5.0,
            p_change_neg: 5.0,
            eta: CurveDef::new(vec![0.15, 1.0], vec![0.9, 0.91]),
            eta_mc: CurveDef::new(vec![0.15, 1.0], vec![0.92, 0.95]),
            e_loadchange: CurveDef::new(vec![0.0, 0.15, 1.0], vec![0.0, 0.0, 20.0]),
            t_cooldown: 10.0,
            split_p_sd: [0.95, 0.05],
            fact_p_heat_p_loss: 1.0,
            norm_limits: [0.0, 1.0],
            techno_economic: None,
        },
        CarrierSet::default(),
    )
    .unwrap()
}

fn sofc_component(ts_min: f64) -> EnergyConversionComponent {
    EnergyConversionComponent::new(sofc(), minutes(ts_min), None).unwrap()
}

fn small_battery() -> EnergyStorageComponent {
    let par = EscParameter::new(
        EscParameterDef {
            name: "Battery".to_string(),
            e_cap: 1.0,
            eta: 0.9,
            c_rate: 0.0,
            auto_increase: false,
            techno_economic: None,
        },
        CarrierSet::uniform(EnergyCarrier::new("Electricity", "#ccb80e")),
    )
    .unwrap();
    EnergyStorageComponent::new(par, minutes(60.0), 0.5).unwrap()
}

#[test]
fn records_initial_state_and_every_step() {
    let mut c = sofc_component(1.0);
    let profile = LoadProfile::hold_then_release("full", 1.0, 1.0, 180).unwrap();
    let record = run_profile(&mut c, &profile, &SimOptions::default()).unwrap();

    assert_eq!(record.len(), 181);
    assert_eq!(record.step[0], 0);
    assert_eq!(record.x[0].heatup, 0.0);
    assert_eq!(record.step[180], 180);
    assert_eq!(record.t_min[180], 180.0);
    assert_eq!(record.summary.steps, 180);
    assert_eq!(record.summary.duration_min, 180.0);
}

#[test]
fn long_release_ends_cold_with_nothing_retained() {
    let mut c = sofc_component(1.0);
    let profile = LoadProfile::hold_then_release("full", 1.0, 1.0, 180).unwrap();
    let record = run_profile(&mut c, &profile, &SimOptions::default()).unwrap();

    let last = record.last().unwrap();
    assert_eq!(last.heatup, 0.0);
    assert_eq!(last.p_out, 0.0);

    let s = &record.summary;
    assert!(s.total("E_out") > 0.0);
    let retained = s.total("E_in") - s.total("E_out") - s.total("E_loss");
    assert!(retained.abs() < 1e-6, "retained {retained}");
    assert!(s.max_abs_balance < 1e-6);
}

#[test]
fn decimation_keeps_final_state() {
    let mut c = sofc_component(1.0);
    let profile = LoadProfile::constant("c", 1.0, 0.5, 20).unwrap();
    let opts = SimOptions {
        record_every: 7,
        ..SimOptions::default()
    };
    let record = run_profile(&mut c, &profile, &opts).unwrap();
    assert_eq!(record.step, vec![0, 7, 14, 20]);
    assert_eq!(record.summary.steps, 20);
}

#[test]
fn max_steps_truncates() {
    let mut c = sofc_component(1.0);
    let profile = LoadProfile::constant("c", 1.0, 0.5, 50).unwrap();
    let opts = SimOptions {
        max_steps: 10,
        ..SimOptions::default()
    };
    let record = run_profile(&mut c, &profile, &opts).unwrap();
    assert_eq!(record.step.last(), Some(&10));
}

#[test]
fn invalid_options_rejected() {
    let mut c = sofc_component(1.0);
    let profile = LoadProfile::constant("c", 1.0, 0.5, 5).unwrap();
    let opts = SimOptions {
        record_every: 0,
        ..SimOptions::default()
    };
    assert!(matches!(
        run_profile(&mut c, &profile, &opts),
        Err(SimError::InvalidArg { .. })
    ));
}

#[test]
fn timestep_mismatch_rejected() {
    let mut c = sofc_component(1.0);
    let profile = LoadProfile::constant("c", 15.0, 0.5, 5).unwrap();
    assert!(matches!(
        run_profile(&mut c, &profile, &SimOptions::default()),
        Err(SimError::TimestepMismatch { .. })
    ));
}

#[test]
fn failing_step_is_reported_with_index() {
    let mut b = small_battery();
    // 0.5 kWh stored; the second withdrawal empties it past zero.
    let profile = LoadProfile::from_values("drain", 60.0, vec![-0.3, -0.3]).unwrap();
    let err = run_profile(&mut b, &profile, &SimOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        SimError::Step {
            step: 2,
            source: ComponentError::StorageOverflow { .. }
        }
    ));
}

#[test]
fn sweep_settles_every_target() {
    let par = sofc();
    let targets = [0.0, 0.075, 0.15, 0.5, 1.0];
    let points = stationary_sweep(&par, 1.0, &targets, 100).unwrap();
    assert_eq!(points.len(), targets.len());

    for (point, &target) in points.iter().zip(&targets) {
        assert_eq!(point.target, target);
        let expected = if target >= 0.15 { target * 2000.0 } else { 0.0 };
        assert!(
            (point.state.p_out - expected).abs() < 1e-6,
            "target {target}: P_out {}",
            point.state.p_out
        );
    }
    assert_eq!(points[0].state.heatup, 0.0);
    assert!((points[1].state.heatup - 0.5).abs() < 1e-9);
    assert_eq!(points[4].state.heatup, 1.0);
}

#[test]
fn sweep_reports_non_convergence() {
    let par = sofc();
    let err = stationary_sweep(&par, 1.0, &[1.0], 3).unwrap_err();
    assert!(matches!(
        err,
        SimError::Component(ComponentError::ConvergenceFailed { .. })
    ));
}

#[test]
fn timestep_study_totals_agree() {
    let par = sofc();
    let runs = timestep_study(&par, 1.0, 120.0, &[0.5, 1.0, 2.0]).unwrap();
    assert_eq!(
        runs.iter().map(|r| r.steps).collect::<Vec<_>>(),
        vec![240, 120, 60]
    );

    let reference = runs[0].summary.total("E_out");
    assert!(reference > 0.0);
    for run in &runs {
        assert_eq!(run.final_state.heatup, 0.0, "ts {}", run.ts_min);
        let rel = (run.summary.total("E_out") - reference).abs() / reference;
        assert!(rel < 0.1, "ts {}: deviation {rel}", run.ts_min);
    }
}

#[test]
fn timestep_study_rejects_bad_input() {
    let par = sofc();
    assert!(timestep_study(&par, 1.0, 0.0, &[1.0]).is_err());
    assert!(timestep_study(&par, 1.0, 10.0, &[0.0]).is_err());
    assert!(timestep_study(&par, 1.0, 10.0, &[20.0]).is_err());
}

proptest! {
    #[test]
    fn record_count_matches_decimation(
        values in prop::collection::vec(0.0f64..1.0, 1..60),
        every in 1usize..10,
    ) {
        let n = values.len();
        let mut c = sofc_component(1.0);
        let profile = LoadProfile::from_values("random", 1.0, values).unwrap();
        let opts = SimOptions { record_every: every, ..SimOptions::default() };
        let record = run_profile(&mut c, &profile, &opts).unwrap();

        let expected = 1 + n / every + usize::from(n % every != 0);
        prop_assert_eq!(record.len(), expected);
        prop_assert_eq!(record.step.last().copied(), Some(n));
        prop_assert!(record.step.windows(2).all(|w| w[0] < w[1]));
    }
}

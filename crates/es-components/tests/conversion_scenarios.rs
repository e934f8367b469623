//! Integration test: conversion component scenarios over many steps.

use es_components::{
    BalanceCheck, CarrierSet, ComponentError, ControlOptions, CurveDef, EccParameter,
    EccParameterDef, EccState, EnergyConversionComponent,
};
use es_core::units::minutes;
use proptest::prelude::*;

fn pem_def() -> EccParameterDef {
    let load = vec![
        0.15, 0.2, 0.25, 0.3, 0.35, 0.4, 0.45, 0.5, 0.55, 0.6, 0.65, 0.7, 0.75, 0.8, 0.85, 0.9,
        0.95, 1.0, 1.05, 1.1, 1.15, 1.2,
    ];
    let eta = vec![
        0.55, 0.5643, 0.571, 0.5737, 0.5733, 0.5708, 0.5667, 0.5612, 0.5548, 0.5474, 0.5393,
        0.5306, 0.5214, 0.5118, 0.5018, 0.4916, 0.4812, 0.4707, 0.4601, 0.4494, 0.4388, 0.4282,
    ];
    EccParameterDef {
        name: "PEM".to_string(),
        t_start: 5.0,
        e_start: 20.0,
        eta_start: 0.5,
        p_out_rated: 2000.0,
        p_out_min_rel: 0.15,
        p_change_pos: 20.0,
        p_change_neg: 20.0,
        eta: CurveDef::new(load.clone(), eta.clone()),
        eta_mc: CurveDef::new(load, eta),
        e_loadchange: CurveDef::new(vec![0.0, 0.15, 1.0], vec![0.0, 0.0, 20.0]),
        t_cooldown: 60.0,
        split_p_sd: [0.0, 1.0],
        fact_p_heat_p_loss: 0.8,
        norm_limits: [0.0, 1.0],
        techno_economic: None,
    }
}

fn cracker_def() -> EccParameterDef {
    let eta_mc = 0.8 * 0.178 * 33.3 / 5.2;
    EccParameterDef {
        name: "Cracker".to_string(),
        t_start: 30.0,
        e_start: 200.0,
        eta_start: 0.5,
        p_out_rated: 2000.0,
        p_out_min_rel: 0.15,
        p_change_pos: 5.0,
        p_change_neg: 5.0,
        eta: CurveDef::new(vec![0.15, 1.0], vec![0.75, 0.80]),
        eta_mc: CurveDef::new(vec![0.15, 1.0], vec![eta_mc, eta_mc]),
        e_loadchange: CurveDef::new(vec![0.0, 0.15, 1.0], vec![0.0, 0.0, 50.0]),
        t_cooldown: 60.0,
        split_p_sd: [0.95, 0.05],
        fact_p_heat_p_loss: 1.0,
        norm_limits: [0.0, 1.0],
        techno_economic: None,
    }
}

fn component(def: EccParameterDef, ts: f64) -> EnergyConversionComponent {
    let par = EccParameter::new(def, CarrierSet::default()).unwrap();
    EnergyConversionComponent::new(par, minutes(ts), None)
        .unwrap()
        .with_balance_check(BalanceCheck::strict())
}

#[test]
fn cold_start_reaches_minimum_load_after_startup_time() {
    let mut c = component(pem_def(), 1.0);
    let e_start = c.par().e_start();

    let mut heatup_prev = 0.0;
    for step in 1..=5 {
        c.apply_target(1.0).unwrap();
        let s = c.state();
        if step < 5 {
            assert!(s.heatup < 1.0, "step {step}: heatup {}", s.heatup);
            assert_eq!(s.p_out, 0.0);
            let dh = s.heatup - heatup_prev;
            assert!((dh - 0.2).abs() < 1e-9);
            assert!((s.e_in - dh * e_start).abs() < 1e-9);
            assert_eq!(s.e_in_mc, 0.0);
        }
        heatup_prev = s.heatup;
    }

    let s = c.state();
    assert_eq!(s.heatup, 1.0);
    assert!((s.p_out - c.par().p_out_min()).abs() < 1e-9);
    assert!((s.eta - 0.55).abs() < 1e-12);
}

#[test]
fn heat_is_recoverable_share_of_loss() {
    let mut c = component(pem_def(), 1.0);
    for _ in 0..20 {
        c.apply_target(0.8).unwrap();
        let s = c.state();
        assert!((s.e_heat - 0.8 * s.e_loss).abs() < 1e-12);
        assert!((s.p_heat - 0.8 * s.p_loss).abs() < 1e-12);
    }
}

#[test]
fn split_goes_entirely_to_second_path() {
    let mut c = component(pem_def(), 1.0);
    for _ in 0..3 {
        c.apply_target(1.0).unwrap();
        let s = c.state();
        assert_eq!(s.e_in_sd1, 0.0);
        assert!((s.e_in_sd2 - s.e_in).abs() < 1e-12);
    }
}

#[test]
fn ramp_rate_bound_in_load_operation() {
    let mut c = component(cracker_def(), 1.0);
    c.apply_control_stationary(0.15, 200).unwrap();
    let limit = c.par().p_change_pos().max(c.par().p_change_neg()) / 100.0
        * c.par().p_out_rated()
        * c.ts();

    for target in [1.0, 0.3] {
        for _ in 0..40 {
            let before = c.state().p_out;
            c.apply_target(target).unwrap();
            let after = c.state().p_out;
            assert!((after - before).abs() <= limit + 1e-9);
        }
    }
}

#[test]
fn stationary_point_is_a_fixed_point() {
    for target in [0.05, 0.15, 0.4, 0.7, 1.0] {
        let mut c = component(pem_def(), 1.0);
        c.apply_control_stationary(target, 100).unwrap();
        let settled = c.state().clone();
        c.apply_target(target).unwrap();
        assert!((c.state().p_out - settled.p_out).abs() < 1e-9, "target {target}");
        assert!((c.state().e_in - settled.e_in).abs() < 1e-9, "target {target}");
    }
}

#[test]
fn stationary_below_minimum_holds_standby() {
    let mut c = component(pem_def(), 1.0);
    c.apply_control_stationary(0.075, 100).unwrap();
    let s = c.state();
    assert_eq!(s.p_out, 0.0);
    assert!((s.heatup - 0.5).abs() < 1e-9);
    assert!(s.e_in > 0.0);
    assert!((s.e_in - s.e_loss).abs() < 1e-9);
}

#[test]
fn reset_round_trip() {
    let mut c = component(cracker_def(), 1.0);
    let initial = c.state().clone();
    for v in [1.0, 1.0, 0.5, 0.0, 0.8] {
        c.apply_target(v).unwrap();
    }
    c.reset_state();
    assert_eq!(c.state(), &initial);
    assert_eq!(c.state_initial(), &initial);
}

#[test]
fn hypothetical_evaluation_matches_commit() {
    let mut c = component(cracker_def(), 5.0);
    for _ in 0..10 {
        let preview = c
            .apply_control(1.0, &ControlOptions::hypothetical())
            .unwrap()
            .unwrap();
        assert!(c.apply_target(1.0).is_ok());
        assert_eq!(&preview, c.state());
    }
}

#[test]
fn warm_start_from_operating_point() {
    let par = EccParameter::new(cracker_def(), CarrierSet::default()).unwrap();
    let initial = EccState::operating(&par, 0.6).unwrap();
    let mut c = EnergyConversionComponent::new(par, minutes(1.0), Some(initial)).unwrap();
    c.apply_target(0.0).unwrap();
    assert_eq!(c.state().heatup, 1.0);
    assert!((c.state().p_out - 1100.0).abs() < 1e-9);
}

#[test]
fn inverse_lookup_out_of_range() {
    let c = component(cracker_def(), 1.0);
    let par = c.par();
    assert!(matches!(
        c.target_for_p_in_mc(par.p_in_mc_max() * 1.01),
        Err(ComponentError::OutOfRange { .. })
    ));
    assert!(matches!(
        c.p_in_mc_from_p_out(par.p_out_min() * 0.5),
        Err(ComponentError::OutOfRange { .. })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn balance_holds_over_random_control_sequences(
        controls in prop::collection::vec(0.0_f64..=1.0, 1..60),
        ts in prop::sample::select(vec![0.5_f64, 1.0, 3.0, 15.0, 60.0]),
    ) {
        // strict policy: any residual above tolerance fails the step
        let mut c = component(cracker_def(), ts);
        for v in controls {
            c.apply_target(v).unwrap();
            let s = c.state();
            prop_assert!(s.e_balance.abs() < 1e-5);
            prop_assert!((s.e_in - s.e_in_mc - s.e_in_sd1 - s.e_in_sd2).abs() < 1e-5);
            prop_assert!((s.p_in - s.p_in_mc - s.p_in_sd1 - s.p_in_sd2).abs() < 1e-5);
            prop_assert!((0.0..=1.0).contains(&s.heatup));
        }
    }
}

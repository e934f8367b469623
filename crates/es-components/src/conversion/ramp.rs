//! Power ramp calculation for one timestep.
//!
//! Relative output lives on a single axis: `[0, m)` is standby, where the virtual
//! power `heatup * m` stands in for the thermal state, and `[m, ..]` is load
//! operation (`m` = minimum relative load). Movement below `m` is limited by the
//! startup and cooldown rates, movement above `m` by the load ramp limits.

use super::parameter::EccParameter;
use crate::common::{EPSILON_REL, EPSILON_TIME};

/// Which of the six ramp branches a step took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampRegime {
    /// Standby, heating up or holding below minimum load
    StandbyUp,
    /// Standby towards a load target; may reach minimum load within the step
    Startup,
    /// Load operation, ramping up or holding
    LoadUp,
    /// Load operation, ramping down to a target at or above minimum load
    LoadDown,
    /// Load operation towards a standby target; may drop below minimum load
    Shutdown,
    /// Standby, cooling down
    StandbyDown,
}

/// Result of a ramp step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    /// Relative output at the start of the step (virtual below minimum load)
    pub p_rel_0: f64,
    /// Relative output at the end of the step (virtual below minimum load)
    pub p_rel_1: f64,
    pub heatup_1: f64,
    /// Time spent in load operation during the step [min]
    pub t_op: f64,
    pub regime: RampRegime,
}

/// Move from the current state towards `target` (relative output) within `ts` minutes.
pub fn calc_p_change(
    par: &EccParameter,
    heatup_0: f64,
    p_out_0: f64,
    ts: f64,
    target: f64,
) -> Ramp {
    let m = par.p_out_min_rel();
    let p0 = if heatup_0 < 1.0 {
        heatup_0 * m
    } else {
        (p_out_0 / par.p_out_rated()).max(m)
    };

    let (p1, t_op, regime) = if p0 <= target {
        if target < m {
            let p1 = target.min(p0 + par.p_change_start_rel() * ts);
            (p1, 0.0, RampRegime::StandbyUp)
        } else if p0 < m {
            let t_prep = (m - p0) / par.p_change_start_rel();
            if t_prep <= ts + EPSILON_TIME {
                let t_op = (ts - t_prep).max(0.0);
                let p1 = target.min(m + par.p_change_pos_rel() * t_op);
                (p1, t_op, RampRegime::Startup)
            } else {
                let p1 = p0 + par.p_change_start_rel() * ts;
                (p1, 0.0, RampRegime::Startup)
            }
        } else {
            let p1 = target.min(p0 + par.p_change_pos_rel() * ts);
            (p1, ts, RampRegime::LoadUp)
        }
    } else if target >= m {
        let p1 = target.max(p0 - par.p_change_neg_rel() * ts);
        (p1, ts, RampRegime::LoadDown)
    } else if p0 >= m {
        let t_unload = (p0 - m) / par.p_change_neg_rel();
        if t_unload < ts - EPSILON_TIME {
            let t_cool = ts - t_unload;
            let p1 = target.max(m - par.p_change_cooldown_rel() * t_cool);
            (p1, t_unload, RampRegime::Shutdown)
        } else {
            let p1 = m.max(p0 - par.p_change_neg_rel() * ts);
            (p1, ts, RampRegime::Shutdown)
        }
    } else {
        let p1 = target.max(p0 - par.p_change_cooldown_rel() * ts);
        (p1, 0.0, RampRegime::StandbyDown)
    };

    // Arrival at minimum load snaps onto the boundary.
    let (p1, heatup_1) = if p1 >= m - EPSILON_REL {
        (p1.max(m), 1.0)
    } else {
        (p1, (p1 / m).max(0.0))
    };

    Ramp {
        p_rel_0: p0,
        p_rel_1: p1,
        heatup_1,
        t_op,
        regime,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::parameter::fixtures::sofc;

    const TS: f64 = 1.0;

    #[test]
    fn cold_start_heats_at_start_rate() {
        let par = sofc();
        // m = 0.15, t_start = 10 min: 10% of the way per minute
        let r = calc_p_change(&par, 0.0, 0.0, TS, 1.0);
        assert_eq!(r.regime, RampRegime::Startup);
        assert!((r.heatup_1 - 0.1).abs() < 1e-12);
        assert_eq!(r.t_op, 0.0);
    }

    #[test]
    fn standby_target_holds_heatup() {
        let par = sofc();
        let r = calc_p_change(&par, 0.0, 0.0, 100.0, 0.075);
        assert_eq!(r.regime, RampRegime::StandbyUp);
        assert!((r.heatup_1 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn startup_reaches_load_within_step() {
        let par = sofc();
        // half warm: 5 min to minimum load, 5 min of load ramp at 5 %/min
        let r = calc_p_change(&par, 0.5, 0.0, 10.0, 1.0);
        assert_eq!(r.regime, RampRegime::Startup);
        assert_eq!(r.heatup_1, 1.0);
        assert!((r.t_op - 5.0).abs() < 1e-9);
        assert!((r.p_rel_1 - 0.40).abs() < 1e-9);
    }

    #[test]
    fn exact_arrival_at_minimum_load() {
        let par = sofc();
        let r = calc_p_change(&par, 0.9, 0.0, 1.0, 1.0);
        assert_eq!(r.heatup_1, 1.0);
        assert!((r.p_rel_1 - 0.15).abs() < 1e-12);
        assert!(r.t_op.abs() < 1e-9);
    }

    #[test]
    fn load_ramp_is_rate_limited() {
        let par = sofc();
        let r = calc_p_change(&par, 1.0, 300.0, TS, 1.0);
        assert_eq!(r.regime, RampRegime::LoadUp);
        assert!((r.p_rel_1 - 0.20).abs() < 1e-12);
        assert_eq!(r.t_op, TS);

        let r = calc_p_change(&par, 1.0, 2000.0, TS, 0.5);
        assert_eq!(r.regime, RampRegime::LoadDown);
        assert!((r.p_rel_1 - 0.95).abs() < 1e-12);
    }

    #[test]
    fn load_target_is_reached_exactly() {
        let par = sofc();
        let r = calc_p_change(&par, 1.0, 1000.0, 60.0, 0.6);
        assert_eq!(r.p_rel_1, 0.6);
        let r = calc_p_change(&par, 1.0, 1000.0, 60.0, 0.4);
        assert_eq!(r.p_rel_1, 0.4);
    }

    #[test]
    fn shutdown_unloads_then_cools() {
        let par = sofc();
        // 0.25 -> 0.15 takes 2 min, remaining 8 min cool at 0.015/min
        let r = calc_p_change(&par, 1.0, 500.0, 10.0, 0.0);
        assert_eq!(r.regime, RampRegime::Shutdown);
        assert!((r.t_op - 2.0).abs() < 1e-9);
        assert!((r.p_rel_1 - 0.03).abs() < 1e-9);
        assert!((r.heatup_1 - 0.2).abs() < 1e-9);
    }

    #[test]
    fn shutdown_without_reaching_minimum_stays_in_load() {
        let par = sofc();
        let r = calc_p_change(&par, 1.0, 2000.0, TS, 0.0);
        assert_eq!(r.regime, RampRegime::Shutdown);
        assert_eq!(r.heatup_1, 1.0);
        assert!((r.p_rel_1 - 0.95).abs() < 1e-12);
        assert_eq!(r.t_op, TS);
    }

    #[test]
    fn standby_cools_down_to_target() {
        let par = sofc();
        let r = calc_p_change(&par, 0.5, 0.0, TS, 0.0);
        assert_eq!(r.regime, RampRegime::StandbyDown);
        assert!((r.heatup_1 - 0.4).abs() < 1e-12);

        let r = calc_p_change(&par, 0.05, 0.0, TS, 0.0);
        assert_eq!(r.heatup_1, 0.0);
    }
}

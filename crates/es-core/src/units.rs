// es-core/src/units.rs

use uom::si::f64::Time as UomTime;

/// Component timesteps are carried as uom times.
pub type Time = UomTime;

#[inline]
pub fn minutes(v: f64) -> Time {
    use uom::si::time::minute;
    Time::new::<minute>(v)
}

/// Time expressed in minutes, the engine's internal timestep unit.
#[inline]
pub fn as_minutes(t: Time) -> f64 {
    use uom::si::time::minute;
    t.get::<minute>()
}

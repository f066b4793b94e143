//! Shared movement convention: flight time, the spin-free baseline and the
//! closed-form link between break and acceleration.
//!
//! Break is the plate-crossing difference between a pitch and a ball released
//! with the same velocity under gravity alone, evaluated at the pitch's own
//! flight time `T`. Both trajectories start from the same position and
//! velocity, so only the `½·a·T²` terms differ:
//!
//! ```text
//! ax = 2·(hBreak/12) / T²
//! az = -g + 2·(vBreak/12) / T²
//! ```
//!
//! `ay` depends on release speed only (see [`crate::calibration`]), so the
//! flight time never depends on the transverse movement.

use crate::calibration::{DragCurve, PolynomialDragCurve};
use crate::constants::{Constants, INCHES_PER_FOOT};
use crate::vector::Vec3;

/// Smaller positive root of `y0 + vy0·T + ½·ay·T² = 0`.
///
/// Written as `2·y0 / (-vy0 + √(vy0² - 2·ay·y0))`, which equals
/// `(-vy0 - √(vy0² - 2·ay·y0)) / ay` without the cancellation. Returns `None`
/// when `ay ≤ 0`, the discriminant is negative, the ball is not moving toward
/// the plate, or the inputs are not finite.
pub fn solve_flight_time(vy0: f64, ay: f64, y0: f64) -> Option<f64> {
    if !(vy0.is_finite() && ay.is_finite() && y0.is_finite()) {
        return None;
    }
    if ay <= 0.0 || y0 <= 0.0 || vy0 >= 0.0 {
        return None;
    }
    let disc = vy0 * vy0 - 2.0 * ay * y0;
    if disc < 0.0 {
        return None;
    }
    let t = 2.0 * y0 / (-vy0 + disc.sqrt());
    (t.is_finite() && t > 0.0).then_some(t)
}

/// Movement model parameterised by its drag calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementModel<D = PolynomialDragCurve> {
    constants: Constants,
    drag: D,
}

impl<D: DragCurve + Default> Default for MovementModel<D> {
    fn default() -> Self {
        Self::new(Constants::default(), D::default())
    }
}

impl<D: DragCurve> MovementModel<D> {
    /// Model over `constants` with `drag` as the speed → `ay` calibration.
    pub fn new(constants: Constants, drag: D) -> Self {
        Self { constants, drag }
    }

    /// Physical constants and design limits in use.
    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    /// See [`solve_flight_time`].
    pub fn flight_time(&self, vy0: f64, ay: f64, y0: f64) -> Option<f64> {
        solve_flight_time(vy0, ay, y0)
    }

    /// Along-path deceleration (ft/s²) from release speed alone.
    pub fn drag_deceleration(&self, speed_mph: f64) -> f64 {
        self.drag.deceleration(speed_mph)
    }

    /// Transverse (x, z) displacement from release that a gravity-only ball
    /// accumulates in `t`.
    pub fn spin_free_displacement(&self, vx0: f64, vz0: f64, t: f64) -> (f64, f64) {
        (vx0 * t, vz0 * t - 0.5 * self.constants.gravity * t * t)
    }

    /// (x, z) position at `t` of a gravity-only ball released at (x0, z0)
    /// with transverse velocity (vx0, vz0). This is the zero-movement baseline
    /// break is measured against.
    pub fn spin_free_endpoint(&self, x0: f64, z0: f64, vx0: f64, vz0: f64, t: f64) -> (f64, f64) {
        let (dx, dz) = self.spin_free_displacement(vx0, vz0, t);
        (x0 + dx, z0 + dz)
    }

    /// Spin-free plate position for a full release state.
    pub fn spin_free_position(&self, release: Vec3, velocity: Vec3, ay: f64, t: f64) -> Vec3 {
        let gravity_only = Vec3::new(0.0, ay, -self.constants.gravity);
        release.advance(&velocity, &gravity_only, t)
    }

    /// (ax, az) in ft/s² that produce the given break (inches) over `t`.
    pub fn break_to_acceleration(&self, h_break_in: f64, v_break_in: f64, t: f64) -> (f64, f64) {
        let t2 = t * t;
        let ax = 2.0 * (h_break_in / INCHES_PER_FOOT) / t2;
        let az = -self.constants.gravity + 2.0 * (v_break_in / INCHES_PER_FOOT) / t2;
        (ax, az)
    }

    /// Break (inches) that (ax, az) produce over `t`.
    pub fn acceleration_to_break(&self, ax: f64, az: f64, t: f64) -> (f64, f64) {
        let half_t2 = 0.5 * t * t;
        let h = ax * half_t2 * INCHES_PER_FOOT;
        let v = (az + self.constants.gravity) * half_t2 * INCHES_PER_FOOT;
        (h, v)
    }
}

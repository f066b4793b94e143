//! Reduction of observed measurements and pitch designs to [`Kinematics`].
//!
//! The design path is solved in one pass: `ay` comes from speed alone, which
//! fixes `T`; break over `T` fixes (ax, az); and the target fixes (vx0, vz0).
//! Nothing feeds back into `T`, so no iteration is needed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calibration::{DragCurve, PolynomialDragCurve};
use crate::constants::MPH_TO_FPS;
use crate::error::{PitchError, Result};
use crate::kinematics::{DesignSpec, Kinematics, ObservedPitch};
use crate::movement::MovementModel;
use crate::vector::Vec3;

/// Where a pitch comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PitchSource {
    /// Measured release state and acceleration
    Observed(ObservedPitch),
    /// Speed, break and release point to solve for
    Design(DesignSpec),
}

/// Turns observed records and design specs into kinematics.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicsResolver<D = PolynomialDragCurve> {
    model: MovementModel<D>,
}

impl<D: DragCurve + Default> Default for KinematicsResolver<D> {
    fn default() -> Self {
        Self::new(MovementModel::default())
    }
}

impl<D: DragCurve> KinematicsResolver<D> {
    /// Resolver over `model`.
    pub fn new(model: MovementModel<D>) -> Self {
        Self { model }
    }

    /// Movement model designs are solved with.
    pub fn model(&self) -> &MovementModel<D> {
        &self.model
    }

    /// Resolve either kind of source.
    pub fn resolve(&self, source: &PitchSource) -> Result<Kinematics> {
        match source {
            PitchSource::Observed(record) => self.from_observed(record),
            PitchSource::Design(spec) => self.from_design(spec, None),
        }
    }

    /// Pass-through for a fully specified measurement.
    ///
    /// Every field is required; the first absent one is reported as
    /// `MissingField`. NaN or infinite values are `MalformedInput`.
    pub fn from_observed(&self, record: &ObservedPitch) -> Result<Kinematics> {
        let vx0 = ObservedPitch::require("vx0", record.vx0)?;
        let vy0 = ObservedPitch::require("vy0", record.vy0)?;
        let vz0 = ObservedPitch::require("vz0", record.vz0)?;
        let ax = ObservedPitch::require("ax", record.ax)?;
        let ay = ObservedPitch::require("ay", record.ay)?;
        let az = ObservedPitch::require("az", record.az)?;
        let x0 = ObservedPitch::require("release_pos_x", record.release_pos_x)?;
        let z0 = ObservedPitch::require("release_pos_z", record.release_pos_z)?;
        let extension = ObservedPitch::require("release_extension", record.release_extension)?;

        Kinematics::from_extension(
            self.model.constants(),
            x0,
            z0,
            extension,
            Vec3::new(vx0, vy0, vz0),
            Vec3::new(ax, ay, az),
        )
    }

    /// Numeric and speed-window checks shared by every design path.
    pub(crate) fn validate_design(&self, spec: &DesignSpec) -> Result<()> {
        spec.validate_numbers()?;
        let constants = self.model.constants();
        if spec.speed_mph < constants.min_speed_mph || spec.speed_mph > constants.max_speed_mph {
            return Err(PitchError::InvalidPitchSpec(format!(
                "{}: speed {:.1} mph outside {:.0}-{:.0} mph",
                spec.name, spec.speed_mph, constants.min_speed_mph, constants.max_speed_mph
            )));
        }
        Ok(())
    }

    /// Solve a design so it shows the requested break and crosses the plate
    /// at the target.
    ///
    /// The target is taken from `target`, then `spec.target`, then the
    /// configured default plate location.
    pub fn from_design(&self, spec: &DesignSpec, target: Option<(f64, f64)>) -> Result<Kinematics> {
        self.validate_design(spec)?;
        let constants = self.model.constants();

        let (target_x, target_z) = match target.or(spec.target) {
            Some((x, z)) => (
                crate::error::ensure_finite("target_x", x)?,
                crate::error::ensure_finite("target_z", z)?,
            ),
            None => constants.default_target,
        };

        let extension = spec.extension.unwrap_or(constants.default_extension);
        let y0 = constants.release_y(extension);
        if extension < 0.0 || y0 <= 0.0 {
            return Err(PitchError::InvalidPitchSpec(format!(
                "{}: release extension {:.2} ft puts release at y0={:.2}",
                spec.name, extension, y0
            )));
        }
        let release = Vec3::new(spec.release_x, y0, spec.release_z);

        // 1. Deceleration from speed alone
        let ay = self.model.drag_deceleration(spec.speed_mph);

        // 2. Flight time; vy0 is the speed projected on the release→target line
        let aim = Vec3::new(target_x, 0.0, target_z) - release;
        let vy0 = spec.speed_mph * MPH_TO_FPS * aim.y / aim.magnitude();
        let t = self.model.flight_time(vy0, ay, y0).ok_or_else(|| {
            PitchError::InvalidPitchSpec(format!(
                "{}: no plate crossing at {:.1} mph (vy0={:.2}, ay={:.2})",
                spec.name, spec.speed_mph, vy0, ay
            ))
        })?;

        // 3. Transverse acceleration from break over the same T
        let (ax, az) = self.model.break_to_acceleration(spec.horizontal_break, spec.vertical_break, t);

        // 4. Transverse velocity that lands on the target
        let half_t2 = 0.5 * t * t;
        let vx0 = (target_x - release.x - ax * half_t2) / t;
        let vz0 = (target_z - release.z - az * half_t2) / t;

        let limit = constants.max_transverse_velocity;
        if vx0.abs() > limit || vz0.abs() > limit {
            return Err(PitchError::InvalidPitchSpec(format!(
                "{}: solved release velocity ({:.1}, {:.1}) ft/s exceeds {:.1} ft/s",
                spec.name, vx0, vz0, limit
            )));
        }

        let kinematics = Kinematics::new(release, Vec3::new(vx0, vy0, vz0), Vec3::new(ax, ay, az))?;
        debug!(
            "Resolved design '{}': T={:.4}s a=({:.2}, {:.2}, {:.2}) ft/s²",
            spec.name,
            kinematics.flight_time_seconds(),
            ax,
            ay,
            az
        );
        Ok(kinematics)
    }
}

//! Constant-acceleration pitch descriptions and the records they are built from.
//!
//! A [`Kinematics`] value is the canonical form every pitch is reduced to:
//! release position, initial velocity, constant acceleration, and the derived
//! flight time `T` to the plate (y = 0). It is immutable; anything that changes
//! a pitch builds a new value.

use serde::{Deserialize, Serialize};

use crate::constants::{Constants, MPH_TO_FPS};
use crate::error::{PitchError, Result};
use crate::movement::solve_flight_time;
use crate::vector::Vec3;

/// Anything that can report its position and velocity over a finite flight.
///
/// Implemented by single-phase [`Kinematics`] and by two-phase tunneled
/// descriptors, so the sampler does not care which one it is walking.
pub trait Flight {
    /// Seconds from release to plate crossing.
    fn flight_time(&self) -> f64;

    /// Position and velocity at `t`, with `t` clamped to `[0, flight_time]`.
    fn state_at(&self, t: f64) -> (Vec3, Vec3);

    /// Position at `t`.
    fn position_at(&self, t: f64) -> Vec3 {
        self.state_at(t).0
    }

    /// Velocity at `t`.
    fn velocity_at(&self, t: f64) -> Vec3 {
        self.state_at(t).1
    }

    /// Position at t = T.
    fn plate_crossing(&self) -> Vec3 {
        self.position_at(self.flight_time())
    }
}

/// Release state plus constant acceleration, with the flight time it implies.
///
/// Deserialization goes through [`Kinematics::new`], so a stored flight time
/// is checked against the release state rather than trusted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "KinematicsRecord", into = "KinematicsRecord")]
pub struct Kinematics {
    release: Vec3,
    velocity: Vec3,
    acceleration: Vec3,
    flight_time: f64,
}

impl Kinematics {
    /// Build from a release point, velocity and acceleration.
    ///
    /// Fails with `MalformedInput` on non-finite numbers and with
    /// `InvalidPitchSpec` when the ball never reaches y = 0.
    pub fn new(release: Vec3, velocity: Vec3, acceleration: Vec3) -> Result<Self> {
        for (field, value) in [
            ("x0", release.x),
            ("y0", release.y),
            ("z0", release.z),
            ("vx0", velocity.x),
            ("vy0", velocity.y),
            ("vz0", velocity.z),
            ("ax", acceleration.x),
            ("ay", acceleration.y),
            ("az", acceleration.z),
        ] {
            crate::error::ensure_finite(field, value)?;
        }

        let flight_time = solve_flight_time(velocity.y, acceleration.y, release.y).ok_or_else(|| {
            PitchError::InvalidPitchSpec(format!(
                "no plate crossing for y0={:.3} vy0={:.3} ay={:.3}",
                release.y, velocity.y, acceleration.y
            ))
        })?;

        Ok(Self { release, velocity, acceleration, flight_time })
    }

    /// Build from release (x0, z0) and an extension in front of the rubber.
    pub fn from_extension(
        constants: &Constants,
        x0: f64,
        z0: f64,
        extension: f64,
        velocity: Vec3,
        acceleration: Vec3,
    ) -> Result<Self> {
        crate::error::ensure_finite("release_extension", extension)?;
        Self::new(Vec3::new(x0, constants.release_y(extension), z0), velocity, acceleration)
    }

    /// Release position (ft).
    pub fn release(&self) -> Vec3 {
        self.release
    }

    /// Velocity at release (ft/s).
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Constant acceleration (ft/s²).
    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    /// Flight time in seconds, for syncing playback to physical time.
    pub fn flight_time_seconds(&self) -> f64 {
        self.flight_time
    }

    /// Release extension implied by y0.
    pub fn extension(&self, constants: &Constants) -> f64 {
        constants.rubber_to_plate - self.release.y
    }

    /// Speed out of the hand (mph).
    pub fn release_speed_mph(&self) -> f64 {
        self.velocity.magnitude() / MPH_TO_FPS
    }

    /// Time at which the ball is `distance` feet from the plate (y = distance).
    ///
    /// `None` when the ball never passes that distance during its flight.
    pub fn time_at_distance_from_plate(&self, distance: f64) -> Option<f64> {
        if !distance.is_finite() || distance < 0.0 || distance >= self.release.y {
            return None;
        }
        solve_flight_time(self.velocity.y, self.acceleration.y, self.release.y - distance)
    }

    /// Position where the ball passes the front edge of the plate.
    pub fn front_of_plate_crossing(&self, constants: &Constants) -> Option<Vec3> {
        self.time_at_distance_from_plate(constants.plate_front)
            .map(|t| self.position_at(t))
    }
}

impl Flight for Kinematics {
    fn flight_time(&self) -> f64 {
        self.flight_time
    }

    fn state_at(&self, t: f64) -> (Vec3, Vec3) {
        let t = t.max(0.0).min(self.flight_time);
        let position = self.release.advance(&self.velocity, &self.acceleration, t);
        let velocity = self.velocity + self.acceleration * t;
        (position, velocity)
    }
}

/// Wire form of [`Kinematics`]. The flight time is written out for consumers
/// and verified on the way back in.
#[derive(Serialize, Deserialize)]
struct KinematicsRecord {
    release: Vec3,
    velocity: Vec3,
    acceleration: Vec3,
    #[serde(default)]
    flight_time: Option<f64>,
}

impl From<Kinematics> for KinematicsRecord {
    fn from(k: Kinematics) -> Self {
        Self {
            release: k.release,
            velocity: k.velocity,
            acceleration: k.acceleration,
            flight_time: Some(k.flight_time),
        }
    }
}

impl TryFrom<KinematicsRecord> for Kinematics {
    type Error = PitchError;

    fn try_from(record: KinematicsRecord) -> Result<Self> {
        let kinematics = Self::new(record.release, record.velocity, record.acceleration)?;
        if let Some(stored) = record.flight_time {
            if !agrees(stored, kinematics.flight_time) {
                return Err(PitchError::InvalidPitchSpec(format!(
                    "stored flight time {} does not match {:.6}s implied by the release state",
                    stored, kinematics.flight_time
                )));
            }
        }
        Ok(kinematics)
    }
}

/// Stored derived value matches its recomputation.
pub(crate) fn agrees(stored: f64, derived: f64) -> bool {
    (stored - derived).abs() <= 1e-9 * derived.abs().max(1.0)
}

/// Physical measurement for one pitch as supplied by an external data layer.
///
/// Fields are optional because upstream feeds routinely drop columns.
/// Units: feet, seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ObservedPitch {
    /// Release velocity, x (ft/s)
    pub vx0: Option<f64>,
    /// Release velocity, y (ft/s)
    pub vy0: Option<f64>,
    /// Release velocity, z (ft/s)
    pub vz0: Option<f64>,
    /// Horizontal acceleration (ft/s²)
    pub ax: Option<f64>,
    /// Deceleration along y (ft/s²)
    pub ay: Option<f64>,
    /// Vertical acceleration (ft/s²)
    pub az: Option<f64>,
    /// Release side (ft)
    pub release_pos_x: Option<f64>,
    /// Release height (ft)
    pub release_pos_z: Option<f64>,
    /// Feet in front of the rubber
    pub release_extension: Option<f64>,
}

impl ObservedPitch {
    /// Record with every field present.
    #[allow(clippy::too_many_arguments)]
    pub fn complete(
        vx0: f64,
        vy0: f64,
        vz0: f64,
        ax: f64,
        ay: f64,
        az: f64,
        release_pos_x: f64,
        release_pos_z: f64,
        release_extension: f64,
    ) -> Self {
        Self {
            vx0: Some(vx0),
            vy0: Some(vy0),
            vz0: Some(vz0),
            ax: Some(ax),
            ay: Some(ay),
            az: Some(az),
            release_pos_x: Some(release_pos_x),
            release_pos_z: Some(release_pos_z),
            release_extension: Some(release_extension),
        }
    }

    /// Take a field or fail with `MissingField`.
    pub(crate) fn require(field: &'static str, value: Option<f64>) -> Result<f64> {
        value.ok_or(PitchError::MissingField(field))
    }
}

/// Pitch-design input.
///
/// Break follows the catcher's-view convention: positive `horizontal_break`
/// moves the ball toward +x (first-base side), positive `vertical_break`
/// (induced vertical break) moves it up relative to a gravity-only flight.
///
/// A design resolved on its own honours both break and target. As the
/// follower of a tunneled pair, the post-commit acceleration is fixed by the
/// target and break is not used, unless the pair is built in break mode with
/// [`crate::tunnel::TunnelSynthesizer::build_with_break`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSpec {
    /// Label used in logs and errors
    pub name: String,
    /// Release speed (mph)
    pub speed_mph: f64,
    /// Inches
    pub horizontal_break: f64,
    /// Inches
    pub vertical_break: f64,
    /// Release side (ft)
    pub release_x: f64,
    /// Release height (ft)
    pub release_z: f64,
    /// Plate location (x, z) in feet
    pub target: Option<(f64, f64)>,
    /// Feet in front of the rubber
    pub extension: Option<f64>,
}

impl DesignSpec {
    /// Design with no target and the default extension.
    pub fn new(
        name: impl Into<String>,
        speed_mph: f64,
        horizontal_break: f64,
        vertical_break: f64,
        release_x: f64,
        release_z: f64,
    ) -> Self {
        Self {
            name: name.into(),
            speed_mph,
            horizontal_break,
            vertical_break,
            release_x,
            release_z,
            target: None,
            extension: None,
        }
    }

    /// Aim at plate location (x, z) in feet.
    pub fn with_target(mut self, x: f64, z: f64) -> Self {
        self.target = Some((x, z));
        self
    }

    /// Release this many feet in front of the rubber.
    pub fn with_extension(mut self, extension: f64) -> Self {
        self.extension = Some(extension);
        self
    }

    /// Same pitch thrown from the other side: x, horizontal break and target x
    /// change sign.
    pub fn mirrored(&self) -> Self {
        Self {
            name: self.name.clone(),
            horizontal_break: -self.horizontal_break,
            release_x: -self.release_x,
            target: self.target.map(|(x, z)| (-x, z)),
            ..self.clone()
        }
    }

    /// Reject NaN and infinite inputs.
    pub(crate) fn validate_numbers(&self) -> Result<()> {
        use crate::error::ensure_finite;
        ensure_finite("speed_mph", self.speed_mph)?;
        ensure_finite("horizontal_break", self.horizontal_break)?;
        ensure_finite("vertical_break", self.vertical_break)?;
        ensure_finite("release_x", self.release_x)?;
        ensure_finite("release_z", self.release_z)?;
        if let Some((x, z)) = self.target {
            ensure_finite("target_x", x)?;
            ensure_finite("target_z", z)?;
        }
        if let Some(extension) = self.extension {
            ensure_finite("extension", extension)?;
        }
        Ok(())
    }
}

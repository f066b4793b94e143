//! Tunneled pitch pairs.
//!
//! A tunneled follower shares the reference pitch's exact flight up to a
//! commitment time, then switches to its own constant acceleration for the rest
//! of the way to the plate. The result is a closed two-phase description; the
//! sampler walks it like any other [`Flight`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calibration::{DragCurve, PolynomialDragCurve};
use crate::constants::{Constants, DEFAULT_COMMIT_DISTANCE_FT, INCHES_PER_FOOT};
use crate::error::{ensure_finite, PitchError, Result};
use crate::kinematics::{agrees, DesignSpec, Flight, Kinematics};
use crate::resolver::KinematicsResolver;
use crate::vector::Vec3;

/// Where the hitter commits, either as flight time or as distance from the
/// plate along the reference pitch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CommitPoint {
    /// Seconds after release
    Time(f64),
    /// Feet in front of the plate
    DistanceFromPlate(f64),
}

impl Default for CommitPoint {
    fn default() -> Self {
        CommitPoint::DistanceFromPlate(DEFAULT_COMMIT_DISTANCE_FT)
    }
}

impl CommitPoint {
    /// Commit time along `reference`.
    pub fn time_along(&self, reference: &Kinematics) -> Result<f64> {
        match *self {
            CommitPoint::Time(t) => ensure_finite("commit_time", t),
            CommitPoint::DistanceFromPlate(d) => {
                let d = ensure_finite("commit_distance", d)?;
                reference.time_at_distance_from_plate(d).ok_or(PitchError::InvalidTunnelPoint {
                    value: d,
                    min: 0.0,
                    max: reference.release().y,
                })
            }
        }
    }
}

/// Everything needed to synthesize one tunneled follower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TunnelRequest {
    /// Pitch the follower shares its early flight with
    pub reference: Kinematics,
    /// Where the two pitches split
    pub commit: CommitPoint,
    /// Diverging pitch
    pub follower: DesignSpec,
}

/// Two-phase description: the reference until `commit_time`, then `phase2`
/// with its clock starting at the seam.
///
/// Deserialized values are rebuilt through the same checks as synthesized
/// ones: the commit time must lie inside phase 1, phase 2 must start on the
/// seam, and any stored score must match the plate crossings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TunneledRecord", into = "TunneledRecord")]
pub struct TunneledKinematics {
    phase1: Kinematics,
    commit_time: f64,
    phase2: Kinematics,
    tunnel_score: f64,
}

impl TunneledKinematics {
    /// Join two phases at `commit_time`.
    fn assemble(phase1: Kinematics, commit_time: f64, phase2: Kinematics) -> Result<Self> {
        let commit_time = ensure_finite("commit_time", commit_time)?;
        let window = phase1.flight_time_seconds();
        if commit_time <= 0.0 || commit_time >= window {
            return Err(PitchError::InvalidTunnelPoint {
                value: commit_time,
                min: 0.0,
                max: window,
            });
        }

        let (seam_position, seam_velocity) = phase1.state_at(commit_time);
        if seam_position.distance(&phase2.release()) > SEAM_TOLERANCE
            || seam_velocity.distance(&phase2.velocity()) > SEAM_TOLERANCE
        {
            return Err(PitchError::InvalidPitchSpec(format!(
                "phase 2 does not start on the seam at {:.4}s",
                commit_time
            )));
        }

        let tunnel_score =
            phase1.plate_crossing().distance_xz(&phase2.plate_crossing()) * INCHES_PER_FOOT;
        Ok(Self { phase1, commit_time, phase2, tunnel_score })
    }

    /// Reference kinematics; only `[0, commit_time]` of it is flown.
    pub fn phase1(&self) -> &Kinematics {
        &self.phase1
    }

    /// Seconds after release at which the pitches split.
    pub fn commit_time(&self) -> f64 {
        self.commit_time
    }

    /// Post-commit kinematics, released from the seam at local t = 0.
    pub fn phase2(&self) -> &Kinematics {
        &self.phase2
    }

    /// Position and velocity shared by both phases at the commit time.
    pub fn seam_state(&self) -> (Vec3, Vec3) {
        (self.phase2.release(), self.phase2.velocity())
    }

    /// Plate-crossing separation from the reference, in inches.
    ///
    /// Zero is valid: both pitches land on the same spot.
    pub fn tunnel_score_inches(&self) -> f64 {
        self.tunnel_score
    }

    /// (horizontal, vertical) inches the follower moves after the seam,
    /// relative to a gravity-only continuation from the seam.
    pub fn post_commit_break(&self, constants: &Constants) -> (f64, f64) {
        let a = self.phase2.acceleration();
        let half_t2 = 0.5 * self.phase2.flight_time_seconds().powi(2);
        (
            a.x * half_t2 * INCHES_PER_FOOT,
            (a.z + constants.gravity) * half_t2 * INCHES_PER_FOOT,
        )
    }
}

/// Largest seam mismatch (ft, ft/s) accepted when rebuilding a pair.
const SEAM_TOLERANCE: f64 = 1e-9;

/// Wire form of [`TunneledKinematics`].
#[derive(Serialize, Deserialize)]
struct TunneledRecord {
    phase1: Kinematics,
    commit_time: f64,
    phase2: Kinematics,
    #[serde(default)]
    tunnel_score: Option<f64>,
}

impl From<TunneledKinematics> for TunneledRecord {
    fn from(k: TunneledKinematics) -> Self {
        Self {
            phase1: k.phase1,
            commit_time: k.commit_time,
            phase2: k.phase2,
            tunnel_score: Some(k.tunnel_score),
        }
    }
}

impl TryFrom<TunneledRecord> for TunneledKinematics {
    type Error = PitchError;

    fn try_from(record: TunneledRecord) -> Result<Self> {
        let pair = Self::assemble(record.phase1, record.commit_time, record.phase2)?;
        if let Some(stored) = record.tunnel_score {
            if !agrees(stored, pair.tunnel_score) {
                return Err(PitchError::InvalidPitchSpec(format!(
                    "stored tunnel score {} does not match {:.4} in",
                    stored, pair.tunnel_score
                )));
            }
        }
        Ok(pair)
    }
}

impl Flight for TunneledKinematics {
    fn flight_time(&self) -> f64 {
        self.commit_time + self.phase2.flight_time_seconds()
    }

    fn state_at(&self, t: f64) -> (Vec3, Vec3) {
        let t = t.max(0.0).min(self.flight_time());
        if t <= self.commit_time {
            self.phase1.state_at(t)
        } else {
            self.phase2.state_at(t - self.commit_time)
        }
    }
}

/// A single pitch or a tunneled pair's follower, ready for sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FlightPath {
    /// One constant-acceleration flight
    Single(Kinematics),
    /// Follower of a tunneled pair
    Tunneled(TunneledKinematics),
}

impl Flight for FlightPath {
    fn flight_time(&self) -> f64 {
        match self {
            FlightPath::Single(k) => k.flight_time(),
            FlightPath::Tunneled(k) => k.flight_time(),
        }
    }

    fn state_at(&self, t: f64) -> (Vec3, Vec3) {
        match self {
            FlightPath::Single(k) => k.state_at(t),
            FlightPath::Tunneled(k) => k.state_at(t),
        }
    }
}

impl From<Kinematics> for FlightPath {
    fn from(k: Kinematics) -> Self {
        FlightPath::Single(k)
    }
}

impl From<TunneledKinematics> for FlightPath {
    fn from(k: TunneledKinematics) -> Self {
        FlightPath::Tunneled(k)
    }
}

/// Builds tunneled followers on top of the resolver's movement model.
#[derive(Debug, Clone, PartialEq)]
pub struct TunnelSynthesizer<D = PolynomialDragCurve> {
    resolver: KinematicsResolver<D>,
}

impl<D: DragCurve + Default> Default for TunnelSynthesizer<D> {
    fn default() -> Self {
        Self::new(KinematicsResolver::default())
    }
}

impl<D: DragCurve> TunnelSynthesizer<D> {
    /// Synthesizer sharing `resolver`'s movement model and design checks.
    pub fn new(resolver: KinematicsResolver<D>) -> Self {
        Self { resolver }
    }

    /// Resolver used for design validation.
    pub fn resolver(&self) -> &KinematicsResolver<D> {
        &self.resolver
    }

    /// [`build`](Self::build) with the commit point taken from the request.
    pub fn build_request(&self, request: &TunnelRequest) -> Result<TunneledKinematics> {
        let commit_time = request.commit.time_along(&request.reference)?;
        self.build(&request.reference, &request.follower, commit_time)
    }

    /// Build the follower of a tunneled pair.
    ///
    /// # Arguments
    /// * `reference` - pitch whose flight is shared up to the commit time
    /// * `follower` - speed and target of the diverging pitch
    /// * `commit_time` - seconds after release, strictly inside the reference flight
    ///
    /// After the seam the follower keeps the seam velocity, decelerates along
    /// y at its own speed's rate, and takes whatever (ax, az) land it on its
    /// target. A follower without a target aims at the configured default
    /// plate location, the same as a design resolved on its own.
    pub fn build(
        &self,
        reference: &Kinematics,
        follower: &DesignSpec,
        commit_time: f64,
    ) -> Result<TunneledKinematics> {
        let target = match follower.target {
            Some((x, z)) => (ensure_finite("target_x", x)?, ensure_finite("target_z", z)?),
            None => self.resolver.model().constants().default_target,
        };
        self.synthesize(reference, follower, commit_time, PostCommit::Target(target))
    }

    /// Build the follower so it shows its own break over the remaining flight,
    /// ignoring any target.
    ///
    /// Break is measured against a gravity-only continuation from the seam.
    pub fn build_with_break(
        &self,
        reference: &Kinematics,
        follower: &DesignSpec,
        commit_time: f64,
    ) -> Result<TunneledKinematics> {
        self.synthesize(reference, follower, commit_time, PostCommit::Break)
    }

    fn synthesize(
        &self,
        reference: &Kinematics,
        follower: &DesignSpec,
        commit_time: f64,
        post_commit: PostCommit,
    ) -> Result<TunneledKinematics> {
        let commit_time = ensure_finite("commit_time", commit_time)?;
        let window = reference.flight_time_seconds();
        if commit_time <= 0.0 || commit_time >= window {
            return Err(PitchError::InvalidTunnelPoint {
                value: commit_time,
                min: 0.0,
                max: window,
            });
        }
        self.resolver.validate_design(follower)?;
        let model = self.resolver.model();

        let (seam_position, seam_velocity) = reference.state_at(commit_time);

        let ay = model.drag_deceleration(follower.speed_mph);
        let remaining = model
            .flight_time(seam_velocity.y, ay, seam_position.y)
            .ok_or_else(|| {
                PitchError::InvalidPitchSpec(format!(
                    "{}: no plate crossing after commit at {:.3}s (ay={:.2})",
                    follower.name, commit_time, ay
                ))
            })?;

        let (ax, az) = match post_commit {
            PostCommit::Target((tx, tz)) => {
                let inv_half_t2 = 2.0 / (remaining * remaining);
                (
                    (tx - seam_position.x - seam_velocity.x * remaining) * inv_half_t2,
                    (tz - seam_position.z - seam_velocity.z * remaining) * inv_half_t2,
                )
            }
            PostCommit::Break => model.break_to_acceleration(
                follower.horizontal_break,
                follower.vertical_break,
                remaining,
            ),
        };

        let phase2 = Kinematics::new(seam_position, seam_velocity, Vec3::new(ax, ay, az))?;
        let pair = TunneledKinematics::assemble(*reference, commit_time, phase2)?;

        debug!(
            "Tunneled '{}' at {:.3}s: remaining {:.4}s, separation {:.2} in",
            follower.name,
            commit_time,
            remaining,
            pair.tunnel_score_inches()
        );
        Ok(pair)
    }
}

/// How the follower's post-commit (ax, az) are chosen.
#[derive(Debug, Clone, Copy)]
enum PostCommit {
    Target((f64, f64)),
    Break,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn reference() -> Kinematics {
        let resolver: KinematicsResolver = KinematicsResolver::default();
        let spec = DesignSpec::new("Four-seam", 95.0, -8.0, 16.0, -1.5, 6.0).with_target(0.0, 2.5);
        resolver.from_design(&spec, None).unwrap()
    }

    fn changeup() -> DesignSpec {
        DesignSpec::new("Changeup", 87.0, 3.0, -2.0, -1.5, 6.0).with_target(0.3, 1.8)
    }

    #[test]
    fn test_scenario_b_tunnel_score() {
        let synth: TunnelSynthesizer = TunnelSynthesizer::default();
        let pair = synth.build(&reference(), &changeup(), 0.10).unwrap();

        let score = pair.tunnel_score_inches();
        assert!(score > 0.0);
        assert_relative_eq!(score, 0.3_f64.hypot(0.7) * 12.0, epsilon = 1e-6);

        // Reproducible
        let again = synth.build(&reference(), &changeup(), 0.10).unwrap();
        assert_eq!(pair, again);

        let plate = pair.plate_crossing();
        assert_abs_diff_eq!(plate.x, 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(plate.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(plate.z, 1.8, epsilon = 1e-6);
    }

    #[test]
    fn test_seam_continuity() {
        let synth: TunnelSynthesizer = TunnelSynthesizer::default();
        let reference = reference();
        let pair = synth.build(&reference, &changeup(), 0.10).unwrap();

        let (p_ref, v_ref) = reference.state_at(0.10);
        let (p_seam, v_seam) = pair.seam_state();
        assert_abs_diff_eq!(p_ref.distance(&p_seam), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(v_ref.distance(&v_seam), 0.0, epsilon = 1e-9);

        // Approaching the seam from the phase-2 side lands on the same state
        let (p_after, _) = pair.state_at(0.10 + 1e-12);
        assert_abs_diff_eq!(p_after.distance(&p_ref), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_identical_before_commit() {
        let synth: TunnelSynthesizer = TunnelSynthesizer::default();
        let reference = reference();
        let pair = synth.build(&reference, &changeup(), 0.15).unwrap();
        for i in 0..=30 {
            let t = 0.15 * i as f64 / 30.0;
            assert_abs_diff_eq!(pair.position_at(t).distance(&reference.position_at(t)), 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(pair.velocity_at(t).distance(&reference.velocity_at(t)), 0.0, epsilon = 1e-9);
        }
        // and different afterwards
        assert!(pair.plate_crossing().distance_xz(&reference.plate_crossing()) > 0.1);
    }

    #[test]
    fn test_zero_separation_is_valid() {
        let synth: TunnelSynthesizer = TunnelSynthesizer::default();
        let reference = reference();
        let plate = reference.plate_crossing();
        let twin = DesignSpec::new("Twin", 95.0, -8.0, 16.0, -1.5, 6.0).with_target(plate.x, plate.z);
        let pair = synth.build(&reference, &twin, 0.2).unwrap();
        assert_abs_diff_eq!(pair.tunnel_score_inches(), 0.0, epsilon = 1e-6);
        // Same speed, same target: the follower is the reference
        assert_relative_eq!(pair.flight_time(), reference.flight_time_seconds(), epsilon = 1e-9);
    }

    #[test]
    fn test_break_mode() {
        let synth: TunnelSynthesizer = TunnelSynthesizer::default();
        let reference = reference();
        let constants = *synth.resolver().model().constants();
        // Target is ignored in break mode
        let slider = DesignSpec::new("Slider", 88.0, 5.0, 3.0, -1.5, 6.0).with_target(2.0, 0.5);
        let pair = synth.build_with_break(&reference, &slider, 0.12).unwrap();

        let (h, v) = pair.post_commit_break(&constants);
        assert_relative_eq!(h, 5.0, epsilon = 1e-9);
        assert_relative_eq!(v, 3.0, epsilon = 1e-9);

        // Relative to the gravity-only continuation from the seam
        let (seam_p, seam_v) = pair.seam_state();
        let remaining = pair.phase2().flight_time_seconds();
        let model = synth.resolver().model();
        let (x, z) = model.spin_free_endpoint(seam_p.x, seam_p.z, seam_v.x, seam_v.z, remaining);
        let plate = pair.plate_crossing();
        assert_abs_diff_eq!((plate.x - x) * 12.0, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!((plate.z - z) * 12.0, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_missing_target_uses_default() {
        let synth: TunnelSynthesizer = TunnelSynthesizer::default();
        let reference = reference();
        let untargeted = DesignSpec::new("Slider", 88.0, 5.0, 3.0, -1.5, 6.0);
        let pair = synth.build(&reference, &untargeted, 0.12).unwrap();

        let (x, z) = synth.resolver().model().constants().default_target;
        let plate = pair.plate_crossing();
        assert_abs_diff_eq!(plate.x, x, epsilon = 1e-6);
        assert_abs_diff_eq!(plate.z, z, epsilon = 1e-6);

        // Same landing spot as resolving the design on its own
        let alone = synth.resolver().from_design(&untargeted, None).unwrap();
        assert_abs_diff_eq!(plate.distance_xz(&alone.plate_crossing()), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_serde_round_trip() {
        let synth: TunnelSynthesizer = TunnelSynthesizer::default();
        let pair = synth.build(&reference(), &changeup(), 0.10).unwrap();
        let json = serde_json::to_string(&pair).unwrap();
        let back: TunneledKinematics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pair);

        let path: FlightPath = serde_json::from_str(&serde_json::to_string(&FlightPath::from(pair)).unwrap()).unwrap();
        assert_eq!(path.plate_crossing(), pair.plate_crossing());
    }

    #[test]
    fn test_deserialize_rejects_tampered_pair() {
        let synth: TunnelSynthesizer = TunnelSynthesizer::default();
        let pair = synth.build(&reference(), &changeup(), 0.10).unwrap();
        let value = serde_json::to_value(pair).unwrap();

        let mut score = value.clone();
        score["tunnel_score"] = serde_json::json!(0.5);
        assert!(serde_json::from_value::<TunneledKinematics>(score).is_err());

        for commit in [-1.0, 0.0, 5.0] {
            let mut window = value.clone();
            window["commit_time"] = serde_json::json!(commit);
            assert!(serde_json::from_value::<TunneledKinematics>(window).is_err());
        }

        // Commit moved without moving phase 2 off the reference
        let mut seam = value.clone();
        seam["commit_time"] = serde_json::json!(0.15);
        let err = serde_json::from_value::<TunneledKinematics>(seam).unwrap_err().to_string();
        assert!(err.contains("seam"), "{err}");

        let mut untouched = value;
        untouched.as_object_mut().unwrap().remove("tunnel_score");
        let back: TunneledKinematics = serde_json::from_value(untouched).unwrap();
        assert_relative_eq!(back.tunnel_score_inches(), pair.tunnel_score_inches());
    }

    #[test]
    fn test_commit_outside_window() {
        let synth: TunnelSynthesizer = TunnelSynthesizer::default();
        let reference = reference();
        let t_ref = reference.flight_time_seconds();
        for commit in [0.0, -0.05, t_ref, t_ref + 0.1] {
            assert!(matches!(
                synth.build(&reference, &changeup(), commit),
                Err(PitchError::InvalidTunnelPoint { .. })
            ));
        }
        assert!(matches!(
            synth.build(&reference, &changeup(), f64::NAN),
            Err(PitchError::MalformedInput { field: "commit_time", .. })
        ));
    }

    #[test]
    fn test_commit_by_distance() {
        let synth: TunnelSynthesizer = TunnelSynthesizer::default();
        let request = TunnelRequest {
            reference: reference(),
            commit: CommitPoint::default(),
            follower: changeup(),
        };
        let pair = synth.build_request(&request).unwrap();
        assert_relative_eq!(pair.seam_state().0.y, DEFAULT_COMMIT_DISTANCE_FT, epsilon = 1e-9);

        let too_far = TunnelRequest { commit: CommitPoint::DistanceFromPlate(70.0), ..request.clone() };
        assert!(matches!(
            synth.build_request(&too_far),
            Err(PitchError::InvalidTunnelPoint { .. })
        ));
    }

    #[test]
    fn test_flight_path_dispatch() {
        let synth: TunnelSynthesizer = TunnelSynthesizer::default();
        let reference = reference();
        let pair = synth.build(&reference, &changeup(), 0.1).unwrap();

        let single: FlightPath = reference.into();
        let tunneled: FlightPath = pair.into();
        assert_eq!(single.flight_time(), reference.flight_time_seconds());
        assert_eq!(tunneled.flight_time(), pair.flight_time());
        assert_eq!(tunneled.position_at(0.05), reference.position_at(0.05));
    }
}

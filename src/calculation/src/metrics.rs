//! Per-pitch summary metrics computed from a flight.
//!
//! These are the numbers a report tile or design panel shows next to a
//! trajectory: speeds, flight time, measured break, plate location and
//! approach angles.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{Constants, INCHES_PER_FOOT, MPH_TO_FPS};
use crate::kinematics::Flight;

/// Container for pitch metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchMetrics {
    /// Seconds from release to the plate
    pub flight_time: f64,
    /// Speed out of the hand (mph)
    pub release_speed_mph: f64,
    /// Speed at the plate (mph)
    pub plate_speed_mph: f64,
    /// Inches, +x toward the first-base side
    pub horizontal_break: f64,
    /// Inches, induced (gravity removed)
    pub induced_vertical_break: f64,
    /// Plate crossing, side (ft)
    pub plate_x: f64,
    /// Plate crossing, height (ft)
    pub plate_z: f64,
    /// Degrees below horizontal are negative
    pub vertical_approach_angle: f64,
    /// Degrees, negative when moving toward -x
    pub horizontal_approach_angle: f64,
}

impl PitchMetrics {
    /// Measure any flight, single or two-phase.
    ///
    /// Break is the plate-crossing difference from a gravity-only ball with the
    /// same release state, evaluated at the flight's own `T`.
    pub fn from_flight<F: Flight + ?Sized>(flight: &F, constants: &Constants) -> Self {
        let t = flight.flight_time();
        let (release, v0) = flight.state_at(0.0);
        let (plate, vf) = flight.state_at(t);

        let spin_free_x = release.x + v0.x * t;
        let spin_free_z = release.z + v0.z * t - 0.5 * constants.gravity * t * t;

        Self {
            flight_time: t,
            release_speed_mph: v0.magnitude() / MPH_TO_FPS,
            plate_speed_mph: vf.magnitude() / MPH_TO_FPS,
            horizontal_break: (plate.x - spin_free_x) * INCHES_PER_FOOT,
            induced_vertical_break: (plate.z - spin_free_z) * INCHES_PER_FOOT,
            plate_x: plate.x,
            plate_z: plate.z,
            vertical_approach_angle: (vf.z / -vf.y).atan().to_degrees(),
            horizontal_approach_angle: (vf.x / -vf.y).atan().to_degrees(),
        }
    }

    /// Speed lost between release and plate (mph).
    pub fn speed_loss_mph(&self) -> f64 {
        self.release_speed_mph - self.plate_speed_mph
    }

    /// Get a summary of metrics as a hash map for reporting.
    pub fn summary(&self) -> HashMap<String, f64> {
        let mut summary = HashMap::new();
        summary.insert("flight_time".to_string(), self.flight_time);
        summary.insert("release_speed_mph".to_string(), self.release_speed_mph);
        summary.insert("plate_speed_mph".to_string(), self.plate_speed_mph);
        summary.insert("horizontal_break".to_string(), self.horizontal_break);
        summary.insert("induced_vertical_break".to_string(), self.induced_vertical_break);
        summary.insert("plate_x".to_string(), self.plate_x);
        summary.insert("plate_z".to_string(), self.plate_z);
        summary.insert("vertical_approach_angle".to_string(), self.vertical_approach_angle);
        summary.insert("horizontal_approach_angle".to_string(), self.horizontal_approach_angle);
        summary
    }
}

/// Separation between two plate crossings in inches.
pub fn plate_separation_inches(a: &PitchMetrics, b: &PitchMetrics) -> f64 {
    (a.plate_x - b.plate_x).hypot(a.plate_z - b.plate_z) * INCHES_PER_FOOT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::DesignSpec;
    use crate::resolver::KinematicsResolver;
    use crate::tunnel::TunnelSynthesizer;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_metrics_match_design() {
        let resolver: KinematicsResolver = KinematicsResolver::default();
        let spec = DesignSpec::new("Four-seam", 95.0, -8.0, 16.0, -1.5, 6.0).with_target(0.0, 2.5);
        let k = resolver.from_design(&spec, None).unwrap();
        let m = PitchMetrics::from_flight(&k, resolver.model().constants());

        assert_abs_diff_eq!(m.horizontal_break, -8.0, epsilon = 1e-6);
        assert_abs_diff_eq!(m.induced_vertical_break, 16.0, epsilon = 1e-6);
        assert_abs_diff_eq!(m.plate_x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(m.plate_z, 2.5, epsilon = 1e-6);
        assert_relative_eq!(m.flight_time, k.flight_time_seconds());

        // The design speed sets vy0, so the full release speed lands close to it
        assert!(m.release_speed_mph > 94.5 && m.release_speed_mph < 96.0);
        assert!(m.speed_loss_mph() > 0.0);
        // Descending into the zone
        assert!(m.vertical_approach_angle < 0.0);
        assert!(m.vertical_approach_angle > -10.0);
    }

    #[test]
    fn test_metrics_for_tunneled_pair() {
        let resolver: KinematicsResolver = KinematicsResolver::default();
        let constants = *resolver.model().constants();
        let reference = resolver
            .from_design(&DesignSpec::new("Four-seam", 95.0, -8.0, 16.0, -1.5, 6.0), Some((0.0, 2.5)))
            .unwrap();
        let follower = DesignSpec::new("Changeup", 87.0, 3.0, -2.0, -1.5, 6.0).with_target(0.3, 1.8);
        let pair = TunnelSynthesizer::new(resolver).build(&reference, &follower, 0.1).unwrap();

        let m_ref = PitchMetrics::from_flight(&reference, &constants);
        let m_pair = PitchMetrics::from_flight(&pair, &constants);
        assert_relative_eq!(m_ref.release_speed_mph, m_pair.release_speed_mph);
        assert_relative_eq!(
            plate_separation_inches(&m_ref, &m_pair),
            pair.tunnel_score_inches(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_summary_keys() {
        let resolver: KinematicsResolver = KinematicsResolver::default();
        let spec = DesignSpec::new("Curve", 78.0, 6.0, -12.0, 1.5, 6.1);
        let k = resolver.from_design(&spec, None).unwrap();
        let summary = PitchMetrics::from_flight(&k, &Constants::default()).summary();
        assert_eq!(summary.len(), 9);
        assert!(summary.contains_key("flight_time"));
        assert!(summary.contains_key("vertical_approach_angle"));
    }
}

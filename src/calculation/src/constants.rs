//! Physical constants and engine tuning values for pitch flight calculations.
//!
//! All distances are in feet, times in seconds and speeds in ft/s unless the
//! name says otherwise. The coordinate frame is the catcher's view: +x toward
//! the first-base side, +y from the plate toward the mound, +z up. The back tip
//! of home plate is the origin.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Gravitational acceleration (ft/s²)
pub const GRAVITY_FPS2: f64 = 32.174;

/// Front edge of the pitching rubber to the back tip of home plate (ft)
pub const RUBBER_TO_PLATE_FT: f64 = 60.5;

/// Front edge of home plate, measured from the back tip (ft)
pub const PLATE_FRONT_Y_FT: f64 = 17.0 / 12.0;

/// Typical release extension in front of the rubber (ft)
pub const DEFAULT_RELEASE_EXTENSION_FT: f64 = 6.0;

/// Miles per hour to feet per second
pub const MPH_TO_FPS: f64 = 5280.0 / 3600.0;

/// Inches per foot
pub const INCHES_PER_FOOT: f64 = 12.0;

/// Distance from the plate at which a hitter is usually taken to commit (ft)
pub const DEFAULT_COMMIT_DISTANCE_FT: f64 = 23.8;

/// Tunable values used by the resolver and synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constants {
    /// Gravitational acceleration (ft/s²)
    pub gravity: f64,

    /// Rubber to back tip of plate (ft)
    pub rubber_to_plate: f64,

    /// Front edge of the plate (ft from the back tip)
    pub plate_front: f64,

    /// Release extension used when a design does not give one (ft)
    pub default_extension: f64,

    /// Plate location a design aims at when it has no target (x, z in ft)
    pub default_target: (f64, f64),

    /// Slowest release speed accepted for a design (mph)
    pub min_speed_mph: f64,

    /// Fastest release speed accepted for a design (mph)
    pub max_speed_mph: f64,

    /// Largest |vx0| or |vz0| a solved design may need (ft/s)
    pub max_transverse_velocity: f64,
}

impl Constants {
    /// Create a new Constants instance with default values.
    pub const fn new() -> Self {
        Self {
            gravity: GRAVITY_FPS2,
            rubber_to_plate: RUBBER_TO_PLATE_FT,
            plate_front: PLATE_FRONT_Y_FT,
            default_extension: DEFAULT_RELEASE_EXTENSION_FT,
            default_target: (0.0, 2.5),
            min_speed_mph: 30.0,
            max_speed_mph: 110.0,
            max_transverse_velocity: 50.0,
        }
    }

    /// Release distance from the plate for a given extension.
    #[inline(always)]
    pub fn release_y(&self, extension: f64) -> f64 {
        self.rubber_to_plate - extension
    }

    /// Get a summary of constants as a hash map for reporting.
    pub fn summary(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("g (ft/s²)".to_string(), format!("{:.3}", self.gravity));
        map.insert("Rubber to plate (ft)".to_string(), format!("{:.2}", self.rubber_to_plate));
        map.insert("Plate front (ft)".to_string(), format!("{:.4}", self.plate_front));
        map.insert("Default extension (ft)".to_string(), format!("{:.2}", self.default_extension));
        map.insert(
            "Default target (ft)".to_string(),
            format!("({:.2}, {:.2})", self.default_target.0, self.default_target.1),
        );
        map.insert(
            "Speed window (mph)".to_string(),
            format!("{:.0}-{:.0}", self.min_speed_mph, self.max_speed_mph),
        );
        map.insert(
            "Max transverse velocity (ft/s)".to_string(),
            format!("{:.1}", self.max_transverse_velocity),
        );
        map
    }
}

impl Default for Constants {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_constants() {
        let c = Constants::new();
        assert_eq!(c.gravity, 32.174);
        assert_eq!(c.rubber_to_plate, 60.5);
        assert_relative_eq!(c.plate_front, 1.416_666_666_666_666_7, epsilon = 1e-12);
        assert_eq!(c, Constants::default());
    }

    #[test]
    fn test_release_y() {
        let c = Constants::new();
        assert_relative_eq!(c.release_y(6.0), 54.5);
        assert_relative_eq!(c.release_y(DEFAULT_RELEASE_EXTENSION_FT), 54.5);
    }

    #[test]
    fn test_mph_conversion() {
        // 60 mph is exactly 88 ft/s
        assert_relative_eq!(60.0 * MPH_TO_FPS, 88.0, epsilon = 1e-12);
    }

    #[test]
    fn test_summary_keys() {
        let summary = Constants::new().summary();
        assert!(summary.contains_key("g (ft/s²)"));
        assert!(summary.contains_key("Speed window (mph)"));
        assert_eq!(summary["Rubber to plate (ft)"], "60.50");
    }
}

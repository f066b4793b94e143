//! Analytic sampling of flights into ordered feet-space points.
//!
//! Sampling is pure: the same flight and step count always produce the same
//! points, so landing markers and scrubbed playback are reproducible. Points
//! carry no camera or projection; renderers project them however they like.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PitchError, Result};
use crate::kinematics::Flight;

/// One sample along a flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    /// Side (ft)
    pub x: f64,
    /// Distance from the plate (ft)
    pub y: f64,
    /// Height (ft)
    pub z: f64,
    /// Seconds since release
    pub t: f64,
}

/// Step counts for common quality levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SamplingPreset {
    /// 24 points
    Draft,
    /// 60 points
    #[default]
    Standard,
    /// 200 points
    Fine,
}

impl SamplingPreset {
    /// Number of points sampled at this preset.
    pub fn steps(&self) -> usize {
        match self {
            SamplingPreset::Draft => 24,
            SamplingPreset::Standard => 60,
            SamplingPreset::Fine => 200,
        }
    }
}

/// Stateless sampler.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrajectorySampler;

impl TrajectorySampler {
    /// `steps` points with t evenly spaced over `[0, T]`.
    ///
    /// The first point is the release, the last is the plate crossing.
    /// Fewer than two steps or a non-finite flight time give an empty vector.
    pub fn sample<F: Flight + ?Sized>(&self, flight: &F, steps: usize) -> Vec<TrajectoryPoint> {
        let total = flight.flight_time();
        if steps < 2 || !total.is_finite() || total <= 0.0 {
            debug!("Skipping degenerate flight (steps={}, T={})", steps, total);
            return Vec::new();
        }

        let last = (steps - 1) as f64;
        (0..steps)
            .map(|i| {
                // Pin the final sample to T exactly
                let t = if i == steps - 1 { total } else { total * i as f64 / last };
                let p = flight.position_at(t);
                TrajectoryPoint { x: p.x, y: p.y, z: p.z, t }
            })
            .collect()
    }

    /// [`sample`](Self::sample) at a preset step count.
    pub fn sample_preset<F: Flight + ?Sized>(&self, flight: &F, preset: SamplingPreset) -> Vec<TrajectoryPoint> {
        self.sample(flight, preset.steps())
    }

    /// Absent flights sample to an empty vector.
    pub fn sample_optional<F: Flight>(&self, flight: Option<&F>, steps: usize) -> Vec<TrajectoryPoint> {
        match flight {
            Some(f) => self.sample(f, steps),
            None => Vec::new(),
        }
    }

    /// Sample the outcome of a resolution, turning any failure into an empty
    /// vector.
    ///
    /// Incomplete or unsolvable pitches are logged at debug level; malformed
    /// numbers get a warning so callers notice bad upstream data.
    pub fn sample_resolved<F: Flight>(&self, resolved: &Result<F>, steps: usize) -> Vec<TrajectoryPoint> {
        match resolved {
            Ok(flight) => self.sample(flight, steps),
            Err(err @ PitchError::MalformedInput { .. }) => {
                warn!("Skipping pitch with malformed input: {}", err);
                Vec::new()
            }
            Err(err) => {
                debug!("Skipping unresolved pitch: {}", err);
                Vec::new()
            }
        }
    }

    /// Sample a batch, keeping slot order; missing entries stay empty.
    pub fn sample_batch<F: Flight>(&self, flights: &[Option<F>], steps: usize) -> Vec<Vec<TrajectoryPoint>> {
        flights
            .iter()
            .map(|f| self.sample_optional(f.as_ref(), steps))
            .collect()
    }
}

/// Longest flight time in a batch, so a playback surface can run the whole
/// batch over true physical time. Zero for an empty batch.
pub fn playback_duration<F: Flight>(flights: &[Option<F>]) -> f64 {
    flights
        .iter()
        .flatten()
        .map(|f| f.flight_time())
        .filter(|t| t.is_finite())
        .fold(0.0, f64::max)
}

/// Points as an `n × 4` array with columns `t, x, y, z`.
pub fn to_array(points: &[TrajectoryPoint]) -> Array2<f64> {
    let mut out = Array2::<f64>::zeros((points.len(), 4));
    for (i, p) in points.iter().enumerate() {
        out[(i, 0)] = p.t;
        out[(i, 1)] = p.x;
        out[(i, 2)] = p.y;
        out[(i, 3)] = p.z;
    }
    out
}

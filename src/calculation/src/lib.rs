//! Closed-form flight paths for thrown baseballs.
//!
//! This library provides:
//! - Flight-time solving and the break ⇄ acceleration convention
//! - Resolution of observed measurements and pitch designs to kinematics
//! - Analytic trajectory sampling for render loops
//! - Tunneled pitch pairs that share flight up to a commitment point
//! - Speed-only drag calibration and per-pitch metrics
//!
//! # Model
//!
//! Every pitch is a constant-acceleration flight: position, velocity and
//! acceleration at release, with `y` running from the release point (≈55 ft)
//! down to the plate at `y = 0`. There is no aerodynamic integration; the model
//! matches the precision of the measurement convention it reproduces.
//!
//! All outputs are plain feet-space points. Camera and projection belong to
//! whatever renders them.

#![warn(missing_docs)]
#![allow(clippy::doc_markdown)]

// Core modules
pub mod calibration;
pub mod constants;
pub mod error;
pub mod kinematics;
pub mod metrics;
pub mod movement;
pub mod resolver;
pub mod sampler;
pub mod tunnel;
pub mod vector;

// Re-export key types and functions for easy use
pub use calibration::{DragCurve, PolynomialDragCurve};
pub use constants::Constants;
pub use error::{PitchError, Result};
pub use kinematics::{DesignSpec, Flight, Kinematics, ObservedPitch};
pub use metrics::PitchMetrics;
pub use movement::MovementModel;
pub use resolver::{KinematicsResolver, PitchSource};
pub use sampler::{SamplingPreset, TrajectoryPoint, TrajectorySampler};
pub use tunnel::{CommitPoint, FlightPath, TunnelRequest, TunnelSynthesizer, TunneledKinematics};
pub use vector::Vec3;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

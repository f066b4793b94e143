//! Speed-only drag calibration.
//!
//! The along-path deceleration `ay` is modelled as a function of release speed
//! alone. The default curve is a pure quadratic, `ay = 0.0031·mph²`, which gives
//! roughly 28 ft/s² at 95 mph, 23.5 ft/s² at 87 mph and 15 ft/s² at 70 mph.
//! Any other monotonic curve can be dropped in through [`DragCurve`], or fitted
//! from measured (speed, ay) pairs with [`PolynomialDragCurve::fit`].

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{PitchError, Result};

/// Speed → along-path deceleration mapping.
pub trait DragCurve {
    /// Deceleration `ay` (ft/s², positive) for a release speed in mph.
    fn deceleration(&self, speed_mph: f64) -> f64;
}

/// Polynomial in mph with coefficients in ascending power order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialDragCurve {
    coefficients: Vec<f64>,
}

impl Default for PolynomialDragCurve {
    fn default() -> Self {
        Self::new(vec![0.0, 0.0, 0.0031])
    }
}

impl PolynomialDragCurve {
    /// Curve from ascending coefficients `c0 + c1·v + c2·v² + ...`.
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    /// Coefficients in ascending power order.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Least-squares fit of `ay` against speed.
    ///
    /// # Arguments
    /// * `samples` - (speed mph, ay ft/s²) pairs
    /// * `degree` - polynomial degree, at least 1
    ///
    /// The fitted curve must stay positive and increasing over the sampled
    /// speed range, otherwise a `Calibration` error is returned.
    pub fn fit(samples: &[(f64, f64)], degree: usize) -> Result<Self> {
        if degree == 0 {
            return Err(PitchError::Calibration("degree must be at least 1".to_string()));
        }
        if samples.len() <= degree {
            return Err(PitchError::Calibration(format!(
                "need more than {} samples for a degree {} fit, got {}",
                degree,
                degree,
                samples.len()
            )));
        }
        if samples.iter().any(|(v, a)| !v.is_finite() || !a.is_finite()) {
            return Err(PitchError::Calibration("samples must be finite".to_string()));
        }

        // Speeds are scaled to ~1 so the normal equations stay well conditioned
        let scale = samples.iter().map(|s| s.0.abs()).fold(0.0, f64::max).max(1.0);

        // Design matrix with ascending powers
        let n = samples.len();
        let mut x = Array2::<f64>::zeros((n, degree + 1));
        let mut y = Array1::<f64>::zeros(n);
        for (i, &(speed, ay)) in samples.iter().enumerate() {
            for j in 0..=degree {
                x[(i, j)] = (speed / scale).powi(j as i32);
            }
            y[i] = ay;
        }

        // Normal equations
        let xt = x.t();
        let xtx = xt.dot(&x);
        let xty = xt.dot(&y);
        let scaled = solve_linear(xtx, xty)?;

        let coefficients = scaled
            .iter()
            .enumerate()
            .map(|(j, c)| c / scale.powi(j as i32))
            .collect();
        let curve = Self::new(coefficients);
        curve.check_shape(samples)?;
        Ok(curve)
    }

    /// Derivative with respect to speed.
    fn slope(&self, speed_mph: f64) -> f64 {
        self.coefficients
            .iter()
            .enumerate()
            .skip(1)
            .map(|(power, c)| power as f64 * c * speed_mph.powi(power as i32 - 1))
            .sum()
    }

    fn check_shape(&self, samples: &[(f64, f64)]) -> Result<()> {
        let lo = samples.iter().map(|s| s.0).fold(f64::INFINITY, f64::min);
        let hi = samples.iter().map(|s| s.0).fold(f64::NEG_INFINITY, f64::max);
        if hi <= lo {
            return Err(PitchError::Calibration(
                "samples must span more than one speed".to_string(),
            ));
        }

        const CHECKS: usize = 64;
        for k in 0..=CHECKS {
            let speed = lo + (hi - lo) * k as f64 / CHECKS as f64;
            if self.deceleration(speed) <= 0.0 {
                return Err(PitchError::Calibration(format!(
                    "fitted deceleration is not positive at {speed:.1} mph"
                )));
            }
            if self.slope(speed) < 0.0 {
                return Err(PitchError::Calibration(format!(
                    "fitted curve decreases at {speed:.1} mph"
                )));
            }
        }
        Ok(())
    }
}

impl DragCurve for PolynomialDragCurve {
    fn deceleration(&self, speed_mph: f64) -> f64 {
        // Horner, highest power first
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * speed_mph + c)
    }
}

/// Gaussian elimination with partial pivoting for the small normal-equation
/// systems produced by [`PolynomialDragCurve::fit`].
fn solve_linear(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[(i, col)].abs().total_cmp(&a[(j, col)].abs()))
            .unwrap_or(col);
        if a[(pivot, col)].abs() < 1e-12 {
            return Err(PitchError::Calibration("singular normal equations".to_string()));
        }
        if pivot != col {
            for k in 0..n {
                a.swap((pivot, k), (col, k));
            }
            b.swap(pivot, col);
        }
        for row in col + 1..n {
            let factor = a[(row, col)] / a[(col, col)];
            for k in col..n {
                a[(row, k)] -= factor * a[(col, k)];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[(row, k)] * x[k]).sum();
        x[row] = (b[row] - tail) / a[(row, row)];
    }
    Ok(x)
}

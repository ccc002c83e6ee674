//! Butterworth low-pass filter design and application.
//!
//! Design follows the standard analog-prototype route: unit-circle
//! prototype poles, frequency pre-warp, low-pass scaling, bilinear
//! transform. The resulting transfer-function coefficients match the
//! classic `butter(order, cutoff / nyquist, 'low')` design, and are
//! applied as a causal direct-form II transposed filter.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::error::{DspError, Result};

/// Digital filter transfer-function coefficients.
///
/// `b` is the feedforward (numerator) side, `a` the feedback (denominator)
/// side, both of length `order + 1` with `a[0] == 1`. Computed on demand
/// for a given cutoff and sample rate; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCoefficients {
    /// Feedforward coefficients.
    pub b: Vec<f64>,
    /// Feedback coefficients, leading coefficient normalized to 1.
    pub a: Vec<f64>,
}

impl FilterCoefficients {
    /// Design a Butterworth low-pass filter.
    ///
    /// `cutoff_hz` must lie strictly between 0 and the Nyquist frequency
    /// (`sample_rate / 2`); `order` must be at least 1.
    ///
    /// # Errors
    ///
    /// [`DspError::InvalidCutoff`] for an out-of-range cutoff,
    /// [`DspError::InvalidOrder`] for a zero order.
    pub fn butterworth_lowpass(order: usize, cutoff_hz: f64, sample_rate: u32) -> Result<Self> {
        let nyquist = 0.5 * sample_rate as f64;
        if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 || cutoff_hz >= nyquist {
            return Err(DspError::InvalidCutoff {
                cutoff: cutoff_hz,
                nyquist,
            });
        }
        if order == 0 {
            return Err(DspError::InvalidOrder(0));
        }

        let wn = cutoff_hz / nyquist;

        // Analog prototype: n poles evenly spaced on the left half of the
        // unit circle, no zeros, unit gain.
        let prototype: Vec<Complex64> = (0..order)
            .map(|k| {
                let theta = PI * (2.0 * k as f64 + order as f64 + 1.0) / (2.0 * order as f64);
                Complex64::from_polar(1.0, theta)
            })
            .collect();

        // Pre-warp the digital cutoff onto the analog frequency axis
        // (internal sampling grid of 2 samples/sec), then scale the
        // prototype to that cutoff.
        let warped = 4.0 * (PI * wn / 2.0).tan();
        let poles: Vec<Complex64> = prototype.iter().map(|&p| p * warped).collect();
        let gain = warped.powi(order as i32);

        // Bilinear transform onto the z-plane. Every analog pole maps to
        // (fs2 + p) / (fs2 - p); the n zeros at analog infinity land at
        // z = -1.
        let fs2 = 4.0;
        let z_poles: Vec<Complex64> = poles
            .iter()
            .map(|&p| (fs2 + p) / (fs2 - p))
            .collect();
        let denom: Complex64 = poles
            .iter()
            .map(|&p| fs2 - p)
            .product();
        let k_z = gain * (Complex64::new(1.0, 0.0) / denom).re;

        let z_zeros = vec![Complex64::new(-1.0, 0.0); order];
        // Conjugate-symmetric root sets expand to real polynomials; the
        // imaginary parts are numerical noise.
        let b: Vec<f64> = poly_from_roots(&z_zeros).iter().map(|c| c.re * k_z).collect();
        let a: Vec<f64> = poly_from_roots(&z_poles).iter().map(|c| c.re).collect();

        tracing::debug!(order, cutoff_hz, sample_rate, "Designed Butterworth low-pass");
        Ok(Self { b, a })
    }

    /// Filter order (number of feedback taps).
    pub fn order(&self) -> usize {
        self.a.len() - 1
    }

    /// Apply the filter causally over a channel with zero initial state.
    ///
    /// Direct-form II transposed, f64 state, one pass front to back.
    pub fn apply(&self, input: &[f32]) -> Vec<f32> {
        let mut state = vec![0.0f64; self.order()];
        let mut out = Vec::with_capacity(input.len());
        for &x in input {
            let x = x as f64;
            let y = self.b[0] * x + state.first().copied().unwrap_or(0.0);
            for i in 0..state.len() {
                let carry = if i + 1 < state.len() { state[i + 1] } else { 0.0 };
                state[i] = self.b[i + 1] * x - self.a[i + 1] * y + carry;
            }
            out.push(y as f32);
        }
        out
    }
}

/// Expand a monic polynomial from its roots, highest power first.
fn poly_from_roots(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        let mut next = vec![Complex64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= root * c;
        }
        coeffs = next;
    }
    coeffs
}

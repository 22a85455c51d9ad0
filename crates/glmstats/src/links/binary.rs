//! Links for probabilities: logit, probit, cauchy and complementary log-log.
//!
//! Probit uses the standard normal CDF through `statrs`' complementary error
//! function; cauchy uses the closed-form Cauchy CDF.

use std::f64::consts::{FRAC_1_SQRT_2, PI, SQRT_2};

use statrs::function::erf::{erfc, erfc_inv};

use crate::constants::CLIP_EPS;

const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Clip μ into [ε, 1 - ε].
#[inline]
pub(super) fn clean(mu: f64) -> f64 {
    mu.clamp(CLIP_EPS, 1.0 - CLIP_EPS)
}

// -----------------------------------------------------------------------------
// Logit
// -----------------------------------------------------------------------------

#[inline]
pub(super) fn logit(mu: f64) -> f64 {
    (mu / (1.0 - mu)).ln()
}

#[inline]
pub(super) fn logit_inverse(eta: f64) -> f64 {
    // Branch on the sign to keep exp() from overflowing
    if eta >= 0.0 {
        1.0 / (1.0 + (-eta).exp())
    } else {
        let e = eta.exp();
        e / (1.0 + e)
    }
}

#[inline]
pub(super) fn logit_derivative(mu: f64) -> f64 {
    1.0 / (mu * (1.0 - mu))
}

#[inline]
pub(super) fn logit_inverse_derivative(eta: f64) -> f64 {
    let p = logit_inverse(eta);
    p * (1.0 - p)
}

// -----------------------------------------------------------------------------
// Probit
// -----------------------------------------------------------------------------

#[inline]
fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

#[inline]
fn normal_ppf(p: f64) -> f64 {
    -SQRT_2 * erfc_inv(2.0 * p)
}

#[inline]
fn normal_pdf(x: f64) -> f64 {
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

#[inline]
pub(super) fn probit(mu: f64) -> f64 {
    normal_ppf(mu)
}

#[inline]
pub(super) fn probit_inverse(eta: f64) -> f64 {
    normal_cdf(eta)
}

#[inline]
pub(super) fn probit_derivative(mu: f64) -> f64 {
    1.0 / normal_pdf(normal_ppf(mu))
}

#[inline]
pub(super) fn probit_inverse_derivative(eta: f64) -> f64 {
    normal_pdf(eta)
}

// -----------------------------------------------------------------------------
// Cauchy
// -----------------------------------------------------------------------------

#[inline]
pub(super) fn cauchy(mu: f64) -> f64 {
    (PI * (mu - 0.5)).tan()
}

#[inline]
pub(super) fn cauchy_inverse(eta: f64) -> f64 {
    0.5 + eta.atan() / PI
}

#[inline]
pub(super) fn cauchy_derivative(mu: f64) -> f64 {
    let c = (PI * (mu - 0.5)).cos();
    PI / (c * c)
}

#[inline]
pub(super) fn cauchy_inverse_derivative(eta: f64) -> f64 {
    1.0 / (PI * (1.0 + eta * eta))
}

// -----------------------------------------------------------------------------
// Complementary log-log
// -----------------------------------------------------------------------------

#[inline]
pub(super) fn cloglog(mu: f64) -> f64 {
    (-(1.0 - mu).ln()).ln()
}

#[inline]
pub(super) fn cloglog_inverse(eta: f64) -> f64 {
    1.0 - (-eta.exp()).exp()
}

#[inline]
pub(super) fn cloglog_derivative(mu: f64) -> f64 {
    1.0 / ((mu - 1.0) * (1.0 - mu).ln())
}

#[inline]
pub(super) fn cloglog_inverse_derivative(eta: f64) -> f64 {
    (eta - eta.exp()).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_logit_midpoint() {
        assert_abs_diff_eq!(logit(0.5), 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(logit_inverse(0.0), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(logit_derivative(0.5), 4.0, epsilon = 1e-15);
    }

    #[test]
    fn test_logit_inverse_is_stable_for_large_eta() {
        assert!(logit_inverse(800.0) <= 1.0);
        assert!(logit_inverse(-800.0) >= 0.0);
        assert!(logit_inverse(-800.0).is_finite());
    }

    #[test]
    fn test_probit_known_quantile() {
        assert_abs_diff_eq!(probit(0.975), 1.959963984540054, epsilon = 1e-9);
        assert_abs_diff_eq!(probit_inverse(0.0), 0.5, epsilon = 1e-15);
        // 1/φ(0) = √(2π)
        assert_abs_diff_eq!(probit_derivative(0.5), (2.0 * PI).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_cauchy_quartiles() {
        assert_abs_diff_eq!(cauchy(0.75), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cauchy_inverse(-1.0), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_cloglog_at_zero() {
        assert_abs_diff_eq!(cloglog_inverse(0.0), 1.0 - (-1.0f64).exp(), epsilon = 1e-15);
    }
}

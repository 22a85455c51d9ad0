//! Log-scale links: the log link and the Negative Binomial link.

use crate::constants::CLIP_EPS;

/// Clip μ away from zero.
#[inline]
pub(super) fn clean(mu: f64) -> f64 {
    mu.max(CLIP_EPS)
}

#[inline]
pub(super) fn link(mu: f64) -> f64 {
    mu.ln()
}

#[inline]
pub(super) fn inverse(eta: f64) -> f64 {
    eta.exp()
}

#[inline]
pub(super) fn derivative(mu: f64) -> f64 {
    1.0 / mu
}

#[inline]
pub(super) fn inverse_derivative(eta: f64) -> f64 {
    eta.exp()
}

/// η = ln(αμ / (1 + αμ))
#[inline]
pub(super) fn nbinom(mu: f64, alpha: f64) -> f64 {
    (alpha * mu / (1.0 + alpha * mu)).ln()
}

/// μ = 1 / (α(e^(-η) - 1))
#[inline]
pub(super) fn nbinom_inverse(eta: f64, alpha: f64) -> f64 {
    1.0 / (alpha * ((-eta).exp() - 1.0))
}

/// dη/dμ = 1 / (μ + αμ²)
#[inline]
pub(super) fn nbinom_derivative(mu: f64, alpha: f64) -> f64 {
    1.0 / (mu + alpha * mu * mu)
}

/// dμ/dη = e^(-η) / (α(e^(-η) - 1)²)
#[inline]
pub(super) fn nbinom_inverse_derivative(eta: f64, alpha: f64) -> f64 {
    let t = (-eta).exp();
    t / (alpha * (t - 1.0) * (t - 1.0))
}

//! Gamma family: V(μ) = μ².
//!
//! The unit deviance 2[(y-μ)/μ - ln(y/μ)] clips y/μ at ε so that zero
//! responses give a large finite contribution instead of ln 0.

use ndarray::{Array1, Zip};
use statrs::function::gamma::ln_gamma;

use super::check_response;
use crate::constants::CLIP_EPS;
use crate::error::Result;

pub(super) fn unit_deviance(y: &Array1<f64>, mu: &Array1<f64>) -> Result<Array1<f64>> {
    check_response("Gamma", y, |v| v >= 0.0, "non-negative")?;
    Ok(Zip::from(y).and(mu).map_collect(|&yi, &mi| {
        let ratio = (yi / mi).max(CLIP_EPS);
        2.0 * ((yi - mi) / mi - ratio.ln())
    }))
}

/// `-1/φ Σ wᵢ [yᵢ/μᵢ + ln μᵢ + (φ-1) ln yᵢ + ln φ + φ ln Γ(1/φ)]`
///
/// The response is floored at ε inside its logarithm, matching the
/// deviance.
pub(super) fn loglike(
    y: &Array1<f64>,
    mu: &Array1<f64>,
    scale: f64,
    weights: &Array1<f64>,
) -> Result<f64> {
    check_response("Gamma", y, |v| v >= 0.0, "non-negative")?;
    let constant = scale.ln() + scale * ln_gamma(1.0 / scale);
    let total = Zip::from(y)
        .and(mu)
        .and(weights)
        .fold(0.0, |acc, &yi, &mi, &wi| {
            let log_y = yi.max(CLIP_EPS).ln();
            acc + wi * (yi / mi + mi.ln() + (scale - 1.0) * log_y + constant)
        });
    Ok(-total / scale)
}

/// `3 (y^⅓ - μ^⅓) / μ^⅓`
pub(super) fn resid_anscombe(y: &Array1<f64>, mu: &Array1<f64>) -> Array1<f64> {
    Zip::from(y)
        .and(mu)
        .map_collect(|&yi, &mi| 3.0 * (yi.cbrt() - mi.cbrt()) / mi.cbrt())
}

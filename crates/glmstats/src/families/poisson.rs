//! Poisson family: V(μ) = μ, unit deviance 2[y ln(y/μ) - (y - μ)].

use ndarray::{Array1, Zip};
use statrs::function::gamma::ln_gamma;

use super::check_response;
use crate::error::Result;
use crate::special::xlogy;

pub(super) fn unit_deviance(y: &Array1<f64>, mu: &Array1<f64>) -> Result<Array1<f64>> {
    check_response("Poisson", y, |v| v >= 0.0, "non-negative")?;
    Ok(Zip::from(y)
        .and(mu)
        .map_collect(|&yi, &mi| 2.0 * (xlogy(yi, yi / mi) - (yi - mi))))
}

/// `scale · Σ wᵢ (yᵢ ln μᵢ - μᵢ - ln Γ(yᵢ + 1))`
pub(super) fn loglike(
    y: &Array1<f64>,
    mu: &Array1<f64>,
    scale: f64,
    weights: &Array1<f64>,
) -> Result<f64> {
    check_response("Poisson", y, |v| v >= 0.0, "non-negative")?;
    let ll = Zip::from(y)
        .and(mu)
        .and(weights)
        .fold(0.0, |acc, &yi, &mi, &wi| {
            acc + wi * (xlogy(yi, mi) - mi - ln_gamma(yi + 1.0))
        });
    Ok(scale * ll)
}

/// `1.5 (y^⅔ - μ^⅔) / μ^⅙`
pub(super) fn resid_anscombe(y: &Array1<f64>, mu: &Array1<f64>) -> Array1<f64> {
    Zip::from(y).and(mu).map_collect(|&yi, &mi| {
        1.5 * (yi.powf(2.0 / 3.0) - mi.powf(2.0 / 3.0)) / mi.powf(1.0 / 6.0)
    })
}

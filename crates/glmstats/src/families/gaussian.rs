//! Gaussian family: V(μ) = 1, unit deviance (y - μ)².

use std::f64::consts::PI;

use ndarray::{Array1, Zip};

pub(super) fn unit_deviance(y: &Array1<f64>, mu: &Array1<f64>) -> Array1<f64> {
    Zip::from(y).and(mu).map_collect(|&yi, &mi| (yi - mi) * (yi - mi))
}

/// Gaussian log-likelihood.
///
/// Under the identity link the scale is profiled out and the concentrated
/// least squares likelihood is returned:
///
///   ℓ = -n/2 (1 + ln(2π SSR / n)) + ½ Σ ln wᵢ
///
/// Other links use the density with the supplied scale, where observation
/// i has variance `scale / wᵢ`.
pub(super) fn loglike(
    y: &Array1<f64>,
    mu: &Array1<f64>,
    scale: f64,
    weights: &Array1<f64>,
    identity_link: bool,
) -> f64 {
    let log_weights: f64 = weights.iter().filter(|&&w| w > 0.0).map(|w| w.ln()).sum();

    if identity_link {
        let n = y.len() as f64;
        let ssr: f64 = Zip::from(y)
            .and(mu)
            .and(weights)
            .fold(0.0, |acc, &yi, &mi, &wi| acc + wi * (yi - mi) * (yi - mi));
        return -n / 2.0 * (1.0 + (2.0 * PI * ssr / n).ln()) + 0.5 * log_weights;
    }

    let quad: f64 = Zip::from(y)
        .and(mu)
        .and(weights)
        .fold(0.0, |acc, &yi, &mi, &wi| acc + wi * (yi - mi) * (yi - mi));
    let n = y.len() as f64;
    -quad / (2.0 * scale) - 0.5 * n * (2.0 * PI * scale).ln() + 0.5 * log_weights
}

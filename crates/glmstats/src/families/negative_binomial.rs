//! Negative Binomial (NB2) family: V(μ) = μ + αμ² with α fixed.
//!
//! Unit deviance:
//!
//!   y = 0:  2 ln(1 + αμ) / α
//!   y > 0:  2 y ln(y/μ) - (2/α)(1 + αy) ln((1 + αy)/(1 + αμ))
//!
//! The log-likelihood is written in terms of the log-scale linear predictor
//! η = ln μ.

use ndarray::{Array1, Zip};
use statrs::function::gamma::ln_gamma;

use super::check_response;
use crate::error::Result;
use crate::special::{hyp2f1, xlogy};

fn check_counts(y: &Array1<f64>) -> Result<()> {
    check_response("NegativeBinomial", y, |v| v >= 0.0, "non-negative")
}

pub(super) fn unit_deviance(y: &Array1<f64>, mu: &Array1<f64>, alpha: f64) -> Result<Array1<f64>> {
    check_counts(y)?;
    Ok(Zip::from(y).and(mu).map_collect(|&yi, &mi| {
        if yi == 0.0 {
            2.0 * (alpha * mi).ln_1p() / alpha
        } else {
            2.0 * xlogy(yi, yi / mi)
                - 2.0 / alpha * (1.0 + alpha * yi) * ((alpha * yi).ln_1p() - (alpha * mi).ln_1p())
        }
    }))
}

/// `Σ wᵢ [yᵢ ln(αe^η/(1+αe^η)) - ln(1+αe^η)/α + ln Γ(yᵢ+1/α) - ln Γ(yᵢ+1) - ln Γ(1/α)]`
pub(super) fn loglike(
    y: &Array1<f64>,
    eta: &Array1<f64>,
    alpha: f64,
    weights: &Array1<f64>,
) -> Result<f64> {
    check_counts(y)?;
    let inv_alpha = 1.0 / alpha;
    let total = Zip::from(y)
        .and(eta)
        .and(weights)
        .fold(0.0, |acc, &yi, &ei, &wi| {
            let am = alpha * ei.exp();
            let term = xlogy(yi, am / (1.0 + am)) - am.ln_1p() * inv_alpha
                + ln_gamma(yi + inv_alpha)
                - ln_gamma(yi + 1.0)
                - ln_gamma(inv_alpha);
            acc + wi * term
        });
    Ok(total)
}

/// `A(t) = ∫₀ᵗ V(s)^(-⅓) ds = 1.5 t^⅔ ₂F₁(⅓, ⅔; 5/3; -αt)`
fn anscombe_transform(t: f64, alpha: f64) -> Result<f64> {
    if t == 0.0 {
        return Ok(0.0);
    }
    Ok(1.5 * t.powf(2.0 / 3.0) * hyp2f1(1.0 / 3.0, 2.0 / 3.0, 5.0 / 3.0, -alpha * t)?)
}

/// `(A(y) - A(μ)) / (μ + αμ²)^⅙`
pub(super) fn resid_anscombe(y: &Array1<f64>, mu: &Array1<f64>, alpha: f64) -> Result<Array1<f64>> {
    check_counts(y)?;
    let mut r = Array1::zeros(y.len());
    for i in 0..y.len() {
        let m = mu[i];
        r[i] = (anscombe_transform(y[i], alpha)? - anscombe_transform(m, alpha)?)
            / (m + alpha * m * m).powf(1.0 / 6.0);
    }
    Ok(r)
}

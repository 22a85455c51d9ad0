//! Inverse Gaussian family: V(μ) = μ³, unit deviance (y-μ)² / (y μ²).

use std::f64::consts::PI;

use ndarray::{Array1, Zip};

use super::check_response;
use crate::error::Result;

fn check_positive(y: &Array1<f64>) -> Result<()> {
    check_response("InverseGaussian", y, |v| v > 0.0, "positive")
}

pub(super) fn unit_deviance(y: &Array1<f64>, mu: &Array1<f64>) -> Result<Array1<f64>> {
    check_positive(y)?;
    Ok(Zip::from(y)
        .and(mu)
        .map_collect(|&yi, &mi| (yi - mi) * (yi - mi) / (yi * mi * mi)))
}

/// `-½ Σ wᵢ [(yᵢ-μᵢ)² / (yᵢ μᵢ² φ) + ln(φ yᵢ³) + ln 2π]`
pub(super) fn loglike(
    y: &Array1<f64>,
    mu: &Array1<f64>,
    scale: f64,
    weights: &Array1<f64>,
) -> Result<f64> {
    check_positive(y)?;
    let total = Zip::from(y)
        .and(mu)
        .and(weights)
        .fold(0.0, |acc, &yi, &mi, &wi| {
            let quad = (yi - mi) * (yi - mi) / (yi * mi * mi * scale);
            acc + wi * (quad + (scale * yi.powi(3)).ln() + (2.0 * PI).ln())
        });
    Ok(-0.5 * total)
}

/// `ln(y/μ) / √μ`
pub(super) fn resid_anscombe(y: &Array1<f64>, mu: &Array1<f64>) -> Array1<f64> {
    Zip::from(y)
        .and(mu)
        .map_collect(|&yi, &mi| (yi / mi).ln() / mi.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_unit_deviance() {
        let d = unit_deviance(&array![2.0], &array![1.0]).unwrap();
        assert_abs_diff_eq!(d[0], 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_zero_response_rejected() {
        assert!(unit_deviance(&array![0.0], &array![1.0]).is_err());
    }

    #[test]
    fn test_loglike_at_mean() {
        // y = μ = 1, φ = 1: -½ ln 2π
        let ll = loglike(&array![1.0], &array![1.0], 1.0, &array![1.0]).unwrap();
        assert_abs_diff_eq!(ll, -0.5 * (2.0 * PI).ln(), epsilon = 1e-14);
    }
}

//! Pearson χ² and the dispersion (scale) estimate.

use ndarray::{Array1, Zip};

use crate::error::{GlmStatsError, Result};
use crate::families::Family;

use super::check_lengths;

/// How the dispersion φ is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScaleMethod {
    /// Pearson χ² / df_resid (1 for Poisson and Binomial).
    #[default]
    Pearson,
    /// Deviance / df_resid (1 for Poisson and Binomial).
    Deviance,
    /// A known dispersion, used for every family.
    Fixed(f64),
}

/// `Σ wᵢ (yᵢ - μᵢ)² / V(μᵢ)`
pub fn pearson_chi2(
    y: &Array1<f64>,
    mu: &Array1<f64>,
    family: &Family,
    prior_weights: &Array1<f64>,
) -> Result<f64> {
    check_lengths(y, mu, Some(prior_weights))?;
    let variance = family.variance(mu)?;
    Ok(Zip::from(y)
        .and(mu)
        .and(&variance)
        .and(prior_weights)
        .fold(0.0, |acc, &yi, &mi, &v, &w| acc + w * (yi - mi) * (yi - mi) / v))
}

/// Dispersion for a fitted model.
///
/// A saturated fit (`df_resid == 0`) has no estimable dispersion and
/// gets NaN.
pub fn estimate_scale(
    family: &Family,
    method: ScaleMethod,
    pearson_chi2: f64,
    deviance: f64,
    df_resid: usize,
) -> Result<f64> {
    if let ScaleMethod::Fixed(scale) = method {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(GlmStatsError::InvalidValue(format!(
                "fixed scale must be positive, got {}",
                scale
            )));
        }
        return Ok(scale);
    }
    if family.fixed_scale() {
        return Ok(1.0);
    }
    if df_resid == 0 {
        log::warn!("no residual degrees of freedom, scale is undefined");
        return Ok(f64::NAN);
    }
    let numerator = match method {
        ScaleMethod::Deviance => deviance,
        _ => pearson_chi2,
    };
    Ok(numerator / df_resid as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_pearson_chi2_poisson() {
        let chi2 = pearson_chi2(
            &array![1.0, 4.0],
            &array![2.0, 2.0],
            &Family::poisson(),
            &array![1.0, 1.0],
        )
        .unwrap();
        assert_abs_diff_eq!(chi2, 0.5 + 2.0, epsilon = 1e-15);
    }

    #[test]
    fn test_pearson_chi2_length_mismatch() {
        let err = pearson_chi2(
            &array![1.0, 4.0],
            &array![2.0, 2.0],
            &Family::poisson(),
            &array![1.0, 1.0, 1.0],
        )
        .unwrap_err();
        assert!(matches!(err, GlmStatsError::DimensionMismatch(_)));
    }

    #[test]
    fn test_fixed_scale_families() {
        let s = estimate_scale(&Family::poisson(), ScaleMethod::Pearson, 12.0, 10.0, 4).unwrap();
        assert_eq!(s, 1.0);
        let s = estimate_scale(&Family::binomial(), ScaleMethod::Deviance, 12.0, 10.0, 4).unwrap();
        assert_eq!(s, 1.0);
    }

    #[test]
    fn test_estimated_scale() {
        let g = Family::gamma();
        assert_abs_diff_eq!(
            estimate_scale(&g, ScaleMethod::Pearson, 12.0, 10.0, 4).unwrap(),
            3.0
        );
        assert_abs_diff_eq!(
            estimate_scale(&g, ScaleMethod::Deviance, 12.0, 10.0, 4).unwrap(),
            2.5
        );
        assert_eq!(
            estimate_scale(&Family::poisson(), ScaleMethod::Fixed(2.0), 0.0, 0.0, 4).unwrap(),
            2.0
        );
        assert!(estimate_scale(&g, ScaleMethod::Pearson, 1.0, 1.0, 0).unwrap().is_nan());
        assert!(estimate_scale(&g, ScaleMethod::Fixed(-1.0), 1.0, 1.0, 3).is_err());
    }
}

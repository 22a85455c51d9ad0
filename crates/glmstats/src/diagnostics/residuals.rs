//! The five GLM residual types.
//!
//!   response   y - μ
//!   pearson    √w (y - μ) / √V(μ)
//!   deviance   √w sign(y - μ) √d(y, μ)
//!   working    (y - μ) g'(μ)
//!   anscombe   √w A-transform residual of the family

use ndarray::{Array1, Zip};

use crate::error::Result;
use crate::families::Family;

use super::check_lengths;

/// All residual arrays of a fit.
#[derive(Debug, Clone)]
pub struct Residuals {
    pub response: Array1<f64>,
    pub pearson: Array1<f64>,
    pub deviance: Array1<f64>,
    pub working: Array1<f64>,
    pub anscombe: Array1<f64>,
}

pub fn resid_response(y: &Array1<f64>, mu: &Array1<f64>) -> Result<Array1<f64>> {
    check_lengths(y, mu, None)?;
    Ok(y - mu)
}

pub fn resid_pearson(
    y: &Array1<f64>,
    mu: &Array1<f64>,
    family: &Family,
    prior_weights: &Array1<f64>,
) -> Result<Array1<f64>> {
    check_lengths(y, mu, Some(prior_weights))?;
    let variance = family.variance(mu)?;
    Ok(Zip::from(y)
        .and(mu)
        .and(&variance)
        .and(prior_weights)
        .map_collect(|&yi, &mi, &v, &w| w.sqrt() * (yi - mi) / v.sqrt()))
}

pub fn resid_deviance(
    y: &Array1<f64>,
    mu: &Array1<f64>,
    family: &Family,
    prior_weights: &Array1<f64>,
) -> Result<Array1<f64>> {
    check_lengths(y, mu, Some(prior_weights))?;
    Ok(family.devresid(y, mu)? * &prior_weights.mapv(f64::sqrt))
}

pub fn resid_working(y: &Array1<f64>, mu: &Array1<f64>, family: &Family) -> Result<Array1<f64>> {
    check_lengths(y, mu, None)?;
    Ok((y - mu) * &family.link().derivative(mu))
}

pub fn resid_anscombe(
    y: &Array1<f64>,
    mu: &Array1<f64>,
    family: &Family,
    prior_weights: &Array1<f64>,
) -> Result<Array1<f64>> {
    check_lengths(y, mu, Some(prior_weights))?;
    Ok(family.resid_anscombe(y, mu)? * &prior_weights.mapv(f64::sqrt))
}

pub fn compute_residuals(
    y: &Array1<f64>,
    mu: &Array1<f64>,
    family: &Family,
    prior_weights: &Array1<f64>,
) -> Result<Residuals> {
    Ok(Residuals {
        response: resid_response(y, mu)?,
        pearson: resid_pearson(y, mu, family, prior_weights)?,
        deviance: resid_deviance(y, mu, family, prior_weights)?,
        working: resid_working(y, mu, family)?,
        anscombe: resid_anscombe(y, mu, family, prior_weights)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_gaussian_residuals_coincide() {
        let y = array![1.0, 3.0, 2.0];
        let mu = array![1.5, 2.0, 2.0];
        let r = compute_residuals(&y, &mu, &Family::gaussian(), &Array1::ones(3)).unwrap();
        for i in 0..3 {
            assert_abs_diff_eq!(r.pearson[i], r.response[i], epsilon = 1e-15);
            assert_abs_diff_eq!(r.deviance[i], r.response[i], epsilon = 1e-15);
            assert_abs_diff_eq!(r.working[i], r.response[i], epsilon = 1e-15);
            assert_abs_diff_eq!(r.anscombe[i], r.response[i], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_poisson_pearson_and_working() {
        let y = array![4.0];
        let mu = array![2.0];
        let family = Family::poisson();
        let pearson = resid_pearson(&y, &mu, &family, &array![1.0]).unwrap();
        assert_abs_diff_eq!(pearson[0], 2.0 / 2.0f64.sqrt(), epsilon = 1e-15);
        // Log link: g'(μ) = 1/μ
        assert_abs_diff_eq!(resid_working(&y, &mu, &family).unwrap()[0], 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_prior_weights_scale_by_sqrt() {
        let y = array![3.0];
        let mu = array![1.0];
        let family = Family::poisson();
        let one = resid_deviance(&y, &mu, &family, &array![1.0]).unwrap();
        let four = resid_deviance(&y, &mu, &family, &array![4.0]).unwrap();
        assert_abs_diff_eq!(four[0], 2.0 * one[0], epsilon = 1e-14);
    }

    #[test]
    fn test_mismatched_lengths_are_errors() {
        use crate::error::GlmStatsError;

        let family = Family::poisson();
        let y = array![1.0, 2.0, 3.0];
        let mu = array![1.0, 2.0];
        let w = Array1::ones(3);
        assert!(matches!(
            resid_pearson(&y, &mu, &family, &w).unwrap_err(),
            GlmStatsError::DimensionMismatch(_)
        ));
        assert!(matches!(
            resid_response(&y, &mu).unwrap_err(),
            GlmStatsError::DimensionMismatch(_)
        ));
        assert!(matches!(
            resid_anscombe(&y, &y, &family, &Array1::ones(2)).unwrap_err(),
            GlmStatsError::DimensionMismatch(_)
        ));
        assert!(matches!(
            compute_residuals(&y, &y, &family, &Array1::ones(4)).unwrap_err(),
            GlmStatsError::DimensionMismatch(_)
        ));
    }
}

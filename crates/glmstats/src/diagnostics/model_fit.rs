//! Likelihood-based fit statistics and the null deviance.
//!
//!   AIC = 2·rank(X) - 2ℓ
//!   BIC = D - df_resid · ln(n)      (deviance form)
//!
//! The null deviance comes from refitting an intercept-only model through
//! the same IRLS engine, with the fitted family, prior weights and offset.

use ndarray::{Array1, Array2};

use crate::error::Result;
use crate::families::Family;
use crate::solvers::{fit_glm_full, IRLSConfig, IRLSResult};

/// AIC and BIC of a fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InformationCriteria {
    pub aic: f64,
    pub bic: f64,
}

/// Log-likelihood at the fitted mean. The log-scale linear predictor
/// `ln μ` is supplied for the Negative Binomial likelihood.
pub fn log_likelihood(
    family: &Family,
    y: &Array1<f64>,
    mu: &Array1<f64>,
    prior_weights: &Array1<f64>,
    scale: f64,
) -> Result<f64> {
    let log_mu = mu.mapv(f64::ln);
    family.loglike_weighted(y, mu, Some(&log_mu), scale, prior_weights)
}

pub fn aic(llf: f64, rank: usize) -> f64 {
    2.0 * rank as f64 - 2.0 * llf
}

pub fn bic(deviance: f64, df_resid: usize, nobs: usize) -> f64 {
    deviance - df_resid as f64 * (nobs as f64).ln()
}

/// True if some column of `x` is a non-zero constant.
pub fn has_constant(x: &Array2<f64>) -> bool {
    x.columns().into_iter().any(|col| {
        let first = col[0];
        first != 0.0 && col.iter().all(|&v| v == first)
    })
}

/// Model degrees of freedom: the rank, less one for an intercept.
pub fn df_model(x: &Array2<f64>, rank: usize) -> usize {
    if x.nrows() > 0 && has_constant(x) {
        rank.saturating_sub(1)
    } else {
        rank
    }
}

/// Deviance of the intercept-only model.
pub fn null_deviance(fit: &IRLSResult, config: &IRLSConfig) -> Result<f64> {
    let n = fit.response.len();
    let intercept = Array2::ones((n, 1));
    let null_fit = fit_glm_full(
        &fit.response.clone().into(),
        &intercept,
        &fit.family,
        config,
        Some(&fit.offset),
        Some(&fit.prior_weights),
        None,
    )?;
    log::debug!(
        "null model converged in {} iterations, deviance = {:.6}",
        null_fit.iterations,
        null_fit.deviance
    );
    Ok(null_fit.deviance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_information_criteria() {
        assert_abs_diff_eq!(aic(-10.0, 3), 26.0);
        assert_abs_diff_eq!(bic(5.0, 8, 10), 5.0 - 8.0 * 10.0f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_df_model() {
        let with_const = array![[1.0, 0.5], [1.0, 1.5], [1.0, 2.0]];
        assert!(has_constant(&with_const));
        assert_eq!(df_model(&with_const, 2), 1);

        let without = array![[0.0, 0.5], [1.0, 1.5], [2.0, 2.0]];
        assert!(!has_constant(&without));
        assert_eq!(df_model(&without, 2), 2);
    }

    #[test]
    fn test_null_deviance_of_intercept_model_is_its_deviance() {
        let y = array![2.0, 3.0, 6.0, 7.0];
        let x = Array2::ones((4, 1));
        let config = IRLSConfig::default();
        let fit = fit_glm_full(&y.into(), &x, &Family::poisson(), &config, None, None, None)
            .unwrap();
        assert_abs_diff_eq!(null_deviance(&fit, &config).unwrap(), fit.deviance, epsilon = 1e-10);
    }
}

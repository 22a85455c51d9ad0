// =============================================================================
// GLM Model
// =============================================================================
//
// The user-facing entry point. A `Glm` holds the data and options; `fit`
// runs IRLS and the results layer.
//
//     let results = Glm::new(y, x, Family::poisson())?
//         .with_offset(exposure.mapv(f64::ln))
//         .fit(&IRLSConfig::default())?;
//
// =============================================================================

use ndarray::{Array1, Array2};

use crate::diagnostics::ScaleMethod;
use crate::error::{GlmStatsError, Result};
use crate::families::Family;
use crate::response::Response;
use crate::results::GlmResults;
use crate::solvers::{fit_glm_full, IRLSConfig};

/// A generalized linear model: data, family and fit options.
#[derive(Debug, Clone)]
pub struct Glm {
    endog: Response,
    exog: Array2<f64>,
    family: Family,
    weights: Option<Array1<f64>>,
    offset: Option<Array1<f64>>,
    start_mu: Option<Array1<f64>>,
    scale_method: ScaleMethod,
}

impl Glm {
    /// Build a model from a response, a design matrix (intercept column
    /// included by the caller) and a family.
    ///
    /// # Errors
    /// `EmptyInput` or `DimensionMismatch` if the shapes do not line up.
    pub fn new(endog: impl Into<Response>, exog: Array2<f64>, family: Family) -> Result<Self> {
        let endog = endog.into();
        if endog.is_empty() || exog.ncols() == 0 {
            return Err(GlmStatsError::EmptyInput(format!(
                "need observations and regressors, got {} observations and {} columns",
                endog.len(),
                exog.ncols()
            )));
        }
        if exog.nrows() != endog.len() {
            return Err(GlmStatsError::DimensionMismatch(format!(
                "exog has {} rows but endog has {} observations",
                exog.nrows(),
                endog.len()
            )));
        }
        Ok(Self {
            endog,
            exog,
            family,
            weights: None,
            offset: None,
            start_mu: None,
            scale_method: ScaleMethod::default(),
        })
    }

    /// Prior (frequency or variance) weights.
    pub fn with_weights(mut self, weights: Array1<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Known term added to the linear predictor.
    pub fn with_offset(mut self, offset: Array1<f64>) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Starting mean for IRLS.
    pub fn with_start_mu(mut self, start_mu: Array1<f64>) -> Self {
        self.start_mu = Some(start_mu);
        self
    }

    pub fn with_scale_method(mut self, scale_method: ScaleMethod) -> Self {
        self.scale_method = scale_method;
        self
    }

    pub fn family(&self) -> &Family {
        &self.family
    }

    pub fn exog(&self) -> &Array2<f64> {
        &self.exog
    }

    /// Fit the model.
    ///
    /// # Errors
    /// Any error from IRLS (including `NonConvergence`) or from computing
    /// the fit statistics.
    pub fn fit(&self, config: &IRLSConfig) -> Result<GlmResults> {
        let fit = fit_glm_full(
            &self.endog,
            &self.exog,
            &self.family,
            config,
            self.offset.as_ref(),
            self.weights.as_ref(),
            self.start_mu.as_ref(),
        )?;
        GlmResults::from_fit(fit, &self.exog, self.scale_method, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::families::FamilyKind;
    use crate::links::Link;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn design(x: &[f64]) -> Array2<f64> {
        Array2::from_shape_fn((x.len(), 2), |(i, j)| if j == 0 { 1.0 } else { x[i] })
    }

    #[test]
    fn test_new_checks_shapes() {
        let err = Glm::new(array![1.0, 2.0], Array2::ones((3, 1)), Family::gaussian()).unwrap_err();
        assert!(matches!(err, GlmStatsError::DimensionMismatch(_)));
        let err = Glm::new(Array1::<f64>::zeros(0), Array2::ones((0, 1)), Family::gaussian())
            .unwrap_err();
        assert!(matches!(err, GlmStatsError::EmptyInput(_)));
    }

    #[test]
    fn test_poisson_fit_statistics() {
        let x = design(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let y = array![1.0, 2.0, 2.0, 4.0, 5.0, 9.0];
        let res = Glm::new(y.clone(), x, Family::poisson())
            .unwrap()
            .fit(&IRLSConfig::default())
            .unwrap();

        assert_eq!(res.nobs, 6);
        assert_eq!(res.rank, 2);
        assert_eq!(res.df_model, 1);
        assert_eq!(res.df_resid, 4);
        assert_eq!(res.scale, 1.0);

        // deviance == Σ deviance residuals²
        let from_resid: f64 = res.residuals.deviance.mapv(|r| r * r).sum();
        assert_abs_diff_eq!(res.deviance, from_resid, epsilon = 1e-10);
        // Pearson χ² == Σ Pearson residuals²
        let pearson: f64 = res.residuals.pearson.mapv(|r| r * r).sum();
        assert_abs_diff_eq!(res.pearson_chi2, pearson, epsilon = 1e-10);

        assert!(res.null_deviance > res.deviance);
        let ic = res.information_criteria();
        assert_abs_diff_eq!(ic.aic, 4.0 - 2.0 * res.llf, epsilon = 1e-12);
        assert_abs_diff_eq!(ic.bic, res.deviance - 4.0 * 6.0f64.ln(), epsilon = 1e-12);

        let ci = res.conf_int(0.05).unwrap();
        for j in 0..2 {
            assert!(ci[[j, 0]] < res.params[j] && res.params[j] < ci[[j, 1]]);
        }
        assert!(res.pvalues()[1] < 0.05);
    }

    #[test]
    fn test_gamma_scale_is_pearson_over_df() {
        let x = design(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let y = array![1.1, 2.3, 2.7, 4.4, 4.6, 6.5];
        let family = Family::with_link(FamilyKind::Gamma, Link::Log).unwrap();
        let model = Glm::new(y, x, family).unwrap();
        let res = model.fit(&IRLSConfig::default()).unwrap();
        assert_abs_diff_eq!(res.scale, res.pearson_chi2 / 4.0, epsilon = 1e-12);

        let res = model
            .clone()
            .with_scale_method(ScaleMethod::Deviance)
            .fit(&IRLSConfig::default())
            .unwrap();
        assert_abs_diff_eq!(res.scale, res.deviance / 4.0, epsilon = 1e-12);

        let cov = res.cov_params();
        let bse = res.bse();
        assert_abs_diff_eq!(bse[1], cov[[1, 1]].sqrt(), epsilon = 1e-15);
    }

    #[test]
    fn test_predict_reproduces_fitted_values() {
        let x = design(&[0.0, 1.0, 2.0, 3.0]);
        let y = array![1.0, 3.0, 4.0, 8.0];
        let res = Glm::new(y, x.clone(), Family::poisson())
            .unwrap()
            .fit(&IRLSConfig::default())
            .unwrap();
        let mu = res.predict(&x, None).unwrap();
        for i in 0..4 {
            assert_abs_diff_eq!(mu[i], res.fitted_values[i], epsilon = 1e-12);
        }
        assert!(res.predict(&Array2::ones((2, 3)), None).is_err());
    }

    #[test]
    fn test_negative_binomial_fit() {
        let x = design(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let y = array![0.0, 2.0, 1.0, 4.0, 3.0, 9.0, 6.0, 14.0];
        let res = Glm::new(y, x, Family::negative_binomial(0.5).unwrap())
            .unwrap()
            .fit(&IRLSConfig::default())
            .unwrap();
        assert!(res.llf.is_finite());
        assert!(res.residuals.anscombe.iter().all(|r| r.is_finite()));
        assert!(res.params[1] > 0.0);
    }
}

// =============================================================================
// GLM Results
// =============================================================================
//
// Everything reported about a converged fit. `GlmResults::from_fit` runs
// once after IRLS and computes the statistics eagerly:
//
//   scale          1 for Poisson/Binomial, else Pearson χ² / df_resid
//                  (or as chosen by `ScaleMethod`)
//   deviance       Σ wᵢ d(yᵢ, μᵢ)
//   null_deviance  deviance of the intercept-only refit
//   llf            family log-likelihood at μ
//   residuals      response, Pearson, deviance, working, Anscombe
//
// Coefficient inference (standard errors, z-values, p-values, intervals)
// is derived on demand from the unscaled covariance and the scale.
//
// =============================================================================

use ndarray::{Array1, Array2};

use crate::diagnostics::{
    self, compute_residuals, estimate_scale, InformationCriteria, Residuals, ScaleMethod,
};
use crate::error::{GlmStatsError, Result};
use crate::families::Family;
use crate::inference;
use crate::solvers::{IRLSConfig, IRLSResult};

/// A fitted generalized linear model.
#[derive(Debug, Clone)]
pub struct GlmResults {
    /// Coefficients β
    pub params: Array1<f64>,
    /// Fitted means μ
    pub fitted_values: Array1<f64>,
    /// η = Xβ + offset
    pub linear_predictor: Array1<f64>,
    /// The fitted response (proportions for a success/failure response)
    pub response: Array1<f64>,
    pub family: Family,
    pub prior_weights: Array1<f64>,
    pub offset: Array1<f64>,
    /// Final IRLS weights, without the prior weights
    pub irls_weights: Array1<f64>,
    /// (XᵀWX)⁺
    pub normalized_cov_params: Array2<f64>,

    pub scale: f64,
    pub deviance: f64,
    pub null_deviance: f64,
    pub pearson_chi2: f64,
    pub llf: f64,

    pub nobs: usize,
    pub rank: usize,
    pub df_model: usize,
    pub df_resid: usize,
    pub iterations: usize,
    pub condition_number: f64,

    pub residuals: Residuals,
}

impl GlmResults {
    /// Compute the fit statistics for a converged IRLS result.
    ///
    /// `x` is the design the fit used. `config` drives the null model refit.
    pub fn from_fit(
        fit: IRLSResult,
        x: &Array2<f64>,
        scale_method: ScaleMethod,
        config: &IRLSConfig,
    ) -> Result<Self> {
        if !fit.converged {
            return Err(GlmStatsError::InvalidValue(
                "results need a converged fit".to_string(),
            ));
        }

        let nobs = fit.response.len();
        let rank = fit.rank;
        let df_resid = nobs.saturating_sub(rank);
        let df_model = diagnostics::df_model(x, rank);

        let y = &fit.response;
        let mu = &fit.fitted_values;
        let family = &fit.family;
        let weights = &fit.prior_weights;

        let pearson_chi2 = diagnostics::pearson_chi2(y, mu, family, weights)?;
        let scale = estimate_scale(family, scale_method, pearson_chi2, fit.deviance, df_resid)?;
        let llf = diagnostics::log_likelihood(family, y, mu, weights, scale)?;
        let null_deviance = diagnostics::null_deviance(&fit, config)?;
        let residuals = compute_residuals(y, mu, family, weights)?;

        log::debug!(
            "{}: deviance = {:.6}, null deviance = {:.6}, scale = {:.6}, llf = {:.6}",
            family,
            fit.deviance,
            null_deviance,
            scale,
            llf
        );

        Ok(Self {
            params: fit.coefficients,
            fitted_values: fit.fitted_values,
            linear_predictor: fit.linear_predictor,
            response: fit.response,
            family: fit.family,
            prior_weights: fit.prior_weights,
            offset: fit.offset,
            irls_weights: fit.irls_weights,
            normalized_cov_params: fit.covariance_unscaled,
            scale,
            deviance: fit.deviance,
            null_deviance,
            pearson_chi2,
            llf,
            nobs,
            rank,
            df_model,
            df_resid,
            iterations: fit.iterations,
            condition_number: fit.condition_number,
            residuals,
        })
    }

    // -------------------------------------------------------------------------
    // Coefficient inference
    // -------------------------------------------------------------------------

    /// Covariance of β̂: `scale · (XᵀWX)⁺`
    pub fn cov_params(&self) -> Array2<f64> {
        &self.normalized_cov_params * self.scale
    }

    pub fn bse(&self) -> Array1<f64> {
        inference::standard_errors(&self.normalized_cov_params, self.scale)
    }

    /// Wald z-statistics `β̂ / se(β̂)`.
    pub fn zvalues(&self) -> Array1<f64> {
        inference::test_statistics(&self.params, &self.bse())
    }

    /// Two-sided normal p-values.
    pub fn pvalues(&self) -> Array1<f64> {
        self.zvalues().mapv(inference::pvalue_z)
    }

    /// `(1 - alpha)` Wald intervals, one (lower, upper) row per coefficient.
    pub fn conf_int(&self, alpha: f64) -> Result<Array2<f64>> {
        inference::conf_int_z(&self.params, &self.bse(), alpha)
    }

    // -------------------------------------------------------------------------
    // Fit statistics
    // -------------------------------------------------------------------------

    pub fn information_criteria(&self) -> InformationCriteria {
        InformationCriteria {
            aic: diagnostics::aic(self.llf, self.rank),
            bic: diagnostics::bic(self.deviance, self.df_resid, self.nobs),
        }
    }

    pub fn aic(&self) -> f64 {
        self.information_criteria().aic
    }

    pub fn bic(&self) -> f64 {
        self.information_criteria().bic
    }

    /// Means for new rows: `g⁻¹(X_new β + offset)`.
    pub fn predict(&self, x_new: &Array2<f64>, offset: Option<&Array1<f64>>) -> Result<Array1<f64>> {
        if x_new.ncols() != self.params.len() {
            return Err(GlmStatsError::DimensionMismatch(format!(
                "model has {} coefficients but X has {} columns",
                self.params.len(),
                x_new.ncols()
            )));
        }
        let mut eta = x_new.dot(&self.params);
        if let Some(o) = offset {
            if o.len() != eta.len() {
                return Err(GlmStatsError::DimensionMismatch(format!(
                    "offset has {} elements but X has {} rows",
                    o.len(),
                    eta.len()
                )));
            }
            eta += o;
        }
        Ok(self.family.fitted(&eta))
    }
}

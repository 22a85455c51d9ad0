// =============================================================================
// Model Diagnostics
// =============================================================================
//
// Fit statistics computed from a converged IRLS result:
//
// - RESIDUALS: response, Pearson, deviance, working and Anscombe
// - DISPERSION: Pearson χ² and the scale estimate φ
// - MODEL FIT: log-likelihood, AIC/BIC, null deviance
//
// Every function here is a pure function of the fit. Prior weights enter
// the residuals as √w and the sums as w.
//
// =============================================================================

use ndarray::Array1;

use crate::error::{GlmStatsError, Result};

mod dispersion;
mod model_fit;
mod residuals;

pub use residuals::{
    compute_residuals, resid_anscombe, resid_deviance, resid_pearson, resid_response,
    resid_working, Residuals,
};

pub use dispersion::{estimate_scale, pearson_chi2, ScaleMethod};

pub use model_fit::{
    aic, bic, df_model, has_constant, log_likelihood, null_deviance, InformationCriteria,
};

/// `y`, `mu` and (when given) the prior weights must have one entry per
/// observation.
fn check_lengths(y: &Array1<f64>, mu: &Array1<f64>, weights: Option<&Array1<f64>>) -> Result<()> {
    let w_len = weights.map_or(y.len(), |w| w.len());
    if mu.len() != y.len() || w_len != y.len() {
        return Err(GlmStatsError::DimensionMismatch(format!(
            "y has {} elements, mu {}, prior weights {}",
            y.len(),
            mu.len(),
            w_len
        )));
    }
    Ok(())
}

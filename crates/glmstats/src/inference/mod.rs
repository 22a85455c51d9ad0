// =============================================================================
// Statistical Inference
// =============================================================================
//
// Wald inference for fitted coefficients:
//
//   se(β̂ⱼ)  = √(φ [(XᵀWX)⁻¹]ⱼⱼ)
//   z       = β̂ⱼ / se(β̂ⱼ)
//   p       = P(|Z| > |z|)
//   CI      = β̂ⱼ ± q₁₋α/₂ se(β̂ⱼ)
//
// GLMs use the normal reference distribution. Least squares fits use
// Student's t with df_resid degrees of freedom.
//
// =============================================================================

use ndarray::{Array1, Array2, Zip};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};
use statrs::function::erf::{erfc, erfc_inv};

use crate::error::{GlmStatsError, Result};

// =============================================================================
// Standard errors and test statistics
// =============================================================================

/// `√(scale · diag(cov_unscaled))`
pub fn standard_errors(cov_unscaled: &Array2<f64>, scale: f64) -> Array1<f64> {
    cov_unscaled.diag().mapv(|v| (scale * v).sqrt())
}

/// Elementwise `params / bse`.
pub fn test_statistics(params: &Array1<f64>, bse: &Array1<f64>) -> Array1<f64> {
    Zip::from(params).and(bse).map_collect(|&b, &se| b / se)
}

// =============================================================================
// P-values
// =============================================================================

/// Two-sided p-value of a z-statistic, `erfc(|z| / √2)`.
pub fn pvalue_z(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    erfc(z.abs() / std::f64::consts::SQRT_2)
}

/// Two-sided p-value of a t-statistic with `df` degrees of freedom.
pub fn pvalue_t(t: f64, df: f64) -> f64 {
    if t.is_nan() || !(df > 0.0) {
        return f64::NAN;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * dist.sf(t.abs()),
        Err(_) => f64::NAN,
    }
}

/// Upper tail probability of an F statistic with (`df_num`, `df_den`)
/// degrees of freedom.
pub fn pvalue_f(f: f64, df_num: f64, df_den: f64) -> f64 {
    if !(f >= 0.0) || !(df_num > 0.0) || !(df_den > 0.0) {
        return f64::NAN;
    }
    match FisherSnedecor::new(df_num, df_den) {
        Ok(dist) => dist.sf(f),
        Err(_) => f64::NAN,
    }
}

// =============================================================================
// Confidence intervals
// =============================================================================

fn check_alpha(alpha: f64) -> Result<()> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(GlmStatsError::InvalidValue(format!(
            "confidence level alpha must lie in (0, 1), got {}",
            alpha
        )));
    }
    Ok(())
}

/// Normal critical value `q` with `P(|Z| > q) = alpha`.
pub fn z_critical(alpha: f64) -> Result<f64> {
    check_alpha(alpha)?;
    Ok(std::f64::consts::SQRT_2 * erfc_inv(alpha))
}

/// Student's t critical value `q` with `P(|T| > q) = alpha`.
pub fn t_critical(alpha: f64, df: f64) -> Result<f64> {
    check_alpha(alpha)?;
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| {
        GlmStatsError::InvalidValue(format!("Student's t with {} df: {}", df, e))
    })?;
    Ok(dist.inverse_cdf(1.0 - alpha / 2.0))
}

/// `(1 - alpha)` intervals as a p × 2 array of (lower, upper) rows.
fn intervals(params: &Array1<f64>, bse: &Array1<f64>, q: f64) -> Array2<f64> {
    let mut out = Array2::zeros((params.len(), 2));
    for (j, (&b, &se)) in params.iter().zip(bse.iter()).enumerate() {
        out[[j, 0]] = b - q * se;
        out[[j, 1]] = b + q * se;
    }
    out
}

/// Normal-theory confidence intervals.
pub fn conf_int_z(params: &Array1<f64>, bse: &Array1<f64>, alpha: f64) -> Result<Array2<f64>> {
    Ok(intervals(params, bse, z_critical(alpha)?))
}

/// Student's t confidence intervals.
pub fn conf_int_t(
    params: &Array1<f64>,
    bse: &Array1<f64>,
    df: f64,
    alpha: f64,
) -> Result<Array2<f64>> {
    Ok(intervals(params, bse, t_critical(alpha, df)?))
}

// =============================================================================
// Tests
// =============================================================================

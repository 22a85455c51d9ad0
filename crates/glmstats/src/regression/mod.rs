// =============================================================================
// Least Squares Regression
// =============================================================================
//
// Linear models  y = Xβ + e  with three error structures:
//
//   OLS   Cov(e) = σ² I
//   WLS   Cov(e) = σ² diag(1/w)
//   GLS   Cov(e) = σ² Σ
//
// All three are fitted the same way: whiten the data so the errors become
// spherical, then run ordinary least squares on the whitened system with
// the crate's SVD solver.
//
//   OLS   ỹ = y,         X̃ = X
//   WLS   ỹ = √w y,      X̃ = √w X
//   GLS   ỹ = L⁻¹ y,     X̃ = L⁻¹ X      where Σ = L Lᵀ (Cholesky)
//
// The log-likelihood is the concentrated Gaussian likelihood of the
// whitened model with the log-determinant of Σ subtracted, so a GLS fit
// with diagonal Σ reproduces the WLS fit with w = 1/diag(Σ) exactly.
//
// =============================================================================

use std::f64::consts::PI;

use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

use crate::convert::{lstsq, to_array1, to_array2, to_dmatrix, to_dvector};
use crate::diagnostics::has_constant;
use crate::error::{GlmStatsError, Result};
use crate::inference;

// =============================================================================
// Whitening
// =============================================================================

enum Whitener {
    Identity,
    /// √w
    Weights(Array1<f64>),
    /// Lower Cholesky factor of Σ
    Cholesky(DMatrix<f64>),
}

impl Whitener {
    fn whiten_vector(&self, v: &Array1<f64>) -> Result<Array1<f64>> {
        match self {
            Whitener::Identity => Ok(v.clone()),
            Whitener::Weights(sqrt_w) => Ok(v * sqrt_w),
            Whitener::Cholesky(l) => l
                .solve_lower_triangular(&to_dvector(v))
                .map(|w| to_array1(&w))
                .ok_or_else(singular_factor),
        }
    }

    fn whiten_matrix(&self, m: &Array2<f64>) -> Result<Array2<f64>> {
        match self {
            Whitener::Identity => Ok(m.clone()),
            Whitener::Weights(sqrt_w) => {
                let mut out = m.clone();
                for (mut row, &s) in out.rows_mut().into_iter().zip(sqrt_w.iter()) {
                    row *= s;
                }
                Ok(out)
            }
            Whitener::Cholesky(l) => l
                .solve_lower_triangular(&to_dmatrix(m))
                .map(|w| to_array2(&w))
                .ok_or_else(singular_factor),
        }
    }

    /// ln |Σ|
    fn log_det_sigma(&self) -> f64 {
        match self {
            Whitener::Identity => 0.0,
            Whitener::Weights(sqrt_w) => -2.0 * sqrt_w.iter().map(|s| s.ln()).sum::<f64>(),
            Whitener::Cholesky(l) => 2.0 * l.diagonal().iter().map(|d| d.ln()).sum::<f64>(),
        }
    }
}

fn singular_factor() -> GlmStatsError {
    GlmStatsError::LinearAlgebraError("Cholesky factor of sigma is singular".to_string())
}

// =============================================================================
// Results
// =============================================================================

/// A fitted least squares model.
#[derive(Debug, Clone)]
pub struct RegressionResults {
    pub params: Array1<f64>,
    /// (X̃ᵀX̃)⁺
    pub normalized_cov_params: Array2<f64>,
    /// Xβ
    pub fitted_values: Array1<f64>,
    /// y - Xβ
    pub resid: Array1<f64>,
    /// ỹ - X̃β
    pub wresid: Array1<f64>,
    /// Σ wresid²
    pub ssr: f64,
    /// ssr / df_resid
    pub scale: f64,
    pub nobs: usize,
    pub rank: usize,
    pub df_model: usize,
    pub df_resid: usize,
    /// Σ (ỹ - ỹ_mean)² about the GLS mean
    pub centered_tss: f64,
    /// Σ ỹ²
    pub uncentered_tss: f64,
    /// Explained sum of squares: the TSS R² is measured against, minus ssr
    pub ess: f64,
    /// ess / df_model
    pub mse_model: f64,
    /// ssr / df_resid
    pub mse_resid: f64,
    pub rsquared: f64,
    pub rsquared_adj: f64,
    /// F statistic of the regression against the constant-only model
    pub fvalue: f64,
    /// Upper tail probability of `fvalue` under F(df_model, df_resid)
    pub f_pvalue: f64,
    pub llf: f64,
    pub aic: f64,
    pub bic: f64,
    pub condition_number: f64,
}

impl RegressionResults {
    /// `scale · (X̃ᵀX̃)⁺`
    pub fn cov_params(&self) -> Array2<f64> {
        &self.normalized_cov_params * self.scale
    }

    pub fn bse(&self) -> Array1<f64> {
        inference::standard_errors(&self.normalized_cov_params, self.scale)
    }

    pub fn tvalues(&self) -> Array1<f64> {
        inference::test_statistics(&self.params, &self.bse())
    }

    /// Two-sided p-values from Student's t with df_resid degrees of freedom.
    pub fn t_pvalues(&self) -> Array1<f64> {
        let df = self.df_resid as f64;
        self.tvalues().mapv(|t| inference::pvalue_t(t, df))
    }

    /// `(1 - alpha)` t intervals, one (lower, upper) row per coefficient.
    pub fn conf_int(&self, alpha: f64) -> Result<Array2<f64>> {
        inference::conf_int_t(&self.params, &self.bse(), self.df_resid as f64, alpha)
    }

    pub fn predict(&self, x_new: &Array2<f64>) -> Result<Array1<f64>> {
        if x_new.ncols() != self.params.len() {
            return Err(GlmStatsError::DimensionMismatch(format!(
                "model has {} coefficients but X has {} columns",
                self.params.len(),
                x_new.ncols()
            )));
        }
        Ok(x_new.dot(&self.params))
    }
}

// =============================================================================
// Estimators
// =============================================================================

/// Ordinary least squares.
pub fn ols(y: &Array1<f64>, x: &Array2<f64>) -> Result<RegressionResults> {
    fit_whitened(y, x, Whitener::Identity)
}

/// Weighted least squares with strictly positive weights (inverse
/// variances up to a common factor).
pub fn wls(y: &Array1<f64>, x: &Array2<f64>, weights: &Array1<f64>) -> Result<RegressionResults> {
    if weights.len() != y.len() {
        return Err(GlmStatsError::DimensionMismatch(format!(
            "weights has {} elements but y has {}",
            weights.len(),
            y.len()
        )));
    }
    if let Some(i) = weights.iter().position(|&w| !(w.is_finite() && w > 0.0)) {
        return Err(GlmStatsError::InvalidValue(format!(
            "WLS weights must be positive, got {} at observation {}",
            weights[i], i
        )));
    }
    fit_whitened(y, x, Whitener::Weights(weights.mapv(f64::sqrt)))
}

/// Generalized least squares with a known n × n error covariance `sigma`
/// (up to a common factor).
///
/// # Errors
/// `LinearAlgebraError` if `sigma` is not symmetric positive definite.
pub fn gls(y: &Array1<f64>, x: &Array2<f64>, sigma: &Array2<f64>) -> Result<RegressionResults> {
    let n = y.len();
    if sigma.nrows() != n || sigma.ncols() != n {
        return Err(GlmStatsError::DimensionMismatch(format!(
            "sigma must be {}x{}, got {}x{}",
            n,
            n,
            sigma.nrows(),
            sigma.ncols()
        )));
    }
    let asymmetry = (sigma - &sigma.t()).iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let size = sigma.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if asymmetry > 1e-10 * size.max(1.0) {
        return Err(GlmStatsError::LinearAlgebraError(
            "sigma is not symmetric".to_string(),
        ));
    }
    let chol = to_dmatrix(sigma).cholesky().ok_or_else(|| {
        GlmStatsError::LinearAlgebraError("sigma is not positive definite".to_string())
    })?;
    fit_whitened(y, x, Whitener::Cholesky(chol.l()))
}

fn fit_whitened(y: &Array1<f64>, x: &Array2<f64>, whitener: Whitener) -> Result<RegressionResults> {
    let n = y.len();
    if n == 0 || x.ncols() == 0 {
        return Err(GlmStatsError::EmptyInput(format!(
            "need observations and regressors, got {} observations and {} columns",
            n,
            x.ncols()
        )));
    }
    if x.nrows() != n {
        return Err(GlmStatsError::DimensionMismatch(format!(
            "X has {} rows but y has {} elements",
            x.nrows(),
            n
        )));
    }

    let wendog = whitener.whiten_vector(y)?;
    let wexog = whitener.whiten_matrix(x)?;
    let solution = lstsq(&to_dmatrix(&wexog), &to_dvector(&wendog))?;
    let params = solution.coefficients;

    let fitted_values = x.dot(&params);
    let resid = y - &fitted_values;
    let wresid = &wendog - &wexog.dot(&params);
    let ssr = wresid.dot(&wresid);

    let rank = solution.rank;
    let k_constant = usize::from(has_constant(x));
    let df_model = rank.saturating_sub(k_constant);
    let df_resid = n.saturating_sub(rank);
    let scale = if df_resid > 0 {
        ssr / df_resid as f64
    } else {
        f64::NAN
    };

    // Total sum of squares about the GLS mean of y
    let iota = whitener.whiten_vector(&Array1::ones(n))?;
    let mean = wendog.dot(&iota) / iota.dot(&iota);
    let centered = &wendog - &(&iota * mean);
    let centered_tss = centered.dot(&centered);
    let uncentered_tss = wendog.dot(&wendog);

    let tss = if k_constant == 1 {
        centered_tss
    } else {
        uncentered_tss
    };
    let rsquared = 1.0 - ssr / tss;
    let rsquared_adj =
        1.0 - (n - k_constant) as f64 / df_resid as f64 * (1.0 - rsquared);

    let ess = tss - ssr;
    let mse_model = if df_model > 0 {
        ess / df_model as f64
    } else {
        f64::NAN
    };
    let mse_resid = scale;
    let fvalue = mse_model / mse_resid;
    let f_pvalue = inference::pvalue_f(fvalue, df_model as f64, df_resid as f64);

    let nobs = n as f64;
    let llf = -nobs / 2.0 * ((2.0 * PI).ln() + (ssr / nobs).ln() + 1.0)
        - 0.5 * whitener.log_det_sigma();
    let aic = -2.0 * llf + 2.0 * rank as f64;
    let bic = -2.0 * llf + nobs.ln() * rank as f64;

    log::debug!(
        "least squares fit: n = {}, rank = {}, ssr = {:.6}, R² = {:.4}",
        n,
        rank,
        ssr,
        rsquared
    );

    Ok(RegressionResults {
        params,
        normalized_cov_params: solution.cov_unscaled,
        fitted_values,
        resid,
        wresid,
        ssr,
        scale,
        nobs: n,
        rank,
        df_model,
        df_resid,
        centered_tss,
        uncentered_tss,
        ess,
        mse_model,
        mse_resid,
        rsquared,
        rsquared_adj,
        fvalue,
        f_pvalue,
        llf,
        aic,
        bic,
        condition_number: solution.condition_number,
    })
}

// =============================================================================
// Tests
// =============================================================================

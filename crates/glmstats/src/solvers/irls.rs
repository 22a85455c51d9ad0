// =============================================================================
// IRLS: Iteratively Reweighted Least Squares
// =============================================================================
//
// THE BIG PICTURE
// ---------------
// We want the β that maximizes the likelihood. For a GLM there is no closed
// form, so the fit is iterated:
//
//     Start with a mean μ⁰
//     Repeat:
//         1. η = g(μ)
//         2. Working weights  w = prior × 1 / (g'(μ)² V(μ))
//         3. Working response z = η - offset + (y - μ) g'(μ)
//         4. Solve  min Σ wᵢ (zᵢ - xᵢᵀβ)²  (SVD of √W X)
//         5. μ = g⁻¹(Xβ + offset), clamped onto the family's domain
//         6. Stop when the weighted deviance stops moving
//
// STATES
// ------
//     Initializing → Iterating → Converged
//                              ↘ Failed
//
// CONVERGENCE
// -----------
// The relative change |D_old - D| / |D_old| (absolute change when
// |D_old| ≤ 1e-10) must drop below the tolerance. Clamping a fitted mean
// onto the family boundary pins its deviance contribution, so a clamped
// iteration additionally needs the relative coefficient change
// ‖β - β_old‖ / max(‖β_old‖, 1) below the tolerance. A fit with a finite
// optimum and a few extreme rows settles; under complete separation the
// coefficients keep growing and the fit fails.
//
// The linear predictor carried between iterations is the unclamped
// Xβ + offset, so rows pushed past the boundary keep pulling β outwards
// instead of being reset to g(μ_boundary).
//
// Running out of iterations is an error, not a result. The last iterate is
// attached to the error for inspection.
//
// =============================================================================

use std::fmt;

use ndarray::{Array1, Array2, Zip};

use crate::constants::{DEFAULT_MAX_ITER, DEFAULT_TOLERANCE, ZERO_TOL};
use crate::convert::weighted_lstsq;
use crate::error::{GlmStatsError, Result};
use crate::families::Family;
use crate::response::Response;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration options for the IRLS algorithm.
///
/// Iteration progress is reported through the `log` facade at debug level.
#[derive(Debug, Clone)]
pub struct IRLSConfig {
    /// Maximum number of iterations before giving up.
    /// Default: 100
    pub max_iterations: usize,

    /// Convergence tolerance for the relative change in deviance (and in
    /// the coefficients when a fitted mean was clamped).
    /// Default: 1e-8. The customary 1e-5 for this algorithm stops one
    /// Newton step early; pass it explicitly to trade accuracy for an
    /// iteration.
    pub tolerance: f64,
}

impl Default for IRLSConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITER,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Where a fit is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitState {
    Initializing,
    Iterating,
    Converged,
    Failed,
}

impl fmt::Display for FitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FitState::Initializing => "initializing",
            FitState::Iterating => "iterating",
            FitState::Converged => "converged",
            FitState::Failed => "failed",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Result Structure
// =============================================================================

/// Results from fitting a GLM using IRLS.
#[derive(Debug, Clone)]
pub struct IRLSResult {
    /// The fitted coefficients β. Predictions use η = Xβ + offset.
    pub coefficients: Array1<f64>,

    /// Fitted means μ = g⁻¹(Xβ + offset)
    pub fitted_values: Array1<f64>,

    /// Linear predictor η = Xβ + offset
    pub linear_predictor: Array1<f64>,

    /// Prior-weighted deviance Σ wᵢ d(yᵢ, μᵢ) at scale 1
    pub deviance: f64,

    pub iterations: usize,

    pub converged: bool,

    /// (XᵀWX)⁺ from the final solve. Var(β̂) = φ (XᵀWX)⁺
    pub covariance_unscaled: Array2<f64>,

    /// Family IRLS weights 1 / (g'(μ)² V(μ)) at the final μ, without the
    /// prior weights
    pub irls_weights: Array1<f64>,

    pub prior_weights: Array1<f64>,

    pub offset: Array1<f64>,

    /// Numerical rank of the weighted design
    pub rank: usize,

    /// Condition number of the weighted design
    pub condition_number: f64,

    /// The fitted response (success proportions for a two-column Binomial
    /// response)
    pub response: Array1<f64>,

    /// The family after initialization (Binomial trial counts set)
    pub family: Family,
}

// =============================================================================
// Main Fitting Functions
// =============================================================================

/// Fit a GLM with no offset, prior weights, or starting mean.
pub fn fit_glm(
    response: &Response,
    x: &Array2<f64>,
    family: &Family,
    config: &IRLSConfig,
) -> Result<IRLSResult> {
    fit_glm_full(response, x, family, config, None, None, None)
}

/// Fit a GLM using Iteratively Reweighted Least Squares.
///
/// # Arguments
/// * `response` - Response vector, or (successes, failures) counts for Binomial
/// * `x` - Design matrix (n × p); the caller adds the intercept column
/// * `family` - Distribution family with its link
/// * `config` - Iteration cap and tolerance
/// * `offset` - Optional known term added to the linear predictor
/// * `weights` - Optional non-negative prior weights
/// * `start_mu` - Optional starting mean, e.g. from a previous fit
///
/// # Offset
/// The offset is added to the linear predictor: η = Xβ + offset. For rates
/// with varying exposure pass `ln(exposure)` with a log link.
///
/// # Errors
/// * `DimensionMismatch` / `EmptyInput` / `InvalidValue` for bad inputs
/// * `NumericalDomain` if a weight or deviance leaves the family's domain
/// * `NonConvergence` when `max_iterations` is reached
pub fn fit_glm_full(
    response: &Response,
    x: &Array2<f64>,
    family: &Family,
    config: &IRLSConfig,
    offset: Option<&Array1<f64>>,
    weights: Option<&Array1<f64>>,
    start_mu: Option<&Array1<f64>>,
) -> Result<IRLSResult> {
    let mut state = FitState::Initializing;
    log::debug!("IRLS {}: {} on {}x{} design", state, family, x.nrows(), x.ncols());

    // -------------------------------------------------------------------------
    // Validate inputs
    // -------------------------------------------------------------------------
    let n = response.len();
    let p = x.ncols();

    if n == 0 {
        return Err(GlmStatsError::EmptyInput("response is empty".to_string()));
    }
    if p == 0 {
        return Err(GlmStatsError::EmptyInput("X has no columns".to_string()));
    }
    if x.nrows() != n {
        return Err(GlmStatsError::DimensionMismatch(format!(
            "X has {} rows but the response has {} observations",
            x.nrows(),
            n
        )));
    }
    if config.max_iterations == 0 || !(config.tolerance > 0.0) {
        return Err(GlmStatsError::InvalidValue(format!(
            "IRLS needs max_iterations > 0 and tolerance > 0, got {} and {}",
            config.max_iterations, config.tolerance
        )));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(GlmStatsError::InvalidValue(
            "X contains non-finite values".to_string(),
        ));
    }

    let offset_vec = match offset {
        Some(o) => {
            check_len("offset", o, n)?;
            if o.iter().any(|v| !v.is_finite()) {
                return Err(GlmStatsError::InvalidValue(
                    "offset contains non-finite values".to_string(),
                ));
            }
            o.clone()
        }
        None => Array1::zeros(n),
    };

    let prior_weights = match weights {
        Some(w) => {
            check_len("weights", w, n)?;
            if w.iter().any(|&wi| !(wi.is_finite() && wi >= 0.0)) {
                return Err(GlmStatsError::InvalidValue(
                    "weights must be non-negative and finite".to_string(),
                ));
            }
            w.clone()
        }
        None => Array1::ones(n),
    };

    // -------------------------------------------------------------------------
    // Initialize the family, the response and μ
    // -------------------------------------------------------------------------
    let mut family = family.clone();
    let y = family.initialize(response)?;
    if y.iter().any(|v| !v.is_finite()) {
        return Err(GlmStatsError::InvalidValue(
            "response contains non-finite values".to_string(),
        ));
    }

    let mut mu = match start_mu {
        Some(m) => {
            check_len("start_mu", m, n)?;
            family.validate_mu(m)?;
            family.clamp_mu(m).0
        }
        None => {
            let candidate = family.starting_mu(&y);
            let (clamped, moved) = family.clamp_mu(&candidate);
            if moved == 0 && family.is_valid_mu(&clamped) {
                clamped
            } else {
                initialize_mu_safe(&y, &family)
            }
        }
    };

    let mut deviance = family.weighted_deviance(&y, &mu, &prior_weights)?;
    let mut eta = family.predict(&mu);
    let mut coefficients_old: Option<Array1<f64>> = None;

    // -------------------------------------------------------------------------
    // Iterate
    // -------------------------------------------------------------------------
    state = FitState::Iterating;
    let mut iteration = 0;
    let mut last: Option<IRLSResult> = None;

    while iteration < config.max_iterations {
        iteration += 1;

        // Working weights and response at the current μ
        let irls_weights = family.weights(&mu)?;
        let combined_weights = &prior_weights * &irls_weights;
        let working_response = compute_working_response(&y, &mu, &eta, &offset_vec, &family);

        // Weighted least squares on √W X
        let solution = weighted_lstsq(x, &working_response, &combined_weights)?;

        // New linear predictor and mean
        let linear_predictor = x.dot(&solution.coefficients) + &offset_vec;
        let raw_mu = family.fitted(&linear_predictor);
        let (new_mu, clamped) = family.clamp_mu(&raw_mu);
        if new_mu.iter().any(|m| !m.is_finite()) {
            return Err(GlmStatsError::NumericalDomain(format!(
                "IRLS produced a non-finite mean at iteration {}",
                iteration
            )));
        }

        let deviance_old = deviance;
        deviance = family.weighted_deviance(&y, &new_mu, &prior_weights)?;

        let rel_change = if deviance_old.abs() > ZERO_TOL {
            (deviance_old - deviance).abs() / deviance_old.abs()
        } else {
            (deviance_old - deviance).abs()
        };

        log::debug!(
            "IRLS {} {}: deviance = {:.6}, rel_change = {:.2e}, rank = {}",
            state,
            iteration,
            deviance,
            rel_change,
            solution.rank
        );
        if clamped > 0 {
            log::warn!(
                "IRLS iteration {}: {} fitted means clamped onto the {} boundary",
                iteration,
                clamped,
                family.name()
            );
        }

        let coef_change = coefficients_old
            .as_ref()
            .map(|old| relative_step(old, &solution.coefficients))
            .unwrap_or(f64::INFINITY);
        let converged =
            rel_change < config.tolerance && (clamped == 0 || coef_change < config.tolerance);
        coefficients_old = Some(solution.coefficients.clone());
        let result = IRLSResult {
            coefficients: solution.coefficients,
            fitted_values: new_mu.clone(),
            linear_predictor: linear_predictor.clone(),
            deviance,
            iterations: iteration,
            converged,
            covariance_unscaled: solution.cov_unscaled,
            irls_weights,
            prior_weights: prior_weights.clone(),
            offset: offset_vec.clone(),
            rank: solution.rank,
            condition_number: solution.condition_number,
            response: y.clone(),
            family: family.clone(),
        };
        mu = new_mu;
        eta = linear_predictor;

        if converged {
            state = FitState::Converged;
            log::info!(
                "IRLS {} after {} iterations: {} deviance = {:.6}",
                state,
                iteration,
                family,
                deviance
            );
            return finalize(result);
        }
        last = Some(result);
    }

    state = FitState::Failed;
    log::warn!(
        "IRLS {}: no convergence after {} iterations (deviance = {:.6})",
        state,
        iteration,
        deviance
    );
    match last {
        Some(last_iterate) => Err(GlmStatsError::NonConvergence {
            iterations: iteration,
            deviance,
            last_iterate: Box::new(last_iterate),
        }),
        None => Err(GlmStatsError::InvalidValue(
            "IRLS ran no iterations".to_string(),
        )),
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Refresh the stored IRLS weights at the converged mean so that the
/// weights, μ and deviance in the result all describe the same point.
fn finalize(mut result: IRLSResult) -> Result<IRLSResult> {
    result.irls_weights = result.family.weights(&result.fitted_values)?;
    Ok(result)
}

fn check_len(what: &str, v: &Array1<f64>, n: usize) -> Result<()> {
    if v.len() != n {
        return Err(GlmStatsError::DimensionMismatch(format!(
            "{} has {} elements but the response has {}",
            what,
            v.len(),
            n
        )));
    }
    Ok(())
}

/// ‖β - β_old‖ / max(‖β_old‖, 1)
fn relative_step(old: &Array1<f64>, new: &Array1<f64>) -> f64 {
    let step = Zip::from(old)
        .and(new)
        .fold(0.0, |acc, &a, &b| acc + (b - a) * (b - a))
        .sqrt();
    let norm = old.dot(old).sqrt();
    step / norm.max(1.0)
}

/// z = η - offset + (y - μ) g'(μ)
fn compute_working_response(
    y: &Array1<f64>,
    mu: &Array1<f64>,
    eta: &Array1<f64>,
    offset: &Array1<f64>,
    family: &Family,
) -> Array1<f64> {
    let link_deriv = family.link().derivative(mu);
    let mut z = eta - offset;
    Zip::from(&mut z)
        .and(y)
        .and(mu)
        .and(&link_deriv)
        .for_each(|z, &yi, &mi, &d| *z += (yi - mi) * d);
    z
}

/// Fallback start for any family: each yᵢ pulled halfway towards a positive
/// mean, then clamped onto the family's domain.
fn initialize_mu_safe(y: &Array1<f64>, family: &Family) -> Array1<f64> {
    let y_mean = y.mean().unwrap_or(1.0).max(0.01);
    let raw = y.mapv(|yi| (yi + y_mean) / 2.0);
    family.clamp_mu(&raw).0
}

// =============================================================================
// Tests
// =============================================================================

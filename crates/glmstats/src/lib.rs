// =============================================================================
// glmstats
// =============================================================================
//
// Generalized linear models fitted by IRLS, plus OLS/WLS/GLS regression.
//
// STRUCTURE:
// ----------
//   - links:       Link functions (identity, log, logit, probit, power, ...)
//   - variance:    Variance functions V(μ)
//   - families:    Distribution families and their permitted links
//   - response:    Vector or (successes, failures) response data
//   - solvers:     IRLS engine
//   - diagnostics: Residuals, dispersion, likelihood and information criteria
//   - inference:   Standard errors, p-values, confidence intervals
//   - results:     `GlmResults`, the statistics of a converged fit
//   - model:       `Glm`, the user-facing model builder
//   - regression:  Least squares (OLS, WLS, GLS)
//   - convert:     ndarray ↔ nalgebra conversion and the SVD solver
//   - special:     ₂F₁ and the incomplete beta transform
//   - error:       Error types used throughout the library
//
// FLOW:
// -----
//   Glm::new(y, X, family) → fit() → IRLS (family/link/variance hooks)
//                                  → GlmResults (scale, llf, residuals, ...)
//
// Logging goes through the `log` facade; install any logger to see IRLS
// iterations at debug level.
//
// =============================================================================

pub mod constants;
pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod families;
pub mod inference;
pub mod links;
pub mod model;
pub mod regression;
pub mod response;
pub mod results;
pub mod solvers;
pub mod special;
pub mod variance;

pub use diagnostics::{InformationCriteria, Residuals, ScaleMethod};
pub use error::{GlmStatsError, Result};
pub use families::{Family, FamilyKind};
pub use inference::{conf_int_t, conf_int_z, pvalue_f, pvalue_t, pvalue_z};
pub use links::{Link, LinkKind};
pub use model::Glm;
pub use regression::{gls, ols, wls, RegressionResults};
pub use response::Response;
pub use results::GlmResults;
pub use solvers::{fit_glm, fit_glm_full, FitState, IRLSConfig, IRLSResult};
pub use variance::{Trials, VarianceFunction};

// =============================================================================
// GLM Solvers
// =============================================================================
//
// We want coefficients β such that
//
//     g(E[Y]) = Xβ + offset
//
// where g is the family's link. The link makes the problem non-linear and
// the variance depends on μ, so there is no closed form. IRLS repeatedly
// linearizes the model around the current mean and solves a weighted least
// squares problem until the deviance settles.
//
// =============================================================================

mod irls;

pub use irls::{fit_glm, fit_glm_full, FitState, IRLSConfig, IRLSResult};

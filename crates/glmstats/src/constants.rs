// =============================================================================
// Numerical Constants
// =============================================================================
//
// Shared thresholds. Keeping them in one place means the clipping used by
// the links, the deviance functions and the IRLS engine always agrees.
//
// =============================================================================

/// Clipping epsilon applied to means on the Binomial boundary and to the
/// Gamma ratio y/μ before its logarithm.
pub const CLIP_EPS: f64 = 1e-10;

/// Smallest admissible mean for strictly positive families.
pub const MU_MIN_POSITIVE: f64 = 1e-10;

/// Lower clamp for probabilities.
pub const MU_MIN_PROBABILITY: f64 = 1e-10;

/// Upper clamp for probabilities.
pub const MU_MAX_PROBABILITY: f64 = 1.0 - 1e-10;

/// Tolerance below which a value is treated as zero.
pub const ZERO_TOL: f64 = 1e-10;

/// Default maximum number of IRLS iterations.
pub const DEFAULT_MAX_ITER: usize = 100;

/// Default relative deviance tolerance for IRLS convergence. Tighter than
/// the customary 1e-5 so that fits agree with direct solves to ~1e-8.
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// Relative singular value cutoff for least squares solves and rank.
pub const SVD_RCOND: f64 = 1e-12;

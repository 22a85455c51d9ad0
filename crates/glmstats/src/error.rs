// =============================================================================
// Error Types
// =============================================================================
//
// Every fallible operation in the crate returns `Result<T>`, an alias over
// `GlmStatsError`. Errors are raised where they are detected and are never
// retried: a bad link is rejected when the family is built, a domain
// violation aborts the fit that hit it, and a fit that runs out of
// iterations hands its last iterate back inside the error.
//
// The only silent recovery in the crate is the clipping of Binomial means
// onto [1e-10, 1 - 1e-10] (see `links::Link::clean`).
//
// =============================================================================

use thiserror::Error;

use crate::solvers::IRLSResult;

/// Errors produced while building families, fitting models, or computing
/// fit statistics.
#[derive(Debug, Error)]
pub enum GlmStatsError {
    /// The requested link is not in the family's permitted set.
    #[error("invalid link '{link}' for the {family} family; expected one of: {allowed}")]
    InvalidLink {
        family: &'static str,
        link: String,
        allowed: String,
    },

    /// A deviance, log-likelihood, variance or weight was evaluated outside
    /// the family's admissible domain.
    #[error("numerical domain error: {0}")]
    NumericalDomain(String),

    /// IRLS hit the iteration cap. The last iterate is attached for
    /// inspection but is not a valid fit.
    #[error("IRLS did not converge after {iterations} iterations (last deviance {deviance})")]
    NonConvergence {
        iterations: usize,
        deviance: f64,
        last_iterate: Box<IRLSResult>,
    },

    /// A required argument was not supplied.
    #[error("missing argument: {0}")]
    MissingArgument(String),

    /// Array shapes do not line up.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// An input array had no elements.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// An input value is outside the range the operation accepts.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A decomposition or solve failed.
    #[error("linear algebra error: {0}")]
    LinearAlgebraError(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GlmStatsError>;

impl GlmStatsError {
    /// The last IRLS iterate carried by a `NonConvergence` error.
    pub fn last_iterate(&self) -> Option<&IRLSResult> {
        match self {
            GlmStatsError::NonConvergence { last_iterate, .. } => Some(&**last_iterate),
            _ => None,
        }
    }
}

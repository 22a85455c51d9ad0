// =============================================================================
// Variance Functions
// =============================================================================
//
// The variance function V(μ) ties an exponential family to its mean:
//
//     Var(Y) = φ × V(μ)
//
//   Constant            V = 1                 Gaussian
//   Mu                  V = μ                 Poisson
//   MuSquared           V = μ²                Gamma
//   MuCubed             V = μ³                Inverse Gaussian
//   Binomial(n)         V = μ(1-μ)/n          Binomial with n trials
//   NegativeBinomial(α) V = μ + αμ²           Negative Binomial (NB2)
//
// V must be strictly positive wherever a family evaluates it: the IRLS
// weights divide by it.
//
// =============================================================================

use ndarray::{Array1, Zip};

use crate::constants::CLIP_EPS;
use crate::error::{GlmStatsError, Result};

/// Number of trials behind each Binomial observation.
#[derive(Debug, Clone, PartialEq)]
pub enum Trials {
    /// One trial per observation (0/1 or proportion response).
    Bernoulli,
    /// Per-observation trial counts from a (successes, failures) response.
    Counts(Array1<f64>),
}

impl Trials {
    /// Trial count for observation `i`.
    #[inline]
    pub fn at(&self, i: usize) -> f64 {
        match self {
            Trials::Bernoulli => 1.0,
            Trials::Counts(n) => n[i],
        }
    }

    pub fn is_bernoulli(&self) -> bool {
        matches!(self, Trials::Bernoulli)
    }

    pub(crate) fn check_len(&self, len: usize) -> Result<()> {
        match self {
            Trials::Counts(n) if n.len() != len => Err(GlmStatsError::DimensionMismatch(format!(
                "binomial trial counts have {} elements but mu has {}",
                n.len(),
                len
            ))),
            _ => Ok(()),
        }
    }
}

/// Variance function of an exponential family.
#[derive(Debug, Clone, PartialEq)]
pub enum VarianceFunction {
    Constant,
    Mu,
    MuSquared,
    MuCubed,
    Binomial { n: Trials },
    NegativeBinomial { alpha: f64 },
}

impl VarianceFunction {
    pub fn name(&self) -> &'static str {
        match self {
            VarianceFunction::Constant => "constant",
            VarianceFunction::Mu => "mu",
            VarianceFunction::MuSquared => "mu_squared",
            VarianceFunction::MuCubed => "mu_cubed",
            VarianceFunction::Binomial { .. } => "binomial",
            VarianceFunction::NegativeBinomial { .. } => "nbinom",
        }
    }

    /// Evaluate V(μ) elementwise.
    ///
    /// # Errors
    /// `NumericalDomain` if any variance is zero, negative, or non-finite.
    pub fn evaluate(&self, mu: &Array1<f64>) -> Result<Array1<f64>> {
        let variance = match self {
            VarianceFunction::Constant => Array1::ones(mu.len()),
            VarianceFunction::Mu => mu.clone(),
            VarianceFunction::MuSquared => mu.mapv(|m| m * m),
            VarianceFunction::MuCubed => mu.mapv(|m| m * m * m),
            VarianceFunction::Binomial { n } => {
                n.check_len(mu.len())?;
                let mut v = Array1::zeros(mu.len());
                Zip::indexed(&mut v).and(mu).for_each(|i, v, &m| {
                    let p = m.clamp(CLIP_EPS, 1.0 - CLIP_EPS);
                    *v = p * (1.0 - p) / n.at(i);
                });
                v
            }
            VarianceFunction::NegativeBinomial { alpha } => mu.mapv(|m| m + alpha * m * m),
        };

        if let Some((i, v)) = variance
            .iter()
            .enumerate()
            .find(|(_, v)| !(v.is_finite() && **v > 0.0))
        {
            return Err(GlmStatsError::NumericalDomain(format!(
                "{} variance is {} at observation {} (mu = {})",
                self.name(),
                v,
                i,
                mu[i]
            )));
        }
        Ok(variance)
    }
}

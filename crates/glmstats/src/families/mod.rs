// =============================================================================
// Distribution Families
// =============================================================================
//
// A family bundles everything the IRLS engine needs to know about the
// response distribution:
//
//   - a link function g                 η = g(μ)
//   - a variance function V             Var(Y) = φ V(μ)
//   - the unit deviance d(y, μ)         deviance = Σ d(y, μ) / φ
//   - the log-likelihood
//   - the Anscombe residual transform
//
// THE CLOSED SET
// --------------
// Families are a closed set of tagged variants (`FamilyKind`). Each variant
// lives in its own file with its closed-form deviance, likelihood and
// residuals; `Family` dispatches on the tag. The permitted links for each
// kind are a static table, and a `Family` can only be built with a link from
// that table, so an invalid combination never exists at runtime.
//
//   Family            Default link       Permitted links
//   ----------------  -----------------  ------------------------------------
//   Gaussian          identity           identity, log, inverse
//   Poisson           log                log, identity, sqrt
//   Binomial          logit              logit, probit, cauchy, log, cloglog
//   Gamma             inverse            inverse, log, identity
//   InverseGaussian   inverse squared    inverse squared, inverse, identity, log
//   NegativeBinomial  log                log, cloglog, identity, nbinom, power
//
// ANCILLARY PARAMETERS
// --------------------
//   - Negative Binomial α: fixed at construction.
//   - Binomial trial counts n: Bernoulli until `initialize` sees a
//     (successes, failures) response, which sets them exactly once.
//
// =============================================================================

mod binomial;
mod gamma;
mod gaussian;
mod inverse_gaussian;
mod negative_binomial;
mod poisson;

use std::fmt;

use ndarray::{Array1, Zip};

use crate::constants::{MU_MAX_PROBABILITY, MU_MIN_POSITIVE, MU_MIN_PROBABILITY};
use crate::error::{GlmStatsError, Result};
use crate::links::{Link, LinkKind};
use crate::response::Response;
use crate::variance::{Trials, VarianceFunction};

/// Default Negative Binomial dispersion.
pub const DEFAULT_ALPHA: f64 = 1.0;

// =============================================================================
// Family kinds and the permitted-link registry
// =============================================================================

/// The exponential families supported by the GLM engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FamilyKind {
    Gaussian,
    Poisson,
    Binomial,
    Gamma,
    InverseGaussian,
    NegativeBinomial,
}

const GAUSSIAN_LINKS: &[LinkKind] = &[LinkKind::Identity, LinkKind::Log, LinkKind::Inverse];

const POISSON_LINKS: &[LinkKind] = &[LinkKind::Log, LinkKind::Identity, LinkKind::Sqrt];

const BINOMIAL_LINKS: &[LinkKind] = &[
    LinkKind::Logit,
    LinkKind::Probit,
    LinkKind::Cauchy,
    LinkKind::Log,
    LinkKind::CLogLog,
];

const GAMMA_LINKS: &[LinkKind] = &[LinkKind::Inverse, LinkKind::Log, LinkKind::Identity];

const INVERSE_GAUSSIAN_LINKS: &[LinkKind] = &[
    LinkKind::InverseSquared,
    LinkKind::Inverse,
    LinkKind::Identity,
    LinkKind::Log,
];

const NEGATIVE_BINOMIAL_LINKS: &[LinkKind] = &[
    LinkKind::Log,
    LinkKind::CLogLog,
    LinkKind::Identity,
    LinkKind::NegativeBinomial,
    LinkKind::Power,
    LinkKind::Inverse,
    LinkKind::InverseSquared,
    LinkKind::Sqrt,
];

impl FamilyKind {
    pub const ALL: [FamilyKind; 6] = [
        FamilyKind::Gaussian,
        FamilyKind::Poisson,
        FamilyKind::Binomial,
        FamilyKind::Gamma,
        FamilyKind::InverseGaussian,
        FamilyKind::NegativeBinomial,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FamilyKind::Gaussian => "Gaussian",
            FamilyKind::Poisson => "Poisson",
            FamilyKind::Binomial => "Binomial",
            FamilyKind::Gamma => "Gamma",
            FamilyKind::InverseGaussian => "InverseGaussian",
            FamilyKind::NegativeBinomial => "NegativeBinomial",
        }
    }

    /// Links this family accepts. The first entry is the default.
    pub fn permitted_links(&self) -> &'static [LinkKind] {
        match self {
            FamilyKind::Gaussian => GAUSSIAN_LINKS,
            FamilyKind::Poisson => POISSON_LINKS,
            FamilyKind::Binomial => BINOMIAL_LINKS,
            FamilyKind::Gamma => GAMMA_LINKS,
            FamilyKind::InverseGaussian => INVERSE_GAUSSIAN_LINKS,
            FamilyKind::NegativeBinomial => NEGATIVE_BINOMIAL_LINKS,
        }
    }

    pub fn permits(&self, link: &Link) -> bool {
        self.permitted_links().contains(&link.kind())
    }

    /// Default (canonical for all but Negative Binomial) link.
    pub fn default_link(&self) -> Link {
        match self {
            FamilyKind::Gaussian => Link::identity(),
            FamilyKind::Poisson => Link::Log,
            FamilyKind::Binomial => Link::Logit,
            FamilyKind::Gamma => Link::inverse_power(),
            FamilyKind::InverseGaussian => Link::inverse_squared(),
            FamilyKind::NegativeBinomial => Link::Log,
        }
    }

    /// True when the dispersion is fixed at 1 by the distribution.
    pub fn fixed_scale(&self) -> bool {
        matches!(self, FamilyKind::Poisson | FamilyKind::Binomial)
    }
}

impl fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Family
// =============================================================================

/// A distribution family with its link and variance function.
#[derive(Debug, Clone, PartialEq)]
pub struct Family {
    kind: FamilyKind,
    link: Link,
    variance: VarianceFunction,
}

impl Family {
    /// Family with its default link (Negative Binomial uses α = 1).
    pub fn new(kind: FamilyKind) -> Self {
        Self {
            kind,
            link: kind.default_link(),
            variance: default_variance(kind, DEFAULT_ALPHA),
        }
    }

    /// Family with an explicit link.
    ///
    /// # Errors
    /// `InvalidLink` if the link is not in the family's permitted set.
    pub fn with_link(kind: FamilyKind, link: Link) -> Result<Self> {
        Self::build(kind, link, DEFAULT_ALPHA)
    }

    pub fn gaussian() -> Self {
        Self::new(FamilyKind::Gaussian)
    }

    pub fn poisson() -> Self {
        Self::new(FamilyKind::Poisson)
    }

    pub fn binomial() -> Self {
        Self::new(FamilyKind::Binomial)
    }

    pub fn gamma() -> Self {
        Self::new(FamilyKind::Gamma)
    }

    pub fn inverse_gaussian() -> Self {
        Self::new(FamilyKind::InverseGaussian)
    }

    /// Negative Binomial with dispersion α and the log link.
    pub fn negative_binomial(alpha: f64) -> Result<Self> {
        Self::build(FamilyKind::NegativeBinomial, Link::Log, alpha)
    }

    /// Negative Binomial with dispersion α and an explicit link. An `nbinom`
    /// link always takes the family's α.
    pub fn negative_binomial_with_link(alpha: f64, link: Link) -> Result<Self> {
        Self::build(FamilyKind::NegativeBinomial, link, alpha)
    }

    fn build(kind: FamilyKind, link: Link, alpha: f64) -> Result<Self> {
        if !kind.permits(&link) {
            let allowed: Vec<&str> = kind.permitted_links().iter().map(|k| k.name()).collect();
            return Err(GlmStatsError::InvalidLink {
                family: kind.name(),
                link: link.to_string(),
                allowed: allowed.join(", "),
            });
        }
        if kind == FamilyKind::NegativeBinomial && !(alpha.is_finite() && alpha > 0.0) {
            return Err(GlmStatsError::InvalidValue(format!(
                "negative binomial alpha must be positive and finite, got {}",
                alpha
            )));
        }

        let link = match link {
            Link::NegativeBinomial { .. } => Link::NegativeBinomial { alpha },
            other => other,
        };

        Ok(Self {
            kind,
            link,
            variance: default_variance(kind, alpha),
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn kind(&self) -> FamilyKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    /// Negative Binomial dispersion α.
    pub fn alpha(&self) -> Option<f64> {
        match self.variance {
            VarianceFunction::NegativeBinomial { alpha } => Some(alpha),
            _ => None,
        }
    }

    /// Binomial trial counts.
    pub fn trials(&self) -> Option<&Trials> {
        match &self.variance {
            VarianceFunction::Binomial { n } => Some(n),
            _ => None,
        }
    }

    pub fn fixed_scale(&self) -> bool {
        self.kind.fixed_scale()
    }

    // -------------------------------------------------------------------------
    // IRLS hooks
    // -------------------------------------------------------------------------

    /// Starting mean for IRLS: `(y + ȳ)/2`, or `(y + ½)/2` for Binomial.
    pub fn starting_mu(&self, y: &Array1<f64>) -> Array1<f64> {
        match self.kind {
            FamilyKind::Binomial => y.mapv(|yi| (yi + 0.5) / 2.0),
            _ => {
                let y_mean = y.mean().unwrap_or(0.0);
                y.mapv(|yi| (yi + y_mean) / 2.0)
            }
        }
    }

    /// Turn the raw response into the vector the engine fits.
    ///
    /// A two-column (successes, failures) response is only accepted by the
    /// Binomial family: the trial counts become `n = successes + failures`
    /// and the returned response is `successes / n`. Any single-column
    /// response is returned unchanged.
    ///
    /// # Errors
    /// `InvalidValue` for two-column responses to other families, rows with
    /// no trials, or a second two-column initialization.
    pub fn initialize(&mut self, response: &Response) -> Result<Array1<f64>> {
        let (successes, failures) = match response {
            Response::Vector(y) => return Ok(y.clone()),
            Response::SuccessFailure(counts) if counts.ncols() == 1 => {
                return Ok(counts.column(0).to_owned())
            }
            Response::SuccessFailure(counts) => {
                if counts.ncols() != 2 {
                    return Err(GlmStatsError::DimensionMismatch(format!(
                        "success/failure response needs 2 columns, got {}",
                        counts.ncols()
                    )));
                }
                (counts.column(0).to_owned(), counts.column(1).to_owned())
            }
        };

        match &mut self.variance {
            VarianceFunction::Binomial { n } => {
                if !n.is_bernoulli() {
                    return Err(GlmStatsError::InvalidValue(
                        "binomial trial counts are already set".to_string(),
                    ));
                }
                let totals = &successes + &failures;
                if let Some(i) = totals.iter().position(|&t| !(t > 0.0 && t.is_finite())) {
                    return Err(GlmStatsError::InvalidValue(format!(
                        "observation {} has {} trials",
                        i, totals[i]
                    )));
                }
                if successes.iter().chain(failures.iter()).any(|&c| c < 0.0) {
                    return Err(GlmStatsError::InvalidValue(
                        "success and failure counts must be non-negative".to_string(),
                    ));
                }
                let proportions = &successes / &totals;
                *n = Trials::Counts(totals);
                Ok(proportions)
            }
            _ => Err(GlmStatsError::InvalidValue(format!(
                "the {} family does not accept a two-column response",
                self.kind
            ))),
        }
    }

    /// Linear predictor η = g(μ).
    pub fn predict(&self, mu: &Array1<f64>) -> Array1<f64> {
        self.link.link(mu)
    }

    /// Mean μ = g⁻¹(η).
    pub fn fitted(&self, eta: &Array1<f64>) -> Array1<f64> {
        self.link.inverse(eta)
    }

    /// V(μ).
    pub fn variance(&self, mu: &Array1<f64>) -> Result<Array1<f64>> {
        self.variance.evaluate(mu)
    }

    /// IRLS weights `1 / (g'(μ)² V(μ))`.
    ///
    /// # Errors
    /// `NumericalDomain` if the denominator vanishes or a weight is not finite.
    pub fn weights(&self, mu: &Array1<f64>) -> Result<Array1<f64>> {
        let variance = self.variance(mu)?;
        let deriv = self.link.derivative(mu);

        let mut w = Array1::zeros(mu.len());
        let mut bad = None;
        Zip::indexed(&mut w)
            .and(&deriv)
            .and(&variance)
            .for_each(|i, w, &d, &v| {
                let denom = d * d * v;
                let value = 1.0 / denom;
                if denom == 0.0 || !value.is_finite() || value <= 0.0 {
                    bad.get_or_insert(i);
                }
                *w = value;
            });

        if let Some(i) = bad {
            return Err(GlmStatsError::NumericalDomain(format!(
                "IRLS weight is {} at observation {} (mu = {}, link derivative = {}, variance = {})",
                w[i], i, mu[i], deriv[i], variance[i]
            )));
        }
        Ok(w)
    }

    /// Check that μ lies in the family's admissible domain.
    pub fn validate_mu(&self, mu: &Array1<f64>) -> Result<()> {
        let bad = match self.kind {
            FamilyKind::Gaussian => mu.iter().position(|m| !m.is_finite()),
            FamilyKind::Binomial => mu
                .iter()
                .position(|&m| !m.is_finite() || !(0.0..=1.0).contains(&m)),
            _ => mu.iter().position(|&m| !(m.is_finite() && m > 0.0)),
        };
        match bad {
            Some(i) => Err(GlmStatsError::NumericalDomain(format!(
                "mu = {} at observation {} is outside the {} domain",
                mu[i], i, self.kind
            ))),
            None => Ok(()),
        }
    }

    pub fn is_valid_mu(&self, mu: &Array1<f64>) -> bool {
        self.validate_mu(mu).is_ok()
    }

    /// Clamp μ onto the family's open domain. Returns the clamped means and
    /// how many values had to move.
    pub fn clamp_mu(&self, mu: &Array1<f64>) -> (Array1<f64>, usize) {
        let bounds = match self.kind {
            FamilyKind::Gaussian => return (mu.clone(), 0),
            FamilyKind::Binomial => (MU_MIN_PROBABILITY, MU_MAX_PROBABILITY),
            _ => (MU_MIN_POSITIVE, f64::INFINITY),
        };
        let mut moved = 0;
        let clamped = mu.mapv(|m| {
            let c = m.clamp(bounds.0, bounds.1);
            if c != m {
                moved += 1;
            }
            c
        });
        (clamped, moved)
    }

    // -------------------------------------------------------------------------
    // Deviance
    // -------------------------------------------------------------------------

    /// Per-observation deviance contributions d(y, μ) ≥ 0.
    pub fn unit_deviance(&self, y: &Array1<f64>, mu: &Array1<f64>) -> Result<Array1<f64>> {
        check_same_len(y, mu)?;
        self.validate_mu(mu)?;
        let d = match self.kind {
            FamilyKind::Gaussian => gaussian::unit_deviance(y, mu),
            FamilyKind::Poisson => poisson::unit_deviance(y, mu)?,
            FamilyKind::Binomial => binomial::unit_deviance(y, mu, self.trials_or_bernoulli())?,
            FamilyKind::Gamma => gamma::unit_deviance(y, mu)?,
            FamilyKind::InverseGaussian => inverse_gaussian::unit_deviance(y, mu)?,
            FamilyKind::NegativeBinomial => {
                negative_binomial::unit_deviance(y, mu, self.alpha_or_default())?
            }
        };
        // Rounding can push a contribution a hair below zero when y ≈ μ
        Ok(d.mapv(|v| v.max(0.0)))
    }

    /// Deviance `Σ d(y, μ) / scale`.
    pub fn deviance(&self, y: &Array1<f64>, mu: &Array1<f64>, scale: f64) -> Result<f64> {
        Ok(self.unit_deviance(y, mu)?.sum() / scale)
    }

    /// Deviance with prior weights: `Σ wᵢ d(yᵢ, μᵢ)`.
    pub fn weighted_deviance(
        &self,
        y: &Array1<f64>,
        mu: &Array1<f64>,
        weights: &Array1<f64>,
    ) -> Result<f64> {
        Ok(self.unit_deviance(y, mu)?.dot(weights))
    }

    /// Deviance residuals `sign(y - μ) √d(y, μ)`.
    pub fn devresid(&self, y: &Array1<f64>, mu: &Array1<f64>) -> Result<Array1<f64>> {
        let d = self.unit_deviance(y, mu)?;
        Ok(Zip::from(y)
            .and(mu)
            .and(&d)
            .map_collect(|&yi, &mi, &di| sign(yi - mi) * di.sqrt()))
    }

    // -------------------------------------------------------------------------
    // Log-likelihood
    // -------------------------------------------------------------------------

    /// Log-likelihood at (y, μ).
    ///
    /// The Negative Binomial likelihood is expressed through the log-scale
    /// linear predictor `ln μ` (η under the log link) and requires
    /// `linear_predictor`; the other families ignore it.
    ///
    /// # Errors
    /// `MissingArgument` for Negative Binomial without `linear_predictor`;
    /// `NumericalDomain` for μ or y outside the family's domain.
    pub fn loglike(
        &self,
        y: &Array1<f64>,
        mu: &Array1<f64>,
        linear_predictor: Option<&Array1<f64>>,
        scale: f64,
    ) -> Result<f64> {
        let ones = Array1::ones(y.len());
        self.loglike_weighted(y, mu, linear_predictor, scale, &ones)
    }

    /// Log-likelihood with prior weights.
    pub fn loglike_weighted(
        &self,
        y: &Array1<f64>,
        mu: &Array1<f64>,
        linear_predictor: Option<&Array1<f64>>,
        scale: f64,
        weights: &Array1<f64>,
    ) -> Result<f64> {
        check_same_len(y, mu)?;
        check_same_len(y, weights)?;
        if self.kind == FamilyKind::NegativeBinomial {
            let eta = linear_predictor.ok_or_else(|| {
                GlmStatsError::MissingArgument(
                    "the negative binomial log-likelihood needs the linear predictor".to_string(),
                )
            })?;
            check_same_len(y, eta)?;
            return negative_binomial::loglike(y, eta, self.alpha_or_default(), weights);
        }

        self.validate_mu(mu)?;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(GlmStatsError::InvalidValue(format!(
                "scale must be positive, got {}",
                scale
            )));
        }
        match self.kind {
            FamilyKind::Gaussian => Ok(gaussian::loglike(
                y,
                mu,
                scale,
                weights,
                self.link.kind() == LinkKind::Identity,
            )),
            FamilyKind::Poisson => poisson::loglike(y, mu, scale, weights),
            FamilyKind::Binomial => {
                binomial::loglike(y, mu, scale, weights, self.trials_or_bernoulli())
            }
            FamilyKind::Gamma => gamma::loglike(y, mu, scale, weights),
            FamilyKind::InverseGaussian => inverse_gaussian::loglike(y, mu, scale, weights),
            FamilyKind::NegativeBinomial => unreachable!("handled above"),
        }
    }

    // -------------------------------------------------------------------------
    // Residuals
    // -------------------------------------------------------------------------

    /// Anscombe (variance-stabilized) residuals.
    pub fn resid_anscombe(&self, y: &Array1<f64>, mu: &Array1<f64>) -> Result<Array1<f64>> {
        check_same_len(y, mu)?;
        self.validate_mu(mu)?;
        match self.kind {
            FamilyKind::Gaussian => Ok(y - mu),
            FamilyKind::Poisson => Ok(poisson::resid_anscombe(y, mu)),
            FamilyKind::Binomial => binomial::resid_anscombe(y, mu, self.trials_or_bernoulli()),
            FamilyKind::Gamma => Ok(gamma::resid_anscombe(y, mu)),
            FamilyKind::InverseGaussian => Ok(inverse_gaussian::resid_anscombe(y, mu)),
            FamilyKind::NegativeBinomial => {
                negative_binomial::resid_anscombe(y, mu, self.alpha_or_default())
            }
        }
    }

    fn trials_or_bernoulli(&self) -> &Trials {
        self.trials().unwrap_or(&Trials::Bernoulli)
    }

    fn alpha_or_default(&self) -> f64 {
        self.alpha().unwrap_or(DEFAULT_ALPHA)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alpha() {
            Some(alpha) => write!(f, "{}(link={}, alpha={})", self.kind, self.link, alpha),
            None => write!(f, "{}(link={})", self.kind, self.link),
        }
    }
}

// =============================================================================
// Helpers shared by the family files
// =============================================================================

fn default_variance(kind: FamilyKind, alpha: f64) -> VarianceFunction {
    match kind {
        FamilyKind::Gaussian => VarianceFunction::Constant,
        FamilyKind::Poisson => VarianceFunction::Mu,
        FamilyKind::Binomial => VarianceFunction::Binomial {
            n: Trials::Bernoulli,
        },
        FamilyKind::Gamma => VarianceFunction::MuSquared,
        FamilyKind::InverseGaussian => VarianceFunction::MuCubed,
        FamilyKind::NegativeBinomial => VarianceFunction::NegativeBinomial { alpha },
    }
}

fn check_same_len(y: &Array1<f64>, other: &Array1<f64>) -> Result<()> {
    if y.len() != other.len() {
        return Err(GlmStatsError::DimensionMismatch(format!(
            "y has {} elements but got an array of {}",
            y.len(),
            other.len()
        )));
    }
    Ok(())
}

/// Reject responses that violate `ok`.
fn check_response(family: &str, y: &Array1<f64>, ok: impl Fn(f64) -> bool, rule: &str) -> Result<()> {
    match y.iter().position(|&v| !ok(v)) {
        Some(i) => Err(GlmStatsError::NumericalDomain(format!(
            "{} response must be {}, got {} at observation {}",
            family, rule, y[i], i
        ))),
        None => Ok(()),
    }
}

#[inline]
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

// =============================================================================
// Tests
// =============================================================================

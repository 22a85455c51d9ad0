// =============================================================================
// Link Functions
// =============================================================================
//
// A link function g connects the mean response μ to the linear predictor:
//
//     η = g(μ) = Xβ
//
// Every link provides four elementwise operations:
//   - link(μ)               η = g(μ)
//   - inverse(η)            μ = g⁻¹(η)
//   - derivative(μ)         dη/dμ = g'(μ)       (IRLS weights, working response)
//   - inverse_derivative(η) dμ/dη
//
// AVAILABLE LINKS
// ---------------
//   power(p)  η = μ^p, with identity (p=1), inverse (p=-1),
//             inverse squared (p=-2) and sqrt (p=0.5) as named cases.
//             power(0) is the log link by convention.
//   log       η = ln μ
//   logit     η = ln(μ/(1-μ))
//   probit    η = Φ⁻¹(μ)
//   cauchy    η = tan(π(μ - ½))
//   cloglog   η = ln(-ln(1-μ))
//   nbinom    η = ln(αμ/(1+αμ))
//
// CLIPPING
// --------
// Links whose natural domain is a probability (logit, probit, cauchy,
// cloglog) clip μ into [1e-10, 1 - 1e-10] before evaluating g or g'. The log
// link clips from below only. `clean` exposes that clipping so the Binomial
// deviance can apply exactly the same rule.
//
// =============================================================================

mod binary;
mod logscale;
mod power;

use std::fmt;

use ndarray::Array1;

/// Classification of a link, used to check it against a family's permitted
/// set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Identity,
    Log,
    Logit,
    Probit,
    Cauchy,
    CLogLog,
    Inverse,
    InverseSquared,
    Sqrt,
    /// A power link with an exponent that has no dedicated name.
    Power,
    NegativeBinomial,
}

impl LinkKind {
    pub fn name(&self) -> &'static str {
        match self {
            LinkKind::Identity => "identity",
            LinkKind::Log => "log",
            LinkKind::Logit => "logit",
            LinkKind::Probit => "probit",
            LinkKind::Cauchy => "cauchy",
            LinkKind::CLogLog => "cloglog",
            LinkKind::Inverse => "inverse",
            LinkKind::InverseSquared => "inverse_squared",
            LinkKind::Sqrt => "sqrt",
            LinkKind::Power => "power",
            LinkKind::NegativeBinomial => "nbinom",
        }
    }
}

/// A link function. Immutable; parameterized variants carry their parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Link {
    /// η = μ^p. Never holds p = 0 when built through [`Link::power`].
    Power(f64),
    Log,
    Logit,
    Probit,
    Cauchy,
    CLogLog,
    /// Negative Binomial link with dispersion α.
    NegativeBinomial { alpha: f64 },
}

impl Link {
    pub fn identity() -> Self {
        Link::Power(1.0)
    }

    pub fn inverse_power() -> Self {
        Link::Power(-1.0)
    }

    pub fn inverse_squared() -> Self {
        Link::Power(-2.0)
    }

    pub fn sqrt() -> Self {
        Link::Power(0.5)
    }

    /// Power link η = μ^p. `power(0.0)` is the log link.
    pub fn power(p: f64) -> Self {
        if p == 0.0 {
            Link::Log
        } else {
            Link::Power(p)
        }
    }

    pub fn negative_binomial(alpha: f64) -> Self {
        Link::NegativeBinomial { alpha }
    }

    /// Classify this link.
    pub fn kind(&self) -> LinkKind {
        match *self {
            Link::Power(p) if p == 1.0 => LinkKind::Identity,
            Link::Power(p) if p == -1.0 => LinkKind::Inverse,
            Link::Power(p) if p == -2.0 => LinkKind::InverseSquared,
            Link::Power(p) if p == 0.5 => LinkKind::Sqrt,
            Link::Power(p) if p == 0.0 => LinkKind::Log,
            Link::Power(_) => LinkKind::Power,
            Link::Log => LinkKind::Log,
            Link::Logit => LinkKind::Logit,
            Link::Probit => LinkKind::Probit,
            Link::Cauchy => LinkKind::Cauchy,
            Link::CLogLog => LinkKind::CLogLog,
            Link::NegativeBinomial { .. } => LinkKind::NegativeBinomial,
        }
    }

    /// Name of the link ("identity", "log", ...).
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Clip μ into the link's safe domain.
    pub fn clean(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| self.clean_scalar(m))
    }

    /// η = g(μ)
    pub fn link(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| self.link_scalar(m))
    }

    /// μ = g⁻¹(η)
    pub fn inverse(&self, eta: &Array1<f64>) -> Array1<f64> {
        eta.mapv(|e| self.inverse_scalar(e))
    }

    /// dη/dμ = g'(μ)
    pub fn derivative(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| self.derivative_scalar(m))
    }

    /// dμ/dη = 1 / g'(g⁻¹(η))
    pub fn inverse_derivative(&self, eta: &Array1<f64>) -> Array1<f64> {
        eta.mapv(|e| self.inverse_derivative_scalar(e))
    }

    pub fn clean_scalar(&self, mu: f64) -> f64 {
        match self {
            Link::Logit | Link::Probit | Link::Cauchy | Link::CLogLog => binary::clean(mu),
            Link::Log => logscale::clean(mu),
            Link::Power(_) | Link::NegativeBinomial { .. } => mu,
        }
    }

    pub fn link_scalar(&self, mu: f64) -> f64 {
        let mu = self.clean_scalar(mu);
        match *self {
            Link::Power(p) => power::link(mu, p),
            Link::Log => logscale::link(mu),
            Link::Logit => binary::logit(mu),
            Link::Probit => binary::probit(mu),
            Link::Cauchy => binary::cauchy(mu),
            Link::CLogLog => binary::cloglog(mu),
            Link::NegativeBinomial { alpha } => logscale::nbinom(mu, alpha),
        }
    }

    pub fn inverse_scalar(&self, eta: f64) -> f64 {
        match *self {
            Link::Power(p) => power::inverse(eta, p),
            Link::Log => logscale::inverse(eta),
            Link::Logit => binary::logit_inverse(eta),
            Link::Probit => binary::probit_inverse(eta),
            Link::Cauchy => binary::cauchy_inverse(eta),
            Link::CLogLog => binary::cloglog_inverse(eta),
            Link::NegativeBinomial { alpha } => logscale::nbinom_inverse(eta, alpha),
        }
    }

    pub fn derivative_scalar(&self, mu: f64) -> f64 {
        let mu = self.clean_scalar(mu);
        match *self {
            Link::Power(p) => power::derivative(mu, p),
            Link::Log => logscale::derivative(mu),
            Link::Logit => binary::logit_derivative(mu),
            Link::Probit => binary::probit_derivative(mu),
            Link::Cauchy => binary::cauchy_derivative(mu),
            Link::CLogLog => binary::cloglog_derivative(mu),
            Link::NegativeBinomial { alpha } => logscale::nbinom_derivative(mu, alpha),
        }
    }

    pub fn inverse_derivative_scalar(&self, eta: f64) -> f64 {
        match *self {
            Link::Power(p) => power::inverse_derivative(eta, p),
            Link::Log => logscale::inverse_derivative(eta),
            Link::Logit => binary::logit_inverse_derivative(eta),
            Link::Probit => binary::probit_inverse_derivative(eta),
            Link::Cauchy => binary::cauchy_inverse_derivative(eta),
            Link::CLogLog => binary::cloglog_inverse_derivative(eta),
            Link::NegativeBinomial { alpha } => logscale::nbinom_inverse_derivative(eta, alpha),
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Link::Power(p) if self.kind() == LinkKind::Power => write!(f, "power({})", p),
            Link::NegativeBinomial { alpha } => write!(f, "nbinom(alpha={})", alpha),
            _ => f.write_str(self.name()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn all_links() -> Vec<(Link, Array1<f64>)> {
        let probs = array![0.01, 0.2, 0.5, 0.8, 0.99];
        let positive = array![0.1, 0.5, 1.0, 3.0, 25.0];
        vec![
            (Link::identity(), array![-3.0, -0.5, 0.0, 2.0, 10.0]),
            (Link::Log, positive.clone()),
            (Link::inverse_power(), positive.clone()),
            (Link::inverse_squared(), positive.clone()),
            (Link::sqrt(), positive.clone()),
            (Link::power(1.5), positive.clone()),
            (Link::negative_binomial(0.7), positive),
            (Link::Logit, probs.clone()),
            (Link::Probit, probs.clone()),
            (Link::Cauchy, probs.clone()),
            (Link::CLogLog, probs),
        ]
    }

    #[test]
    fn test_round_trip_all_links() {
        for (link, mu) in all_links() {
            let back = link.inverse(&link.link(&mu));
            for (a, b) in back.iter().zip(mu.iter()) {
                assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let h = 1e-6;
        for (link, mu) in all_links() {
            let d = link.derivative(&mu);
            for (i, &m) in mu.iter().enumerate() {
                let numeric = (link.link_scalar(m + h) - link.link_scalar(m - h)) / (2.0 * h);
                assert!(
                    (d[i] - numeric).abs() < 1e-4 * numeric.abs().max(1.0),
                    "{}: analytic {} vs numeric {} at mu={}",
                    link,
                    d[i],
                    numeric,
                    m
                );
            }
        }
    }

    #[test]
    fn test_inverse_derivative_is_reciprocal() {
        for (link, mu) in all_links() {
            let eta = link.link(&mu);
            let dmu_deta = link.inverse_derivative(&eta);
            let deta_dmu = link.derivative(&mu);
            for (a, b) in dmu_deta.iter().zip(deta_dmu.iter()) {
                assert_abs_diff_eq!(a * b, 1.0, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_power_zero_is_log() {
        assert_eq!(Link::power(0.0), Link::Log);
        assert_eq!(Link::power(1.0).kind(), LinkKind::Identity);
        assert_eq!(Link::power(-1.0).kind(), LinkKind::Inverse);
        assert_eq!(Link::power(-2.0).kind(), LinkKind::InverseSquared);
        assert_eq!(Link::power(0.5).kind(), LinkKind::Sqrt);
        assert_eq!(Link::power(3.0).kind(), LinkKind::Power);
    }

    #[test]
    fn test_clean_clips_probabilities() {
        let mu = array![0.0, 0.5, 1.0];
        let cleaned = Link::Logit.clean(&mu);
        assert!(cleaned[0] > 0.0);
        assert!(cleaned[2] < 1.0);
        assert_eq!(cleaned[1], 0.5);
        // Logit of a boundary value stays finite
        assert!(Link::Logit.link(&mu).iter().all(|v| v.is_finite()));
        // Power links do not clip
        assert_eq!(Link::identity().clean(&mu), mu);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Link::identity().to_string(), "identity");
        assert_eq!(Link::power(1.5).to_string(), "power(1.5)");
        assert_eq!(Link::negative_binomial(2.0).to_string(), "nbinom(alpha=2)");
        assert_eq!(Link::CLogLog.to_string(), "cloglog");
    }
}

//! Binomial family with per-observation trial counts.
//!
//! The response is a proportion y ∈ [0, 1]; with n trials the variance is
//! μ(1-μ)/n and the unit deviance is
//!
//!   2n [ y ln(y/μ) + (1-y) ln((1-y)/(1-μ)) ]
//!
//! which reduces to the binary formula when n = 1. Means are clipped to
//! [ε, 1-ε] before any logarithm.

use ndarray::{Array1, Zip};
use statrs::function::gamma::ln_gamma;

use super::check_response;
use crate::constants::CLIP_EPS;
use crate::error::Result;
use crate::special::{cox_snell, xlogy};
use crate::variance::Trials;

#[inline]
fn clip(mu: f64) -> f64 {
    mu.clamp(CLIP_EPS, 1.0 - CLIP_EPS)
}

fn check_proportions(y: &Array1<f64>, trials: &Trials) -> Result<()> {
    trials.check_len(y.len())?;
    check_response("Binomial", y, |v| (0.0..=1.0).contains(&v), "a proportion in [0, 1]")
}

pub(super) fn unit_deviance(
    y: &Array1<f64>,
    mu: &Array1<f64>,
    trials: &Trials,
) -> Result<Array1<f64>> {
    check_proportions(y, trials)?;
    let mut d = Array1::zeros(y.len());
    Zip::indexed(&mut d)
        .and(y)
        .and(mu)
        .for_each(|i, d, &yi, &mi| {
            let m = clip(mi);
            *d = 2.0 * trials.at(i) * (xlogy(yi, yi / m) + xlogy(1.0 - yi, (1.0 - yi) / (1.0 - m)));
        });
    Ok(d)
}

/// Binomial log-likelihood. Bernoulli responses drop the constant
/// combinatorial term, which is zero for 0/1 data.
pub(super) fn loglike(
    y: &Array1<f64>,
    mu: &Array1<f64>,
    scale: f64,
    weights: &Array1<f64>,
    trials: &Trials,
) -> Result<f64> {
    check_proportions(y, trials)?;
    let mut ll = 0.0;
    for i in 0..y.len() {
        let m = clip(mu[i]);
        let contribution = match trials {
            Trials::Bernoulli => xlogy(y[i], m) + xlogy(1.0 - y[i], 1.0 - m),
            Trials::Counts(n) => {
                let n = n[i];
                let successes = n * y[i];
                ln_gamma(n + 1.0) - ln_gamma(successes + 1.0) - ln_gamma(n - successes + 1.0)
                    + xlogy(successes, m)
                    + xlogy(n - successes, 1.0 - m)
            }
        };
        ll += weights[i] * contribution;
    }
    Ok(scale * ll)
}

/// `√n (B(y) - B(μ)) / (μ(1-μ))^⅙` with B the Cox–Snell transform.
pub(super) fn resid_anscombe(
    y: &Array1<f64>,
    mu: &Array1<f64>,
    trials: &Trials,
) -> Result<Array1<f64>> {
    check_proportions(y, trials)?;
    let mut r = Array1::zeros(y.len());
    for i in 0..y.len() {
        let m = clip(mu[i]);
        r[i] = trials.at(i).sqrt() * (cox_snell(y[i])? - cox_snell(m)?)
            / (m * (1.0 - m)).powf(1.0 / 6.0);
    }
    Ok(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_binary_deviance() {
        let d = unit_deviance(&array![1.0, 0.0], &array![0.8, 0.8], &Trials::Bernoulli).unwrap();
        assert_abs_diff_eq!(d[0], -2.0 * 0.8f64.ln(), epsilon = 1e-12);
        assert_abs_diff_eq!(d[1], -2.0 * 0.2f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_trials_scale_deviance() {
        let y = array![0.3];
        let mu = array![0.5];
        let one = unit_deviance(&y, &mu, &Trials::Bernoulli).unwrap();
        let ten = unit_deviance(&y, &mu, &Trials::Counts(array![10.0])).unwrap();
        assert_abs_diff_eq!(ten[0], 10.0 * one[0], epsilon = 1e-12);
    }

    #[test]
    fn test_boundary_mean_is_finite() {
        let d = unit_deviance(&array![1.0, 0.0], &array![0.0, 1.0], &Trials::Bernoulli).unwrap();
        assert!(d.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_counts_loglike_matches_pmf() {
        // C(4, 1) 0.25 0.75^3
        let ll = loglike(
            &array![0.25],
            &array![0.25],
            1.0,
            &array![1.0],
            &Trials::Counts(array![4.0]),
        )
        .unwrap();
        assert_abs_diff_eq!(ll, (4.0 * 0.25 * 0.75f64.powi(3)).ln(), epsilon = 1e-10);
    }

    #[test]
    fn test_bernoulli_loglike() {
        let ll = loglike(&array![1.0, 0.0], &array![0.7, 0.4], 1.0, &array![1.0, 1.0], &Trials::Bernoulli)
            .unwrap();
        assert_abs_diff_eq!(ll, 0.7f64.ln() + 0.6f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_anscombe_sign() {
        let r = resid_anscombe(&array![1.0, 0.0], &array![0.5, 0.5], &Trials::Bernoulli).unwrap();
        assert!(r[0] > 0.0 && r[1] < 0.0);
        assert_abs_diff_eq!(r[0], -r[1], epsilon = 1e-10);
    }

    #[test]
    fn test_response_outside_unit_interval() {
        assert!(unit_deviance(&array![1.5], &array![0.5], &Trials::Bernoulli).is_err());
    }
}

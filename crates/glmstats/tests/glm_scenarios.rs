//! End-to-end fits on small data sets with known answers.

use approx::assert_abs_diff_eq;
use glmstats::{
    fit_glm_full, ols, Family, FamilyKind, Glm, GlmStatsError, IRLSConfig, Link, Response,
    Trials,
};
use ndarray::{array, Array1, Array2};

fn intercept(n: usize) -> Array2<f64> {
    Array2::ones((n, 1))
}

fn with_intercept(x: &[f64]) -> Array2<f64> {
    Array2::from_shape_fn((x.len(), 2), |(i, j)| if j == 0 { 1.0 } else { x[i] })
}

#[test]
fn poisson_intercept_only_fits_the_mean() {
    let y = array![2.0, 3.0, 6.0, 7.0, 8.0, 9.0, 10.0, 12.0, 15.0];
    let res = Glm::new(y.clone(), intercept(9), Family::poisson())
        .unwrap()
        .fit(&IRLSConfig::default())
        .unwrap();

    let mean = y.mean().unwrap();
    for &m in res.fitted_values.iter() {
        assert_abs_diff_eq!(m, mean, epsilon = 1e-8);
    }
    assert_abs_diff_eq!(res.params[0], mean.ln(), epsilon = 1e-8);
    // An intercept-only model is its own null model
    assert_abs_diff_eq!(res.null_deviance, res.deviance, epsilon = 1e-8);
    assert_eq!(res.df_model, 0);
}

#[test]
fn gaussian_identity_matches_least_squares() {
    let x = array![
        [1.0, 0.3, 2.0],
        [1.0, 1.1, -1.0],
        [1.0, 2.4, 0.5],
        [1.0, 3.3, 1.0],
        [1.0, 4.0, -0.5],
        [1.0, 5.2, 2.5],
        [1.0, 6.1, 0.0],
        [1.0, 6.9, 1.5],
    ];
    let y = array![1.2, 1.9, 4.1, 5.8, 5.2, 9.9, 8.1, 11.3];

    let glm = Glm::new(y.clone(), x.clone(), Family::gaussian())
        .unwrap()
        .fit(&IRLSConfig::default())
        .unwrap();
    let ls = ols(&y, &x).unwrap();

    for j in 0..3 {
        assert_abs_diff_eq!(glm.params[j], ls.params[j], epsilon = 1e-8);
        assert_abs_diff_eq!(glm.bse()[j], ls.bse()[j], epsilon = 1e-8);
    }
    assert_abs_diff_eq!(glm.deviance, ls.ssr, epsilon = 1e-8);
    assert_abs_diff_eq!(glm.scale, ls.scale, epsilon = 1e-8);
    assert_abs_diff_eq!(glm.llf, ls.llf, epsilon = 1e-8);
}

#[test]
fn binomial_success_failure_counts() {
    let counts = array![[8.0, 2.0], [5.0, 5.0], [1.0, 9.0]];
    let res = Glm::new(counts, intercept(3), Family::binomial())
        .unwrap()
        .fit(&IRLSConfig::default())
        .unwrap();

    assert_eq!(res.family.trials(), Some(&Trials::Counts(array![10.0, 10.0, 10.0])));
    assert_abs_diff_eq!(res.response[0], 0.8, epsilon = 1e-12);
    assert_abs_diff_eq!(res.response[1], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(res.response[2], 0.1, epsilon = 1e-12);
    for &m in res.fitted_values.iter() {
        assert_abs_diff_eq!(m, 14.0 / 30.0, epsilon = 1e-8);
    }
}

#[test]
fn gamma_deviance_with_zero_response_is_finite() {
    let family = Family::gamma();
    let y = array![0.0, 1.0, 2.5];
    let mu = array![0.8, 1.2, 2.0];
    let dev = family.deviance(&y, &mu, 1.0).unwrap();
    assert!(dev.is_finite());
    let resid = family.devresid(&y, &mu).unwrap();
    assert_abs_diff_eq!(dev, resid.mapv(|r| r * r).sum(), epsilon = 1e-10);
}

#[test]
fn separated_binomial_data_does_not_converge() {
    let x = with_intercept(&[-3.0, -2.0, -1.0, 1.0, 2.0, 3.0]);
    let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
    let err = Glm::new(y, x, Family::binomial())
        .unwrap()
        .fit(&IRLSConfig::default())
        .unwrap_err();

    assert!(matches!(err, GlmStatsError::NonConvergence { .. }));
    let last = err.last_iterate().unwrap();
    assert!(!last.converged);
    assert_eq!(last.iterations, 100);
}

#[test]
fn refit_from_converged_mean_converges_immediately() {
    let x = with_intercept(&[0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5]);
    let y = array![1.3, 1.1, 2.2, 2.0, 3.9, 3.1, 5.6];
    let family = Family::with_link(FamilyKind::InverseGaussian, Link::Log).unwrap();

    let first = Glm::new(y.clone(), x.clone(), family.clone())
        .unwrap()
        .fit(&IRLSConfig::default())
        .unwrap();
    let second = Glm::new(y, x, family)
        .unwrap()
        .with_start_mu(first.fitted_values.clone())
        .fit(&IRLSConfig::default())
        .unwrap();

    assert_eq!(second.iterations, 1);
    for j in 0..2 {
        assert_abs_diff_eq!(first.params[j], second.params[j], epsilon = 1e-6);
    }
}

#[test]
fn invalid_link_is_rejected_at_construction() {
    let err = Family::with_link(FamilyKind::Poisson, Link::Logit).unwrap_err();
    assert!(matches!(err, GlmStatsError::InvalidLink { .. }));
    assert!(err.to_string().contains("Poisson"));
}

#[test]
fn offset_and_weights_flow_into_null_model() {
    let x = with_intercept(&[0.0, 1.0, 2.0, 3.0, 4.0]);
    let y = array![2.0, 3.0, 7.0, 9.0, 16.0];
    let exposure = array![1.0, 1.5, 2.0, 2.0, 3.0];
    let weights = array![1.0, 2.0, 1.0, 1.0, 2.0];
    let config = IRLSConfig::default();

    let res = Glm::new(y.clone(), x, Family::poisson())
        .unwrap()
        .with_offset(exposure.mapv(f64::ln))
        .with_weights(weights.clone())
        .fit(&config)
        .unwrap();

    let null = fit_glm_full(
        &Response::from(y),
        &intercept(5),
        &Family::poisson(),
        &config,
        Some(&exposure.mapv(f64::ln)),
        Some(&weights),
        None,
    )
    .unwrap();
    assert_abs_diff_eq!(res.null_deviance, null.deviance, epsilon = 1e-10);
    assert!(res.null_deviance >= res.deviance);
}

#[test]
fn negative_binomial_anscombe_approaches_poisson() {
    let y = array![0.0, 2.0, 5.0, 11.0];
    let mu = array![0.7, 2.5, 4.0, 9.0];
    let poisson = Family::poisson().resid_anscombe(&y, &mu).unwrap();
    let nb = Family::negative_binomial(1e-9)
        .unwrap()
        .resid_anscombe(&y, &mu)
        .unwrap();
    for i in 0..4 {
        assert_abs_diff_eq!(nb[i], poisson[i], epsilon = 1e-6);
    }
}

#[test]
fn negative_binomial_loglike_requires_linear_predictor() {
    let family = Family::negative_binomial(0.8).unwrap();
    let y = array![1.0, 4.0];
    let mu: Array1<f64> = array![1.5, 3.0];
    assert!(matches!(
        family.loglike(&y, &mu, None, 1.0).unwrap_err(),
        GlmStatsError::MissingArgument(_)
    ));
}

/// y = 0 below 15, alternating on 15..=20, 1 above; x runs to 60 so the
/// upper tail is fitted at probabilities indistinguishable from 1.
fn overlapping_with_extreme_tail() -> (Array1<f64>, Array2<f64>) {
    let x: Vec<f64> = (0..61).map(|i| i as f64).collect();
    let y = Array1::from_shape_fn(61, |i| match i {
        0..=14 => 0.0,
        15..=20 => ((i + 1) % 2) as f64,
        _ => 1.0,
    });
    (y, with_intercept(&x))
}

#[test]
fn logit_fit_with_clamped_tail_converges() {
    let (y, x) = overlapping_with_extreme_tail();
    let res = Glm::new(y, x, Family::binomial())
        .unwrap()
        .fit(&IRLSConfig::default())
        .unwrap();

    assert!(res.iterations < 100);
    assert_abs_diff_eq!(res.params[0], -13.049261, epsilon = 1e-4);
    assert_abs_diff_eq!(res.params[1], 0.745672, epsilon = 1e-5);
    assert_abs_diff_eq!(res.deviance, 8.823840, epsilon = 1e-5);
}

#[test]
fn cloglog_fit_with_clamped_tail_converges() {
    let (y, x) = overlapping_with_extreme_tail();
    let family = Family::with_link(FamilyKind::Binomial, Link::CLogLog).unwrap();
    let res = Glm::new(y, x, family)
        .unwrap()
        .fit(&IRLSConfig::default())
        .unwrap();

    assert!(res.iterations < 100);
    assert_abs_diff_eq!(res.params[0], -9.877572, epsilon = 1e-4);
    assert_abs_diff_eq!(res.params[1], 0.530124, epsilon = 1e-5);
    assert_abs_diff_eq!(res.deviance, 8.694736, epsilon = 1e-5);
}

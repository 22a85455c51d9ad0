//! Power links: η = μ^p.
//!
//! Identity, inverse, inverse squared and sqrt are the exponents 1, -1, -2
//! and ½. An exponent of 0 is treated as the log link.

#[inline]
pub(super) fn link(mu: f64, p: f64) -> f64 {
    if p == 0.0 {
        return mu.ln();
    }
    if p == 1.0 {
        return mu;
    }
    mu.powf(p)
}

#[inline]
pub(super) fn inverse(eta: f64, p: f64) -> f64 {
    if p == 0.0 {
        return eta.exp();
    }
    if p == 1.0 {
        return eta;
    }
    eta.powf(1.0 / p)
}

/// dη/dμ = p μ^(p-1)
#[inline]
pub(super) fn derivative(mu: f64, p: f64) -> f64 {
    if p == 0.0 {
        return 1.0 / mu;
    }
    if p == 1.0 {
        return 1.0;
    }
    p * mu.powf(p - 1.0)
}

/// dμ/dη = (1/p) η^(1/p - 1)
#[inline]
pub(super) fn inverse_derivative(eta: f64, p: f64) -> f64 {
    if p == 0.0 {
        return eta.exp();
    }
    if p == 1.0 {
        return 1.0;
    }
    eta.powf(1.0 / p - 1.0) / p
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_inverse_power() {
        assert_abs_diff_eq!(link(4.0, -1.0), 0.25, epsilon = 1e-15);
        assert_abs_diff_eq!(inverse(0.25, -1.0), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(derivative(2.0, -1.0), -0.25, epsilon = 1e-15);
    }

    #[test]
    fn test_inverse_squared() {
        assert_abs_diff_eq!(link(2.0, -2.0), 0.25, epsilon = 1e-15);
        assert_abs_diff_eq!(inverse(0.25, -2.0), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(derivative(2.0, -2.0), -0.25, epsilon = 1e-15);
    }

    #[test]
    fn test_sqrt() {
        assert_abs_diff_eq!(link(9.0, 0.5), 3.0, epsilon = 1e-15);
        assert_abs_diff_eq!(derivative(9.0, 0.5), 1.0 / 6.0, epsilon = 1e-15);
        assert_abs_diff_eq!(inverse_derivative(3.0, 0.5), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_exponent_is_log() {
        assert_abs_diff_eq!(link(std::f64::consts::E, 0.0), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(inverse(0.0, 0.0), 1.0, epsilon = 1e-15);
    }
}

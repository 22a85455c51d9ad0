// =============================================================================
// ndarray ↔ nalgebra Conversion and Least Squares
// =============================================================================
//
// Arrays live in ndarray throughout the crate; factorizations come from
// nalgebra. This module owns the conversions and the one least squares
// routine every fit goes through.
//
// LEAST SQUARES
// -------------
// The weighted problem  min Σ wᵢ (zᵢ - xᵢᵀβ)²  is solved on the scaled
// system  √W X β ≈ √W z  with a thin SVD  √W X = U Σ Vᵀ:
//
//     β        = V Σ⁺ Uᵀ √W z
//     (XᵀWX)⁻¹ = V Σ⁺² Vᵀ
//
// The normal equations are never formed, so the condition number of the
// solve is that of √W X and not its square. Singular values below
// SVD_RCOND × σ_max are treated as zero, which gives the minimum-norm
// solution for rank-deficient designs.
//
// =============================================================================

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

use crate::constants::SVD_RCOND;
use crate::error::{GlmStatsError, Result};

// =============================================================================
// ndarray → nalgebra
// =============================================================================

/// Convert an ndarray Array2 to a nalgebra DMatrix.
#[inline]
pub fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

/// Convert an ndarray Array1 to a nalgebra DVector.
#[inline]
pub fn to_dvector(v: &Array1<f64>) -> DVector<f64> {
    DVector::from_iterator(v.len(), v.iter().copied())
}

// =============================================================================
// nalgebra → ndarray
// =============================================================================

/// Convert a nalgebra DMatrix to an ndarray Array2.
#[inline]
pub fn to_array2(m: &DMatrix<f64>) -> Array2<f64> {
    let (nrows, ncols) = m.shape();
    Array2::from_shape_fn((nrows, ncols), |(i, j)| m[(i, j)])
}

/// Convert a nalgebra DVector to an ndarray Array1.
#[inline]
pub fn to_array1(v: &DVector<f64>) -> Array1<f64> {
    Array1::from_iter(v.iter().copied())
}

// =============================================================================
// Least squares
// =============================================================================

/// Solution of a (weighted) least squares problem.
#[derive(Debug, Clone)]
pub struct LstsqSolution {
    pub coefficients: Array1<f64>,
    /// `(XᵀWX)⁺`, the covariance of β up to the dispersion.
    pub cov_unscaled: Array2<f64>,
    /// Numerical rank of the (scaled) design.
    pub rank: usize,
    /// `σ_max / σ_min` of the scaled design (infinite if singular).
    pub condition_number: f64,
}

/// Solve `A β ≈ b` in the least squares sense via thin SVD.
pub fn lstsq(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<LstsqSolution> {
    let (n, p) = a.shape();
    if n == 0 || p == 0 {
        return Err(GlmStatsError::EmptyInput(format!(
            "least squares needs a non-empty design, got {}x{}",
            n, p
        )));
    }
    if b.len() != n {
        return Err(GlmStatsError::DimensionMismatch(format!(
            "design has {} rows but the response has {} elements",
            n,
            b.len()
        )));
    }
    if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
        return Err(GlmStatsError::LinearAlgebraError(
            "least squares inputs contain non-finite values".to_string(),
        ));
    }

    let svd = a.clone().svd(true, true);
    let u = svd
        .u
        .ok_or_else(|| GlmStatsError::LinearAlgebraError("SVD did not return U".to_string()))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| GlmStatsError::LinearAlgebraError("SVD did not return Vᵀ".to_string()))?;
    let s = &svd.singular_values;

    let s_max = s.iter().copied().fold(0.0_f64, f64::max);
    // Fewer rows than columns leaves p - n singular values implicitly zero
    let s_min = if s.len() < p {
        0.0
    } else {
        s.iter().copied().fold(f64::INFINITY, f64::min)
    };
    let cutoff = SVD_RCOND * s_max;

    let s_inv: Vec<f64> = s
        .iter()
        .map(|&sv| if sv > cutoff { 1.0 / sv } else { 0.0 })
        .collect();
    let rank = s_inv.iter().filter(|&&si| si > 0.0).count();

    // β = V Σ⁺ Uᵀ b
    let utb = u.transpose() * b;
    let scaled = DVector::from_iterator(utb.len(), utb.iter().zip(&s_inv).map(|(c, si)| c * si));
    let v = v_t.transpose();
    let beta = &v * scaled;

    // (AᵀA)⁺ = V Σ⁺² Vᵀ
    let v_scaled = DMatrix::from_fn(v.nrows(), v.ncols(), |i, k| v[(i, k)] * s_inv[k] * s_inv[k]);
    let cov = v_scaled * &v_t;

    let condition_number = if s_min > 0.0 { s_max / s_min } else { f64::INFINITY };

    Ok(LstsqSolution {
        coefficients: to_array1(&beta),
        cov_unscaled: to_array2(&cov),
        rank,
        condition_number,
    })
}

/// Solve `min Σ wᵢ (zᵢ - xᵢᵀβ)²` on the √W-scaled system.
pub fn weighted_lstsq(x: &Array2<f64>, z: &Array1<f64>, w: &Array1<f64>) -> Result<LstsqSolution> {
    if x.nrows() != z.len() || w.len() != z.len() {
        return Err(GlmStatsError::DimensionMismatch(format!(
            "design has {} rows, response {} elements, weights {} elements",
            x.nrows(),
            z.len(),
            w.len()
        )));
    }
    if let Some(i) = w.iter().position(|&wi| !(wi.is_finite() && wi >= 0.0)) {
        return Err(GlmStatsError::InvalidValue(format!(
            "least squares weight {} at observation {} is not a non-negative number",
            w[i], i
        )));
    }

    let sqrt_w = w.mapv(f64::sqrt);
    let a = DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| x[[i, j]] * sqrt_w[i]);
    let b = DVector::from_iterator(z.len(), z.iter().zip(sqrt_w.iter()).map(|(zi, si)| zi * si));
    lstsq(&a, &b)
}

// =============================================================================
// Tests
// =============================================================================

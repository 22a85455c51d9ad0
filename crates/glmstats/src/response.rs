//! Response data handed to a GLM fit.

use ndarray::{Array1, Array2};

/// The response variable.
///
/// Binomial models may be given a two-column (successes, failures) matrix;
/// every family accepts a plain vector.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Vector(Array1<f64>),
    SuccessFailure(Array2<f64>),
}

impl Response {
    /// Number of observations.
    pub fn len(&self) -> usize {
        match self {
            Response::Vector(y) => y.len(),
            Response::SuccessFailure(counts) => counts.nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Array1<f64>> for Response {
    fn from(y: Array1<f64>) -> Self {
        Response::Vector(y)
    }
}

impl From<Array2<f64>> for Response {
    fn from(counts: Array2<f64>) -> Self {
        Response::SuccessFailure(counts)
    }
}

impl From<&Array1<f64>> for Response {
    fn from(y: &Array1<f64>) -> Self {
        Response::Vector(y.clone())
    }
}

//! # Regularized Linear Regression
//!
//! Ridge regression over the flattened feature matrix. The design matrix gets
//! an intercept column of ones; every other column is standardized with the
//! training fold's sample statistics before fitting. The cost is the mean
//! squared residual plus an L2 penalty on all parameters except the
//! intercept, scaled by `1 / (2 * C * m)`; minimization is delegated to the
//! external BFGS solver, which only sees a cost-and-gradient closure, an
//! all-zero starting point and an iteration budget.

use crate::matrix::{Axis, Matrix};
use ndarray::Array1;
use thiserror::Error;
use wolfe_bfgs::{Bfgs, BfgsSolution};

#[derive(Error, Debug)]
pub enum RegressError {
    #[error("BFGS minimization failed: {0}")]
    Optimizer(String),
}

/// Returns `m` with a column of ones prepended.
pub fn with_intercept(m: &Matrix) -> Matrix {
    let (rows, cols) = m.shape();
    let mut out = Matrix::ones(rows, cols + 1);
    for r in 0..rows {
        let row = m.row(r as isize).to_vec();
        out.block_mut(r as isize, 1, 1, cols).assign(&row);
    }
    out
}

/// Per-column shift/scale learned from the training fold.
///
/// Column 0 is the intercept and is left alone. A zero-variance column is
/// centered but not scaled, so standardization can never manufacture a
/// non-finite value.
pub struct Standardization {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl Standardization {
    /// Sample statistics (ddof = 1) of every non-intercept column of `train`.
    pub fn fit(train: &Matrix) -> Self {
        let (rows, cols) = train.shape();
        let mut mean = vec![0.0; cols];
        let mut scale = vec![1.0; cols];

        for c in 1..cols {
            let column = train.column(c as isize);
            let m = column.iter().sum::<f64>() / rows as f64;
            mean[c] = m;
            if rows > 1 {
                let ss: f64 = column.iter().map(|v| (v - m) * (v - m)).sum();
                let sd = (ss / (rows - 1) as f64).sqrt();
                if sd.is_finite() && sd > 0.0 {
                    scale[c] = sd;
                }
            }
        }

        Self { mean, scale }
    }

    /// Applies the learned shift/scale in place.
    pub fn apply(&self, m: &mut Matrix) {
        assert_eq!(
            m.cols(),
            self.mean.len(),
            "standardization learned on {} columns, applied to {}",
            self.mean.len(),
            m.cols()
        );
        for c in 1..m.cols() {
            let shifted: Vec<f64> = m
                .column(c as isize)
                .iter()
                .map(|v| (v - self.mean[c]) / self.scale[c])
                .collect();
            m.column_mut(c as isize).assign(&shifted);
        }
    }
}

/// Ridge cost and gradient at `theta`.
///
/// `J = (||X theta - y||^2 + (theta' theta - theta_0^2) / C) / (2 m)`; the
/// gradient is the standard ridge gradient with the intercept component
/// unregularized.
pub fn cost_grad(theta: &[f64], x: &Matrix, y: &[f64], c: f64) -> (f64, Vec<f64>) {
    let (m, n) = x.shape();
    assert_eq!(y.len(), m, "target length {} != row count {m}", y.len());
    assert_eq!(theta.len(), n, "parameter length {} != column count {n}", theta.len());

    let mut residual = vec![0.0; m];
    x.mul(Axis::Row, theta, &mut residual, |_, dot| dot);
    for (h, &target) in residual.iter_mut().zip(y) {
        *h -= target;
    }

    let sigma: f64 = residual.iter().map(|h| h * h).sum();
    let penalty: f64 = theta.iter().map(|t| t * t).sum::<f64>() - theta[0] * theta[0];
    let cost = (sigma + penalty / c) / (2.0 * m as f64);

    let mut grad: Vec<f64> = theta.iter().map(|t| t / c).collect();
    grad[0] = 0.0;
    x.mul(Axis::Column, &residual, &mut grad, |acc, dot| acc + dot);
    for g in grad.iter_mut() {
        *g /= m as f64;
    }

    (cost, grad)
}

/// Ridge fit via the external BFGS minimizer.
pub struct RidgeRegression {
    c: f64,
    max_iterations: usize,
}

impl RidgeRegression {
    pub fn new(c: f64, max_iterations: usize) -> Self {
        Self { c, max_iterations }
    }

    /// Minimizes the ridge cost from an all-zero starting point and returns
    /// the optimized parameter vector.
    pub fn fit(&self, x: &Matrix, y: &[f64]) -> Result<Vec<f64>, RegressError> {
        let c = self.c;
        let cost_and_grad = move |theta: &Array1<f64>| -> (f64, Array1<f64>) {
            let (cost, grad) = cost_grad(&theta.to_vec(), x, y, c);
            (cost, Array1::from_vec(grad))
        };

        let BfgsSolution { final_point, .. } = Bfgs::new(Array1::zeros(x.cols()), cost_and_grad)
            .with_tolerance(1e-6)
            .with_max_iterations(self.max_iterations)
            .run()
            .map_err(|e| RegressError::Optimizer(format!("{e:?}")))?;

        Ok(final_point.to_vec())
    }
}

/// Prediction: `X theta` row by row.
pub fn predict(x: &Matrix, theta: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; x.rows()];
    x.mul(Axis::Row, theta, &mut out, |_, dot| dot);
    out
}

/// The full regression step of one ensemble repetition: intercept columns,
/// train-fold standardization of both folds, fit, predict.
pub fn fit_and_predict(
    x_train: &Matrix,
    y: &[f64],
    x_test: &Matrix,
    c: f64,
    max_iterations: usize,
) -> Result<Vec<f64>, RegressError> {
    let mut train = with_intercept(x_train);
    let mut test = with_intercept(x_test);

    let standardization = Standardization::fit(&train);
    standardization.apply(&mut train);
    standardization.apply(&mut test);

    let theta = RidgeRegression::new(c, max_iterations).fit(&train, y)?;
    Ok(predict(&test, &theta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn design(xs: &[f64]) -> Matrix {
        let mut m = Matrix::ones(xs.len(), 2);
        for (r, &x) in xs.iter().enumerate() {
            m.set(r as isize, 1, x);
        }
        m
    }

    #[test]
    fn cost_and_gradient_match_hand_computation() {
        let x = Matrix::from_vec(1, 2, vec![1.0, 2.0]);
        let y = [1.0];
        let (cost, grad) = cost_grad(&[0.0, 0.0], &x, &y, 1.0);
        assert_abs_diff_eq!(cost, 0.5);
        assert_abs_diff_eq!(grad[0], -1.0);
        assert_abs_diff_eq!(grad[1], -2.0);
    }

    #[test]
    fn gradient_agrees_with_finite_differences() {
        let x = Matrix::from_vec(3, 2, vec![1.0, 0.5, 1.0, -1.5, 1.0, 2.5]);
        let y = [1.0, 0.0, 3.0];
        let theta = [0.3, -0.7];
        let c = 10.0;

        let (_, grad) = cost_grad(&theta, &x, &y, c);
        let eps = 1e-6;
        for j in 0..theta.len() {
            let mut plus = theta;
            let mut minus = theta;
            plus[j] += eps;
            minus[j] -= eps;
            let (cp, _) = cost_grad(&plus, &x, &y, c);
            let (cm, _) = cost_grad(&minus, &x, &y, c);
            let numeric = (cp - cm) / (2.0 * eps);
            assert_abs_diff_eq!(grad[j], numeric, epsilon = 1e-5);
        }
    }

    #[test]
    fn recovers_a_noiseless_line_with_weak_regularization() {
        let xs: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 + 3.0 * x).collect();
        let x = design(&xs);

        let theta = RidgeRegression::new(1e9, 200).fit(&x, &ys).unwrap();
        assert_abs_diff_eq!(theta[0], 2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(theta[1], 3.0, epsilon = 1e-3);
    }

    #[test]
    fn fit_and_predict_extrapolates_the_line() {
        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 + 3.0 * x).collect();
        let x_train = Matrix::from_vec(10, 1, xs);
        let x_test = Matrix::from_vec(2, 1, vec![10.0, 11.0]);

        let predictions = fit_and_predict(&x_train, &ys, &x_test, 1e9, 200).unwrap();
        assert_abs_diff_eq!(predictions[0], 32.0, epsilon = 1e-2);
        assert_abs_diff_eq!(predictions[1], 35.0, epsilon = 1e-2);
    }

    #[test]
    fn zero_variance_columns_standardize_without_nan() {
        // Second feature column is constant; the scale step must be skipped.
        let x = Matrix::from_vec(3, 2, vec![1.0, 5.0, 2.0, 5.0, 3.0, 5.0]);
        let mut design = with_intercept(&x);
        let standardization = Standardization::fit(&design);
        standardization.apply(&mut design);

        for r in 0..design.rows() {
            for c in 0..design.cols() {
                assert!(design.get(r as isize, c as isize).is_finite());
            }
        }
        // The constant column centers to zero.
        assert_eq!(design.column(2).to_vec(), vec![0.0, 0.0, 0.0]);
    }
}

//! L2-regularized logistic regression fitted by Newton's method (IRLS)
//!
//! Minimizes `Σ logloss + ||w||² / (2C)` with an unpenalized intercept. Each
//! iteration solves the (d+1)×(d+1) Newton system with a pivoted LU.

use faer::prelude::*;
use faer::Mat;
use serde::{Deserialize, Serialize};

use super::{check_training_input, sigmoid, FitError};
use crate::pipeline::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticParams {
    /// Inverse regularization strength
    pub c: f64,
    pub max_iterations: usize,
    /// Convergence when the largest Newton step component falls below this
    pub tolerance: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iterations: 100,
            tolerance: 1e-8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    intercept: f64,
    coefficients: Vec<f64>,
    iterations: usize,
}

impl LogisticRegression {
    pub fn fit(x: &Matrix, labels: &[u8], params: &LogisticParams) -> Result<Self, FitError> {
        check_training_input(x, labels)?;
        if !(params.c > 0.0 && params.c.is_finite()) {
            return Err(FitError::NonFinite("regularization strength"));
        }

        let d = x.n_cols();
        let p = d + 1;
        let penalty = 1.0 / params.c;
        // beta[0] is the intercept
        let mut beta = vec![0.0; p];

        for iteration in 1..=params.max_iterations {
            let mut grad = vec![0.0; p];
            let mut hess = vec![0.0; p * p];

            for (row, &label) in x.rows().zip(labels) {
                let z = beta[0] + dot(&beta[1..], row);
                let mu = sigmoid(z);
                let residual = mu - label as f64;
                let w = mu * (1.0 - mu);

                grad[0] += residual;
                hess[0] += w;
                for a in 0..d {
                    grad[a + 1] += residual * row[a];
                    hess[a + 1] += w * row[a];
                    let wa = w * row[a];
                    for b in a..d {
                        hess[(a + 1) * p + b + 1] += wa * row[b];
                    }
                }
            }

            for j in 1..p {
                grad[j] += penalty * beta[j];
                hess[j * p + j] += penalty;
            }

            // Only the upper triangle was accumulated
            let hessian = Mat::<f64>::from_fn(p, p, |i, j| {
                if i <= j {
                    hess[i * p + j]
                } else {
                    hess[j * p + i]
                }
            });
            let rhs = Mat::<f64>::from_fn(p, 1, |i, _| grad[i]);
            let step = hessian.partial_piv_lu().solve(rhs.as_ref());

            let mut max_step = 0.0f64;
            for (j, b) in beta.iter_mut().enumerate() {
                let delta = step[(j, 0)];
                if !delta.is_finite() {
                    return Err(FitError::NonFinite("Newton step"));
                }
                *b -= delta;
                max_step = max_step.max(delta.abs());
            }

            if max_step < params.tolerance {
                return Ok(Self {
                    intercept: beta[0],
                    coefficients: beta[1..].to_vec(),
                    iterations: iteration,
                });
            }
        }

        Err(FitError::NonConvergence {
            iterations: params.max_iterations,
        })
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Log-odds of default
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        self.intercept + dot(&self.coefficients, x)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

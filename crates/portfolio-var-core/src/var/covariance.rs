use serde::{Deserialize, Serialize};

use crate::error::PortfolioVarError;
use crate::returns::LogReturnMatrix;
use crate::types::TRADING_PERIODS_PER_YEAR;
use crate::PortfolioVarResult;

/// Annualised sample covariance of per-asset log returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovarianceMatrix {
    values: Vec<Vec<f64>>,
}

impl CovarianceMatrix {
    /// Sample covariance (denominator `T - 1`) scaled by 252 periods/year.
    pub fn annualized(matrix: &LogReturnMatrix) -> PortfolioVarResult<Self> {
        let t = matrix.n_periods();
        if t < 2 {
            return Err(PortfolioVarError::InsufficientData(format!(
                "Covariance needs at least 2 return observations, got {}",
                t
            )));
        }

        let n = matrix.n_assets();
        let t_f = t as f64;
        let means: Vec<f64> = (0..n)
            .map(|j| matrix.rows().iter().map(|row| row[j]).sum::<f64>() / t_f)
            .collect();

        let scale = TRADING_PERIODS_PER_YEAR as f64 / (t_f - 1.0);
        let mut values = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in i..n {
                let sum: f64 = matrix
                    .rows()
                    .iter()
                    .map(|row| (row[i] - means[i]) * (row[j] - means[j]))
                    .sum();
                let cov = sum * scale;
                values[i][j] = cov;
                values[j][i] = cov;
            }
        }

        Ok(Self { values })
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// `wᵀ Σ w`; callers guarantee `weights.len() == dim()`.
    pub fn quadratic_form(&self, weights: &[f64]) -> f64 {
        self.values
            .iter()
            .zip(weights)
            .map(|(row, wi)| wi * row.iter().zip(weights).map(|(c, wj)| c * wj).sum::<f64>())
            .sum()
    }
}

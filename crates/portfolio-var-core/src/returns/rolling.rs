use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::log_returns::LogReturnMatrix;
use crate::error::PortfolioVarError;
use crate::weights::Weights;
use crate::PortfolioVarResult;

/// Weighted sum of each row: the portfolio log return per period.
pub fn portfolio_returns(
    matrix: &LogReturnMatrix,
    weights: &Weights,
) -> PortfolioVarResult<Vec<f64>> {
    if weights.len() != matrix.n_assets() {
        return Err(PortfolioVarError::invalid(
            "weights",
            format!(
                "Expected {} weights, got {}",
                matrix.n_assets(),
                weights.len()
            ),
        ));
    }
    Ok(matrix.rows().iter().map(|row| weights.dot(row)).collect())
}

/// Multi-period portfolio log returns over a trailing window.
///
/// Each value is the sum of `window` consecutive single-period returns
/// (log returns are additive across periods). Only full windows appear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingReturnSeries {
    window: usize,
    /// Date closing each window; empty when built without a calendar.
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl RollingReturnSeries {
    /// Trailing sums over `returns`; `dates` (if non-empty) label each period.
    pub fn from_returns(
        returns: &[f64],
        dates: &[NaiveDate],
        window: usize,
    ) -> PortfolioVarResult<Self> {
        if window == 0 {
            return Err(PortfolioVarError::invalid(
                "window",
                "Rolling window must be at least 1 period",
            ));
        }

        let values: Vec<f64> = returns.windows(window).map(|w| w.iter().sum()).collect();
        let dates = if dates.len() == returns.len() && !values.is_empty() {
            dates[window - 1..].to_vec()
        } else {
            Vec::new()
        };

        Ok(Self {
            window,
            dates,
            values,
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

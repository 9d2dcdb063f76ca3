use serde::{Deserialize, Serialize};

use crate::error::PortfolioVarError;
use crate::PortfolioVarResult;

const SUM_TOLERANCE: f64 = 1e-9;

/// Portfolio weights: non-negative, finite, summing to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Weights(Vec<f64>);

impl Weights {
    /// Equal-weight policy: `1/n` per asset.
    pub fn equal(n: usize) -> PortfolioVarResult<Self> {
        if n == 0 {
            return Err(PortfolioVarError::invalid(
                "weights",
                "Equal weights need at least one asset",
            ));
        }
        Ok(Self(vec![1.0 / n as f64; n]))
    }

    pub fn new(values: Vec<f64>) -> PortfolioVarResult<Self> {
        if values.is_empty() {
            return Err(PortfolioVarError::invalid("weights", "At least one weight required"));
        }
        if let Some(w) = values.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(PortfolioVarError::invalid(
                "weights",
                format!("Weights must be finite and non-negative, got {}", w),
            ));
        }
        let sum: f64 = values.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(PortfolioVarError::invalid(
                "weights",
                format!("Weights must sum to 1, got {}", sum),
            ));
        }
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Weighted sum of `values`; callers guarantee matching lengths.
    pub fn dot(&self, values: &[f64]) -> f64 {
        self.0.iter().zip(values).map(|(w, v)| w * v).sum()
    }
}

impl TryFrom<Vec<f64>> for Weights {
    type Error = PortfolioVarError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Weights::new(values)
    }
}

impl From<Weights> for Vec<f64> {
    fn from(w: Weights) -> Self {
        w.0
    }
}

use serde::{Deserialize, Serialize};

use crate::distribution::PnlDistribution;
use crate::engine::VarRequest;
use crate::var::{format_currency, VarEstimate};

/// Immutable snapshot of one `compute_var` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub request: VarRequest,
    pub historical: VarEstimate,
    pub parametric: VarEstimate,
    /// Aligned single-period log-return rows
    pub observations: usize,
    /// Full rolling windows behind the historical estimate
    pub rolling_observations: usize,
    pub pnl_distribution: PnlDistribution,
    pub warnings: Vec<String>,
}

/// One row of the "previous calculations" table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub tickers: String,
    pub window: usize,
    pub confidence: String,
    pub historical: String,
    pub parametric: String,
}

impl ResultSet {
    pub fn estimates(&self) -> [&VarEstimate; 2] {
        [&self.historical, &self.parametric]
    }

    pub fn summary(&self) -> ResultSummary {
        ResultSummary {
            tickers: self.request.tickers.join(" "),
            window: self.request.window,
            confidence: format!("{:.2}%", self.request.confidence_level * 100.0),
            historical: format_currency(self.historical.loss),
            parametric: format_currency(self.parametric.loss),
        }
    }
}

//! Price table → per-asset log returns → rolling portfolio returns.

pub mod alignment;
pub mod log_returns;
pub mod rolling;

pub use alignment::{align, AlignedPrices};
pub use log_returns::LogReturnMatrix;
pub use rolling::{portfolio_returns, RollingReturnSeries};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{DateRange, PriceSeries};
use crate::weights::Weights;
use crate::PortfolioVarResult;

/// Everything the estimators consume, produced once per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub log_returns: LogReturnMatrix,
    pub portfolio_returns: Vec<f64>,
    pub rolling: RollingReturnSeries,
}

/// Stateless transformation from prices to the rolling return series.
pub struct ReturnsPipeline;

impl ReturnsPipeline {
    /// Align `prices` for `tickers` over `range`, then derive log returns,
    /// weighted portfolio returns and `window`-period rolling sums.
    pub fn build(
        prices: &PriceSeries,
        tickers: &[String],
        range: DateRange,
        window: usize,
        weights: &Weights,
    ) -> PortfolioVarResult<PipelineOutput> {
        let aligned = align(prices, tickers, range)?;
        debug!(
            tickers = aligned.tickers.len(),
            dates = aligned.n_dates(),
            "aligned price table"
        );
        let log_returns = LogReturnMatrix::from_prices(&aligned);
        Self::from_matrix(log_returns, window, weights)
    }

    /// Same as [`ReturnsPipeline::build`] for an already computed matrix.
    pub fn from_matrix(
        log_returns: LogReturnMatrix,
        window: usize,
        weights: &Weights,
    ) -> PortfolioVarResult<PipelineOutput> {
        let portfolio_returns = portfolio_returns(&log_returns, weights)?;
        let rolling =
            RollingReturnSeries::from_returns(&portfolio_returns, log_returns.dates(), window)?;
        debug!(
            periods = log_returns.n_periods(),
            window,
            rolling = rolling.len(),
            "built rolling return series"
        );
        Ok(PipelineOutput {
            log_returns,
            portfolio_returns,
            rolling,
        })
    }
}

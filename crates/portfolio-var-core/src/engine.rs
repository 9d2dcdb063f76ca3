//! The `compute_var` entry point and its inbound/outbound contracts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info_span, warn};

use crate::distribution::{pnl_distribution, DEFAULT_HISTOGRAM_BINS};
use crate::error::PortfolioVarError;
use crate::result_set::ResultSet;
use crate::returns::ReturnsPipeline;
use crate::types::{DateRange, Money, PricePoint, PriceSeries, TRADING_PERIODS_PER_YEAR};
use crate::var::{historical_var, parametric_var, validate_confidence};
use crate::weights::Weights;
use crate::PortfolioVarResult;

pub const DEFAULT_TICKERS: [&str; 3] = ["AAPL", "MSFT", "GOOG"];
pub const DEFAULT_WINDOW: usize = 20;
pub const DEFAULT_CONFIDENCE: f64 = 0.95;
pub const DEFAULT_PORTFOLIO_VALUE: Money = dec!(100000);
pub const MIN_CONFIDENCE: f64 = 0.90;
pub const MAX_CONFIDENCE: f64 = 0.99;

const BOUND_TOLERANCE: f64 = 1e-9;

pub fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn default_bins() -> usize {
    DEFAULT_HISTOGRAM_BINS
}

/// One VaR calculation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarRequest {
    pub tickers: Vec<String>,
    pub start: NaiveDate,
    /// Exclusive end of the price window
    pub end: NaiveDate,
    /// Holding window in trading periods, 1 to 252
    pub window: usize,
    /// Confidence level, 0.90 to 0.99
    pub confidence_level: f64,
    pub portfolio_value: Money,
    /// Explicit weights in ticker order; equal weights when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f64>>,
    /// Bins in the P&L histogram
    #[serde(default = "default_bins")]
    pub histogram_bins: usize,
}

impl VarRequest {
    /// Request using the stock defaults, ending (exclusive) at `end`.
    pub fn with_defaults(end: NaiveDate) -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
            start: default_start(),
            end,
            window: DEFAULT_WINDOW,
            confidence_level: DEFAULT_CONFIDENCE,
            portfolio_value: DEFAULT_PORTFOLIO_VALUE,
            weights: None,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }

    pub fn validate(&self) -> PortfolioVarResult<()> {
        if self.tickers.is_empty() {
            return Err(PortfolioVarError::invalid("tickers", "At least one ticker required"));
        }
        let mut seen = HashSet::new();
        for ticker in &self.tickers {
            if ticker.trim().is_empty() {
                return Err(PortfolioVarError::invalid("tickers", "Ticker symbols must be non-empty"));
            }
            if !seen.insert(ticker.as_str()) {
                return Err(PortfolioVarError::invalid(
                    "tickers",
                    format!("Duplicate ticker '{}'", ticker),
                ));
            }
        }
        if self.start >= self.end {
            return Err(PortfolioVarError::invalid(
                "start",
                format!("Start date {} must precede end date {}", self.start, self.end),
            ));
        }
        let max_window = TRADING_PERIODS_PER_YEAR as usize;
        if self.window == 0 || self.window > max_window {
            return Err(PortfolioVarError::invalid(
                "window",
                format!("Rolling window must be between 1 and {}, got {}", max_window, self.window),
            ));
        }
        validate_confidence(self.confidence_level)?;
        if self.confidence_level < MIN_CONFIDENCE - BOUND_TOLERANCE
            || self.confidence_level > MAX_CONFIDENCE + BOUND_TOLERANCE
        {
            return Err(PortfolioVarError::invalid(
                "confidence_level",
                format!(
                    "Confidence level must be between {} and {}, got {}",
                    MIN_CONFIDENCE, MAX_CONFIDENCE, self.confidence_level
                ),
            ));
        }
        if self.portfolio_value <= Decimal::ZERO {
            return Err(PortfolioVarError::invalid(
                "portfolio_value",
                "Portfolio value must be positive",
            ));
        }
        if self.histogram_bins == 0 {
            return Err(PortfolioVarError::invalid("histogram_bins", "At least one bin required"));
        }
        self.resolved_weights().map(|_| ())
    }

    /// Explicit weights if supplied (validated against the ticker count),
    /// otherwise `1/n` each.
    pub fn resolved_weights(&self) -> PortfolioVarResult<Weights> {
        match &self.weights {
            None => Weights::equal(self.tickers.len()),
            Some(w) if w.len() != self.tickers.len() => Err(PortfolioVarError::invalid(
                "weights",
                format!("Expected {} weights, got {}", self.tickers.len(), w.len()),
            )),
            Some(w) => Weights::new(w.clone()),
        }
    }
}

/// Supplies adjusted-close prices for the requested tickers and range.
///
/// Implementations own all I/O, retries and timeouts. A ticker that cannot
/// be served should be reported as [`PortfolioVarError::UpstreamData`] or
/// simply left out of the returned map.
pub trait PriceSource {
    fn fetch_adjusted_close(
        &self,
        tickers: &[String],
        range: DateRange,
    ) -> PortfolioVarResult<PriceSeries>;
}

impl<F> PriceSource for F
where
    F: Fn(&[String], DateRange) -> PortfolioVarResult<PriceSeries>,
{
    fn fetch_adjusted_close(
        &self,
        tickers: &[String],
        range: DateRange,
    ) -> PortfolioVarResult<PriceSeries> {
        self(tickers, range)
    }
}

/// Serves prices from a table already held in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryPriceSource {
    prices: PriceSeries,
}

impl InMemoryPriceSource {
    pub fn new(prices: PriceSeries) -> Self {
        Self { prices }
    }
}

impl PriceSource for InMemoryPriceSource {
    fn fetch_adjusted_close(
        &self,
        tickers: &[String],
        range: DateRange,
    ) -> PortfolioVarResult<PriceSeries> {
        Ok(tickers
            .iter()
            .filter_map(|t| {
                self.prices.get(t).map(|series| {
                    let points: Vec<PricePoint> =
                        series.iter().filter(|p| range.contains(p.date)).copied().collect();
                    (t.clone(), points)
                })
            })
            .collect())
    }
}

/// Run both VaR estimators for `request` against prices from `source`.
pub fn compute_var(
    request: &VarRequest,
    source: &impl PriceSource,
) -> PortfolioVarResult<ResultSet> {
    let span = info_span!("compute_var", tickers = ?request.tickers, window = request.window);
    let _guard = span.enter();

    request.validate()?;
    let weights = request.resolved_weights()?;

    let prices = source.fetch_adjusted_close(&request.tickers, request.range())?;
    debug!(series = prices.len(), "fetched adjusted close prices");

    let pipeline = ReturnsPipeline::build(
        &prices,
        &request.tickers,
        request.range(),
        request.window,
        &weights,
    )?;

    let periods = pipeline.log_returns.n_periods();
    if periods == 0 {
        return Err(PortfolioVarError::InsufficientData(
            "need at least two aligned prices per ticker to form a return".into(),
        ));
    }
    if request.window > periods {
        return Err(PortfolioVarError::invalid(
            "window",
            format!(
                "Rolling window of {} exceeds the {} aligned return periods available",
                request.window, periods
            ),
        ));
    }

    let historical = historical_var(
        &pipeline.rolling,
        request.confidence_level,
        request.portfolio_value,
    )?;
    let parametric = parametric_var(
        &pipeline.log_returns,
        &weights,
        request.window,
        request.confidence_level,
        request.portfolio_value,
    )?;
    let distribution = pnl_distribution(
        &pipeline.rolling,
        request.portfolio_value,
        request.histogram_bins,
    )?;

    let mut warnings = Vec::new();
    if request.confidence_level >= 0.5 {
        for estimate in [&historical, &parametric] {
            if estimate.loss < Decimal::ZERO {
                warn!(method = %estimate.method, loss = %estimate.loss, "negative VaR");
                warnings.push(format!(
                    "{} VaR is negative: the loss-tail quantile is a gain over this sample",
                    estimate.method
                ));
            }
        }
    }

    debug!(historical = %historical.loss, parametric = %parametric.loss, "computed VaR");

    Ok(ResultSet {
        request: request.clone(),
        historical,
        parametric,
        observations: periods,
        rolling_observations: pipeline.rolling.len(),
        pnl_distribution: distribution,
        warnings,
    })
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PortfolioVarError;
use crate::types::{DateRange, PricePoint, PriceSeries};
use crate::PortfolioVarResult;

/// Price columns sharing one trading calendar, in requested ticker order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPrices {
    pub tickers: Vec<String>,
    pub dates: Vec<NaiveDate>,
    /// One column per ticker, each `dates.len()` long.
    pub columns: Vec<Vec<f64>>,
}

impl AlignedPrices {
    pub fn n_dates(&self) -> usize {
        self.dates.len()
    }
}

/// Validate and align the requested tickers onto a common calendar.
///
/// Observations outside `range` are dropped before the remaining prices and
/// dates are checked. Every ticker must then carry
/// exactly the same dates as the first one; any mismatch is reported as an
/// upstream data error rather than silently realigned by position.
pub fn align(
    prices: &PriceSeries,
    tickers: &[String],
    range: DateRange,
) -> PortfolioVarResult<AlignedPrices> {
    if tickers.is_empty() {
        return Err(PortfolioVarError::invalid(
            "tickers",
            "At least one ticker required",
        ));
    }

    let mut dates: Option<Vec<NaiveDate>> = None;
    let mut columns = Vec::with_capacity(tickers.len());

    for ticker in tickers {
        let series = prices
            .get(ticker)
            .ok_or_else(|| PortfolioVarError::upstream(ticker, "no series returned"))?;
        if series.is_empty() {
            return Err(PortfolioVarError::upstream(ticker, "series is empty"));
        }
        let in_range: Vec<&PricePoint> = series.iter().filter(|p| range.contains(p.date)).collect();
        if in_range.len() < series.len() {
            debug!(
                ticker = %ticker,
                dropped = series.len() - in_range.len(),
                "clipped observations outside requested range"
            );
        }
        if in_range.is_empty() {
            return Err(PortfolioVarError::upstream(
                ticker,
                format!(
                    "no observations between {} and {}",
                    range.start, range.end
                ),
            ));
        }
        validate_series(ticker, &in_range)?;

        let series_dates: Vec<NaiveDate> = in_range.iter().map(|p| p.date).collect();
        match &dates {
            None => dates = Some(series_dates),
            Some(reference) => check_calendar(ticker, reference, &series_dates)?,
        }
        columns.push(in_range.iter().map(|p| p.price).collect());
    }

    Ok(AlignedPrices {
        tickers: tickers.to_vec(),
        dates: dates.unwrap_or_default(),
        columns,
    })
}

fn validate_series(ticker: &str, series: &[&PricePoint]) -> PortfolioVarResult<()> {
    for point in series {
        if !point.price.is_finite() || point.price <= 0.0 {
            return Err(PortfolioVarError::upstream(
                ticker,
                format!("invalid price {} on {}", point.price, point.date),
            ));
        }
    }
    for pair in series.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(PortfolioVarError::upstream(
                ticker,
                format!(
                    "dates not strictly increasing at {} -> {}",
                    pair[0].date, pair[1].date
                ),
            ));
        }
    }
    Ok(())
}

fn check_calendar(
    ticker: &str,
    reference: &[NaiveDate],
    dates: &[NaiveDate],
) -> PortfolioVarResult<()> {
    if let Some((expected, got)) = reference
        .iter()
        .zip(dates)
        .find(|(expected, got)| expected != got)
    {
        return Err(PortfolioVarError::upstream(
            ticker,
            format!("calendar mismatch: expected {}, found {}", expected, got),
        ));
    }
    if reference.len() != dates.len() {
        return Err(PortfolioVarError::upstream(
            ticker,
            format!(
                "calendar mismatch: expected {} observations, found {}",
                reference.len(),
                dates.len()
            ),
        ));
    }
    Ok(())
}

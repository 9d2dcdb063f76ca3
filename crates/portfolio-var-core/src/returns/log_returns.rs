use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::alignment::AlignedPrices;
use crate::error::PortfolioVarError;
use crate::PortfolioVarResult;

/// Per-period log returns, one row per aligned date, one entry per ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogReturnMatrix {
    tickers: Vec<String>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<f64>>,
}

impl LogReturnMatrix {
    /// Build from pre-computed rows (each `tickers.len()` long).
    ///
    /// `dates` may be empty when the caller has no calendar; otherwise it
    /// must match the row count.
    pub fn from_rows(
        tickers: Vec<String>,
        dates: Vec<NaiveDate>,
        rows: Vec<Vec<f64>>,
    ) -> PortfolioVarResult<Self> {
        if tickers.is_empty() {
            return Err(PortfolioVarError::invalid("tickers", "At least one ticker required"));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != tickers.len()) {
            return Err(PortfolioVarError::invalid(
                "rows",
                format!(
                    "Row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    tickers.len()
                ),
            ));
        }
        if !dates.is_empty() && dates.len() != rows.len() {
            return Err(PortfolioVarError::invalid(
                "dates",
                format!("Expected {} dates, got {}", rows.len(), dates.len()),
            ));
        }
        Ok(Self { tickers, dates, rows })
    }

    /// `ln(p_t / p_{t-1})` per ticker; the first date has no prior price and
    /// is dropped, as is any date where a return is not finite.
    pub fn from_prices(prices: &AlignedPrices) -> Self {
        let mut dates = Vec::new();
        let mut rows = Vec::new();

        for t in 1..prices.n_dates() {
            let row: Vec<f64> = prices
                .columns
                .iter()
                .map(|col| (col[t] / col[t - 1]).ln())
                .collect();
            if row.iter().all(|r| r.is_finite()) {
                dates.push(prices.dates[t]);
                rows.push(row);
            }
        }

        Self {
            tickers: prices.tickers.clone(),
            dates,
            rows,
        }
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn n_assets(&self) -> usize {
        self.tickers.len()
    }

    pub fn n_periods(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, asset: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[asset]).collect()
    }
}

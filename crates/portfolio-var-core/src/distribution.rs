//! Binned P&L distribution of the rolling returns, for charting.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::PortfolioVarError;
use crate::returns::RollingReturnSeries;
use crate::types::Money;
use crate::PortfolioVarResult;

pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

/// A single histogram bin, bounds in currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u32,
    /// Share of observations falling in this bin
    pub frequency: f64,
}

/// Window P&L (rolling return × portfolio value) summarised as a histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlDistribution {
    pub observations: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub bins: Vec<HistogramBin>,
}

pub fn pnl_distribution(
    rolling: &RollingReturnSeries,
    portfolio_value: Money,
    num_bins: usize,
) -> PortfolioVarResult<PnlDistribution> {
    if rolling.is_empty() {
        return Err(PortfolioVarError::InsufficientData(
            "no rolling returns to bin".into(),
        ));
    }
    if num_bins == 0 {
        return Err(PortfolioVarError::invalid("bins", "At least one bin required"));
    }
    let value = portfolio_value.to_f64().ok_or_else(|| {
        PortfolioVarError::invalid("portfolio_value", "Not representable as f64")
    })?;

    let pnl: Vec<f64> = rolling.values().iter().map(|r| r * value).collect();
    let min = pnl.iter().copied().fold(f64::INFINITY, f64::min);
    let max = pnl.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let n = pnl.len() as f64;
    let mean = pnl.iter().sum::<f64>() / n;

    Ok(PnlDistribution {
        observations: pnl.len(),
        min,
        max,
        mean,
        bins: bin(&pnl, min, max, num_bins),
    })
}

fn bin(values: &[f64], min: f64, max: f64, num_bins: usize) -> Vec<HistogramBin> {
    let n = values.len() as f64;
    if max - min <= f64::EPSILON * max.abs().max(1.0) {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len() as u32,
            frequency: 1.0,
        }];
    }

    let width = (max - min) / num_bins as f64;
    let mut counts = vec![0u32; num_bins];
    for v in values {
        let idx = (((v - min) / width).floor() as usize).min(num_bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + i as f64 * width,
            upper: if i == num_bins - 1 {
                max
            } else {
                min + (i + 1) as f64 * width
            },
            count,
            frequency: count as f64 / n,
        })
        .collect()
}

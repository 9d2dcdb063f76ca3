//! Historical (empirical quantile) VaR.

use super::{validate_confidence, validate_portfolio_value, VarEstimate, VarMethod};
use crate::error::PortfolioVarError;
use crate::returns::RollingReturnSeries;
use crate::types::Money;
use crate::PortfolioVarResult;

/// Linearly interpolated quantile of an ascending-sorted sample.
///
/// The quantile `q` in `[0, 1]` sits at fractional rank `q * (n - 1)`; the
/// result interpolates between the two closest ranks. This is the "linear"
/// method used by NumPy's `percentile` by default.
pub fn percentile_linear(sorted: &[f64], q: f64) -> PortfolioVarResult<f64> {
    if sorted.is_empty() {
        return Err(PortfolioVarError::InsufficientData(
            "percentile of an empty sample is undefined".into(),
        ));
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(PortfolioVarError::invalid(
            "quantile",
            format!("Quantile must be within [0, 1], got {}", q),
        ));
    }

    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Historical VaR of the rolling return distribution.
///
/// Takes the `(1 - confidence)` lower quantile of the rolling returns,
/// negates it and scales by `portfolio_value`.
pub fn historical_var(
    rolling: &RollingReturnSeries,
    confidence_level: f64,
    portfolio_value: Money,
) -> PortfolioVarResult<VarEstimate> {
    validate_confidence(confidence_level)?;
    validate_portfolio_value(portfolio_value)?;
    if rolling.is_empty() {
        return Err(PortfolioVarError::InsufficientData(
            "rolling return series is empty; widen the date range or shorten the window".into(),
        ));
    }

    let mut sorted = rolling.values().to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let tail_return = percentile_linear(&sorted, 1.0 - confidence_level)?;

    VarEstimate::new(
        VarMethod::Historical,
        confidence_level,
        rolling.window(),
        portfolio_value,
        -tail_return,
    )
}

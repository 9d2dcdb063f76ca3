//! Parametric (variance-covariance) VaR.

use statrs::distribution::{ContinuousCDF, Normal};

use super::covariance::CovarianceMatrix;
use super::{validate_confidence, validate_portfolio_value, VarEstimate, VarMethod};
use crate::error::PortfolioVarError;
use crate::returns::LogReturnMatrix;
use crate::types::{Money, TRADING_PERIODS_PER_YEAR};
use crate::weights::Weights;
use crate::PortfolioVarResult;

/// Annualised portfolio volatility `sqrt(wᵀ Σ w)`.
///
/// A slightly negative quadratic form from rounding is treated as zero.
pub fn portfolio_volatility(
    log_returns: &LogReturnMatrix,
    weights: &Weights,
) -> PortfolioVarResult<f64> {
    check_dimensions(log_returns, weights)?;
    let cov = CovarianceMatrix::annualized(log_returns)?;
    let variance = cov.quadratic_form(weights.as_slice());
    Ok(variance.max(0.0).sqrt())
}

/// Parametric VaR: `σ_annual × z(c) × sqrt(window / 252) × value`.
pub fn parametric_var(
    log_returns: &LogReturnMatrix,
    weights: &Weights,
    window: usize,
    confidence_level: f64,
    portfolio_value: Money,
) -> PortfolioVarResult<VarEstimate> {
    validate_confidence(confidence_level)?;
    validate_portfolio_value(portfolio_value)?;
    if window == 0 {
        return Err(PortfolioVarError::invalid(
            "window",
            "Rolling window must be at least 1 period",
        ));
    }

    let sigma = portfolio_volatility(log_returns, weights)?;
    let z = standard_normal_quantile(confidence_level)?;
    let horizon = (window as f64 / TRADING_PERIODS_PER_YEAR as f64).sqrt();

    VarEstimate::new(
        VarMethod::Parametric,
        confidence_level,
        window,
        portfolio_value,
        sigma * z * horizon,
    )
}

fn check_dimensions(log_returns: &LogReturnMatrix, weights: &Weights) -> PortfolioVarResult<()> {
    if log_returns.n_assets() < weights.len() {
        return Err(PortfolioVarError::InsufficientData(format!(
            "{} weights supplied but returns cover only {} assets",
            weights.len(),
            log_returns.n_assets()
        )));
    }
    if log_returns.n_assets() > weights.len() {
        return Err(PortfolioVarError::invalid(
            "weights",
            format!(
                "Expected {} weights, got {}",
                log_returns.n_assets(),
                weights.len()
            ),
        ));
    }
    Ok(())
}

fn standard_normal_quantile(p: f64) -> PortfolioVarResult<f64> {
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| PortfolioVarError::invalid("distribution", e.to_string()))?;
    Ok(normal.inverse_cdf(p))
}

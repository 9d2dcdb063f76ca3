//! Value at Risk (VaR) estimators.
//!
//! Both estimators report VaR as a positive loss amount in currency units
//! over the rolling holding window.

pub mod covariance;
pub mod historical;
pub mod parametric;

pub use covariance::CovarianceMatrix;
pub use historical::{historical_var, percentile_linear};
pub use parametric::{parametric_var, portfolio_volatility};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PortfolioVarError;
use crate::types::Money;
use crate::PortfolioVarResult;

/// VaR calculation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarMethod {
    /// Empirical quantile of the rolling return distribution
    Historical,
    /// Variance-covariance under a normal assumption
    Parametric,
}

impl std::fmt::Display for VarMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarMethod::Historical => write!(f, "Historical"),
            VarMethod::Parametric => write!(f, "Parametric"),
        }
    }
}

/// A single VaR figure and the parameters that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarEstimate {
    pub method: VarMethod,
    /// Confidence level (e.g. 0.95 for 95%)
    pub confidence_level: f64,
    /// Holding window in trading periods
    pub window: usize,
    pub portfolio_value: Money,
    /// Loss as a fraction of portfolio value
    pub loss_ratio: f64,
    /// Estimated loss in currency units
    pub loss: Money,
}

impl VarEstimate {
    pub(crate) fn new(
        method: VarMethod,
        confidence_level: f64,
        window: usize,
        portfolio_value: Money,
        loss_ratio: f64,
    ) -> PortfolioVarResult<Self> {
        let unrepresentable = || {
            PortfolioVarError::InsufficientData(format!(
                "{} VaR produced a non-representable loss ratio ({})",
                method, loss_ratio
            ))
        };
        if !loss_ratio.is_finite() {
            return Err(unrepresentable());
        }
        // Below Decimal's 28-digit scale the ratio is indistinguishable from zero.
        let ratio = match Decimal::try_from(loss_ratio) {
            Ok(r) => r,
            Err(_) if loss_ratio.abs() < 1e-28 => Decimal::ZERO,
            Err(_) => return Err(unrepresentable()),
        };
        let loss = ratio.checked_mul(portfolio_value).ok_or_else(|| {
            PortfolioVarError::invalid(
                "portfolio_value",
                format!(
                    "{} VaR loss overflows for portfolio value {} at loss ratio {}",
                    method, portfolio_value, loss_ratio
                ),
            )
        })?;
        Ok(Self {
            method,
            confidence_level,
            window,
            portfolio_value,
            loss_ratio,
            loss,
        })
    }
}

impl std::fmt::Display for VarEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} VaR({:.0}%, {}d): {}",
            self.method,
            self.confidence_level * 100.0,
            self.window,
            format_currency(self.loss)
        )
    }
}

pub(crate) fn validate_confidence(confidence_level: f64) -> PortfolioVarResult<()> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(PortfolioVarError::InvalidConfidence {
            value: confidence_level,
        });
    }
    Ok(())
}

pub(crate) fn validate_portfolio_value(portfolio_value: Money) -> PortfolioVarResult<()> {
    if portfolio_value <= Decimal::ZERO {
        return Err(PortfolioVarError::invalid(
            "portfolio_value",
            "Portfolio value must be positive",
        ));
    }
    Ok(())
}

/// `$1,234.56` style rendering, negatives as `-$12.00`.
pub fn format_currency(amount: Money) -> String {
    let rounded = amount.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{}", sign, grouped, frac_part)
}

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use portfolio_var_core::var::format_currency;

use super::{format_cell, result_of};

/// Print just the VaR figures.
///
/// A single result prints one line per method; a batch prints one line per
/// recorded result.
pub fn print_minimal(value: &Value) {
    for line in minimal_lines(result_of(value)) {
        println!("{}", line);
    }
}

fn minimal_lines(result: &Value) -> Vec<String> {
    if let Some(history) = result.get("history").and_then(Value::as_array) {
        return history
            .iter()
            .map(|s| {
                format!(
                    "{} | {} | {}",
                    format_cell(&s["tickers"]),
                    format_cell(&s["historical"]),
                    format_cell(&s["parametric"]),
                )
            })
            .collect();
    }

    let estimates: Vec<String> = ["historical", "parametric"]
        .iter()
        .filter_map(|key| result.get(*key))
        .filter_map(|est| Some(format!("{}: {}", est.get("method")?.as_str()?, loss_of(est)?)))
        .collect();
    if !estimates.is_empty() {
        return estimates;
    }

    vec![format_cell(result)]
}

fn loss_of(estimate: &Value) -> Option<String> {
    let loss = match estimate.get("loss")? {
        Value::String(s) => Decimal::from_str(s).ok()?,
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok()?,
        _ => return None,
    };
    Some(format_currency(loss))
}

use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;
use std::time::Instant;

use portfolio_var_core::{InMemoryPriceSource, PriceSeries, VarRequest};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(Deserialize)]
struct ComputeVarInput {
    request: VarRequest,
    prices: PriceSeries,
}

/// Run both VaR estimators for `{request, prices}` and return the result envelope as JSON.
#[napi]
pub fn compute_var(input_json: String) -> NapiResult<String> {
    let started = Instant::now();
    let input: ComputeVarInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let source = InMemoryPriceSource::new(input.prices);
    let result = portfolio_var_core::compute_var(&input.request, &source)
        .map_err(|e| to_napi_error(format!("{:?}: {}", e.kind(), e)))?;

    let warnings = result.warnings.clone();
    let output = portfolio_var_core::with_metadata(
        "Historical simulation and parametric variance-covariance VaR",
        &serde_json::json!({ "trading_periods_per_year": 252 }),
        warnings,
        started.elapsed().as_micros() as u64,
        result,
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{info, warn};

use portfolio_var_core::engine::{DEFAULT_CONFIDENCE, DEFAULT_PORTFOLIO_VALUE, DEFAULT_WINDOW};
use portfolio_var_core::{
    compute_var, with_metadata, InMemoryPriceSource, PriceSource, ResultHistory, VarRequest,
};

use crate::input;

const METHODOLOGY: &str = "Historical simulation on rolling window-period log returns \
     (linear-interpolated percentile) and parametric variance-covariance VaR \
     (annualised sample covariance, z-score scaled by sqrt(window/252))";

/// Arguments for a single VaR calculation
#[derive(Args)]
pub struct VarArgs {
    /// Price table: wide CSV (date,T1,T2,...) or JSON {ticker: [{date, price}]}
    #[arg(long)]
    pub prices: String,

    /// Path to a JSON or YAML request file; its fields override the flags
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated tickers
    #[arg(long, value_delimiter = ',', default_value = "AAPL,MSFT,GOOG")]
    pub tickers: Vec<String>,

    /// First date of the price window (YYYY-MM-DD)
    #[arg(long, default_value = "2020-01-01")]
    pub start: NaiveDate,

    /// Exclusive end of the price window (YYYY-MM-DD), today when omitted
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Holding window in trading days
    #[arg(long, default_value_t = DEFAULT_WINDOW)]
    pub window: usize,

    /// Confidence level, 0.90 to 0.99
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    pub confidence: f64,

    /// Portfolio value in dollars
    #[arg(long, default_value_t = DEFAULT_PORTFOLIO_VALUE)]
    pub portfolio_value: Decimal,

    /// Comma-separated weights in ticker order (equal weights when omitted)
    #[arg(long, value_delimiter = ',')]
    pub weights: Option<Vec<f64>>,

    /// Bins in the P&L histogram
    #[arg(long, default_value_t = 50)]
    pub bins: usize,
}

/// Arguments for running several requests against one price table
#[derive(Args)]
pub struct BatchArgs {
    /// Price table: wide CSV (date,T1,T2,...) or JSON {ticker: [{date, price}]}
    #[arg(long)]
    pub prices: String,

    /// JSON or YAML file holding a list of requests
    #[arg(long)]
    pub input: Option<String>,

    /// Keep only the most recent N results
    #[arg(long)]
    pub history_limit: Option<usize>,
}

impl VarArgs {
    fn base_request(&self) -> VarRequest {
        VarRequest {
            tickers: self.tickers.clone(),
            start: self.start,
            end: self.end.unwrap_or_else(today),
            window: self.window,
            confidence_level: self.confidence,
            portfolio_value: self.portfolio_value,
            weights: self.weights.clone(),
            histogram_bins: self.bins,
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Request fields read from a file or stdin; absent fields keep the base value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestOverlay {
    pub tickers: Option<Vec<String>>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub window: Option<usize>,
    pub confidence_level: Option<f64>,
    pub portfolio_value: Option<Decimal>,
    pub weights: Option<Vec<f64>>,
    pub histogram_bins: Option<usize>,
}

impl RequestOverlay {
    pub fn apply(self, base: VarRequest) -> VarRequest {
        VarRequest {
            tickers: self.tickers.unwrap_or(base.tickers),
            start: self.start.unwrap_or(base.start),
            end: self.end.unwrap_or(base.end),
            window: self.window.unwrap_or(base.window),
            confidence_level: self.confidence_level.unwrap_or(base.confidence_level),
            portfolio_value: self.portfolio_value.unwrap_or(base.portfolio_value),
            weights: self.weights.or(base.weights),
            histogram_bins: self.histogram_bins.unwrap_or(base.histogram_bins),
        }
    }
}

pub fn run_var(args: VarArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let started = Instant::now();
    let source = InMemoryPriceSource::new(input::prices::load_prices(&args.prices)?);

    let base = args.base_request();
    let request = if let Some(ref path) = args.input {
        input::file::read_structured::<RequestOverlay>(path)?.apply(base)
    } else if let Some(overlay) = input::stdin::read_request::<RequestOverlay>()? {
        overlay.apply(base)
    } else {
        base
    };

    info!(
        tickers = ?request.tickers,
        window = request.window,
        confidence = request.confidence_level,
        "computing VaR"
    );
    let result = compute_var(&request, &source)?;

    let assumptions = json!({
        "trading_periods_per_year": 252,
        "weights": if request.weights.is_some() { "explicit" } else { "equal" },
        "price_window": format!("[{}, {})", request.start, request.end),
    });
    let warnings = result.warnings.clone();
    let output = with_metadata(
        METHODOLOGY,
        &assumptions,
        warnings,
        started.elapsed().as_micros() as u64,
        result,
    );
    Ok(serde_json::to_value(output)?)
}

/// Failures and warnings gathered while running a batch.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub failures: Vec<Value>,
    pub warnings: Vec<String>,
}

/// Run each overlay on top of `base` in order, recording successes into `history`.
///
/// A failing request is logged and listed in the outcome; later requests still run.
pub fn run_requests(
    overlays: Vec<RequestOverlay>,
    base: &VarRequest,
    source: &impl PriceSource,
    history: &mut ResultHistory,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for (index, overlay) in overlays.into_iter().enumerate() {
        let request = overlay.apply(base.clone());
        match compute_var(&request, source) {
            Ok(result) => {
                outcome.warnings.extend(
                    result
                        .warnings
                        .iter()
                        .map(|w| format!("request {}: {}", index, w)),
                );
                if history.record(result).is_some() {
                    info!(index, "history limit reached, dropped oldest result");
                }
            }
            Err(e) => {
                warn!(index, error = %e, "request failed");
                outcome.failures.push(json!({
                    "index": index,
                    "kind": e.kind(),
                    "message": e.to_string(),
                }));
            }
        }
    }
    outcome
}

pub fn run_batch(args: BatchArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let started = Instant::now();
    let source = InMemoryPriceSource::new(input::prices::load_prices(&args.prices)?);

    let overlays: Vec<RequestOverlay> = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(overlays) = input::stdin::read_request::<Vec<RequestOverlay>>()? {
        overlays
    } else {
        return Err("--input <requests.json|yaml> or stdin required for batch".into());
    };

    let mut history = match args.history_limit {
        Some(limit) => ResultHistory::with_capacity_limit(limit),
        None => ResultHistory::unbounded(),
    };
    let base = VarRequest::with_defaults(today());
    let BatchOutcome { failures, warnings } =
        run_requests(overlays, &base, &source, &mut history);

    let result = json!({
        "history": history.summaries(),
        "failures": failures,
    });
    let assumptions = json!({
        "history_limit": history.capacity(),
        "recorded": history.len(),
    });
    let output = with_metadata(
        METHODOLOGY,
        &assumptions,
        warnings,
        started.elapsed().as_micros() as u64,
        result,
    );
    Ok(serde_json::to_value(output)?)
}

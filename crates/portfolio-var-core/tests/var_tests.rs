use chrono::{Duration, NaiveDate};
use portfolio_var_core::returns::{LogReturnMatrix, ReturnsPipeline};
use portfolio_var_core::var::{historical_var, parametric_var};
use portfolio_var_core::*;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn day0() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 3).unwrap()
}

/// Deterministic pseudo-random walk, roughly 1–2% daily moves.
fn walk(seed: u64, n: usize, start_price: f64) -> Vec<f64> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut price = start_price;
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(price);
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let u = (state >> 11) as f64 / (1u64 << 53) as f64;
        price *= 1.0 + (u - 0.5) * 0.04;
    }
    out
}

fn price_table(tickers: &[&str], n: usize) -> PriceSeries {
    tickers
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let points = walk(i as u64 + 7, n, 100.0 + 20.0 * i as f64)
                .into_iter()
                .enumerate()
                .map(|(d, p)| PricePoint::new(day0() + Duration::days(d as i64), p))
                .collect();
            (t.to_string(), points)
        })
        .collect()
}

fn request(tickers: &[&str], window: usize, confidence: f64, value: Decimal) -> VarRequest {
    VarRequest {
        tickers: tickers.iter().map(|t| t.to_string()).collect(),
        start: day0(),
        end: day0() + Duration::days(1000),
        window,
        confidence_level: confidence,
        portfolio_value: value,
        weights: None,
        histogram_bins: 50,
    }
}

// ---------------------------------------------------------------------------
// Worked example: three periods, two assets
// ---------------------------------------------------------------------------

fn example_matrix() -> LogReturnMatrix {
    LogReturnMatrix::from_rows(
        vec!["A".into(), "B".into()],
        vec![],
        vec![vec![0.01, -0.02], vec![-0.03, 0.01], vec![0.02, 0.00]],
    )
    .unwrap()
}

#[test]
fn test_example_rolling_series() {
    let out = ReturnsPipeline::from_matrix(example_matrix(), 1, &Weights::equal(2).unwrap())
        .unwrap();
    let expected = [-0.005, -0.01, 0.01];
    assert_eq!(out.rolling.len(), 3);
    for (got, want) in out.rolling.values().iter().zip(expected) {
        assert!((got - want).abs() < 1e-15, "{} vs {}", got, want);
    }
}

#[test]
fn test_example_historical_var_linear_interpolation() {
    let out = ReturnsPipeline::from_matrix(example_matrix(), 1, &Weights::equal(2).unwrap())
        .unwrap();
    // sorted [-0.01, -0.005, 0.01], 10th percentile at rank 0.2 => -0.009
    let var = historical_var(&out.rolling, 0.90, dec!(100000)).unwrap();
    assert!((var.loss_ratio - 0.009).abs() < 1e-12);
    assert_eq!(var.loss.round_dp(6), dec!(900));
}

#[test]
fn test_example_parametric_var() {
    let w = Weights::equal(2).unwrap();
    let var = parametric_var(&example_matrix(), &w, 1, 0.95, dec!(100000)).unwrap();
    // Portfolio daily sample variance of [-0.005, -0.01, 0.01]
    let r = [-0.005f64, -0.01, 0.01];
    let mean = r.iter().sum::<f64>() / 3.0;
    let daily_var = r.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 2.0;
    let expected = daily_var.sqrt() * 1.6448536269514722;
    assert!((var.loss_ratio - expected).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// End-to-end compute_var
// ---------------------------------------------------------------------------

#[test]
fn test_compute_var_end_to_end() {
    let source = InMemoryPriceSource::new(price_table(&["AAA", "BBB", "CCC"], 300));
    let req = request(&["AAA", "BBB", "CCC"], 20, 0.95, dec!(100000));
    let result = compute_var(&req, &source).unwrap();

    assert_eq!(result.observations, 299);
    assert_eq!(result.rolling_observations, 280);
    assert_eq!(result.historical.window, 20);
    assert_eq!(result.parametric.method, VarMethod::Parametric);
    assert!(result.historical.loss > Decimal::ZERO);
    assert!(result.parametric.loss > Decimal::ZERO);
    assert_eq!(result.pnl_distribution.observations, 280);
    assert_eq!(result.request, req);
}

#[test]
fn test_compute_var_is_idempotent() {
    let source = InMemoryPriceSource::new(price_table(&["AAA", "BBB"], 120));
    let req = request(&["AAA", "BBB"], 5, 0.99, dec!(250000));
    let first = compute_var(&req, &source).unwrap();
    let second = compute_var(&req, &source).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.historical.loss_ratio.to_bits(),
        second.historical.loss_ratio.to_bits()
    );
}

#[test]
fn test_window_equal_to_periods_gives_one_value() {
    let source = InMemoryPriceSource::new(price_table(&["AAA"], 21));
    let result = compute_var(&request(&["AAA"], 20, 0.95, dec!(1000)), &source).unwrap();
    assert_eq!(result.observations, 20);
    assert_eq!(result.rolling_observations, 1);
}

#[test]
fn test_window_beyond_periods_is_invalid_input() {
    let source = InMemoryPriceSource::new(price_table(&["AAA"], 10));
    let err = compute_var(&request(&["AAA"], 20, 0.95, dec!(1000)), &source).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_single_price_is_insufficient_data() {
    let source = InMemoryPriceSource::new(price_table(&["AAA"], 1));
    let req = request(&["AAA"], 1, 0.95, dec!(1000));
    let err = compute_var(&req, &source).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);

    // Both estimators refuse the degenerate pipeline output directly too.
    let prices = source.fetch_adjusted_close(&req.tickers, req.range()).unwrap();
    let out = ReturnsPipeline::build(
        &prices,
        &req.tickers,
        req.range(),
        1,
        &Weights::equal(1).unwrap(),
    )
    .unwrap();
    assert_eq!(out.log_returns.n_periods(), 0);
    assert!(out.rolling.is_empty());
    let h = historical_var(&out.rolling, 0.95, dec!(1000)).unwrap_err();
    let p = parametric_var(&out.log_returns, &Weights::equal(1).unwrap(), 1, 0.95, dec!(1000))
        .unwrap_err();
    assert_eq!(h.kind(), ErrorKind::InsufficientData);
    assert_eq!(p.kind(), ErrorKind::InsufficientData);
}

#[test]
fn test_crash_with_huge_portfolio_value_is_invalid_input() {
    // A 90% one-day drop gives a loss ratio above 1.
    let points = [100.0, 10.0, 12.0, 11.0, 1.0, 1.1]
        .iter()
        .enumerate()
        .map(|(d, p)| PricePoint::new(day0() + Duration::days(d as i64), *p))
        .collect();
    let mut prices = PriceSeries::new();
    prices.insert("AAA".to_string(), points);
    let source = InMemoryPriceSource::new(prices);

    let req = request(&["AAA"], 1, 0.95, Decimal::MAX / dec!(2));
    let err = compute_var(&req, &source).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(err.to_string().contains("portfolio_value"));
}

#[test]
fn test_missing_ticker_is_upstream_error() {
    let source = InMemoryPriceSource::new(price_table(&["AAA"], 50));
    let err = compute_var(&request(&["AAA", "ZZZ"], 5, 0.95, dec!(1000)), &source).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamDataError);
    assert!(err.to_string().contains("ZZZ"));
}

#[test]
fn test_calendar_gap_is_upstream_error() {
    let mut prices = price_table(&["AAA", "BBB"], 50);
    if let Some(series) = prices.get_mut("BBB") {
        series.remove(10);
    }
    let source = InMemoryPriceSource::new(prices);
    let err = compute_var(&request(&["AAA", "BBB"], 5, 0.95, dec!(1000)), &source).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamDataError);
}

#[test]
fn test_explicit_weights_change_result() {
    let source = InMemoryPriceSource::new(price_table(&["AAA", "BBB"], 200));
    let equal = compute_var(&request(&["AAA", "BBB"], 10, 0.95, dec!(1000)), &source).unwrap();
    let mut tilted_req = request(&["AAA", "BBB"], 10, 0.95, dec!(1000));
    tilted_req.weights = Some(vec![1.0, 0.0]);
    let tilted = compute_var(&tilted_req, &source).unwrap();
    assert_ne!(equal.parametric.loss, tilted.parametric.loss);

    let mut single_req = request(&["AAA"], 10, 0.95, dec!(1000));
    single_req.weights = None;
    let single = compute_var(&single_req, &source).unwrap();
    assert!((single.parametric.loss_ratio - tilted.parametric.loss_ratio).abs() < 1e-12);
}

#[test]
fn test_history_records_results() {
    let source = InMemoryPriceSource::new(price_table(&["AAA", "BBB"], 120));
    let mut history = ResultHistory::unbounded();
    for window in [1, 5, 10] {
        let result = compute_var(&request(&["AAA", "BBB"], window, 0.95, dec!(1000)), &source)
            .unwrap();
        history.record(result);
    }
    let windows: Vec<usize> = history.list().iter().map(|r| r.request.window).collect();
    assert_eq!(windows, vec![1, 5, 10]);
}

#[test]
fn test_result_set_round_trips_through_json() {
    let source = InMemoryPriceSource::new(price_table(&["AAA", "BBB"], 60));
    let result = compute_var(&request(&["AAA", "BBB"], 3, 0.95, dec!(1000)), &source).unwrap();
    let json = serde_json::to_string(&result).unwrap();
    let back: ResultSet = serde_json::from_str(&json).unwrap();
    assert_eq!(back.historical.loss, result.historical.loss);
    assert_eq!(back.parametric.loss, result.parametric.loss);
    assert_eq!(back.request.tickers, result.request.tickers);
    assert_eq!(back.rolling_observations, result.rolling_observations);
}

//! Property-based tests for the VaR invariants:
//! - matrix and rolling series lengths follow from the price count and window
//! - parametric VaR is linear in portfolio value
//! - raising the confidence level never lowers either estimate
//! - both estimates are non-negative on ordinary return samples

use chrono::{Duration, NaiveDate};
use portfolio_var_core::returns::{LogReturnMatrix, ReturnsPipeline};
use portfolio_var_core::var::{historical_var, parametric_var};
use portfolio_var_core::*;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn prices_from_moves(moves: &[Vec<f64>]) -> (PriceSeries, Vec<String>, DateRange) {
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    let n_assets = moves[0].len();
    let tickers: Vec<String> = (0..n_assets).map(|i| format!("T{}", i)).collect();
    let mut prices = PriceSeries::new();
    for (a, ticker) in tickers.iter().enumerate() {
        let mut p = 100.0;
        let mut points = vec![PricePoint::new(start, p)];
        for (t, row) in moves.iter().enumerate() {
            p *= 1.0 + row[a];
            points.push(PricePoint::new(start + Duration::days(t as i64 + 1), p));
        }
        prices.insert(ticker.clone(), points);
    }
    let range = DateRange::new(start, start + Duration::days(moves.len() as i64 + 1));
    (prices, tickers, range)
}

fn moves_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1usize..5).prop_flat_map(|n_assets| {
        prop::collection::vec(prop::collection::vec(-0.05..0.05f64, n_assets), 3..80)
    })
}

proptest! {
    #[test]
    fn prop_shape_follows_price_count(moves in moves_strategy(), window in 1usize..30) {
        let (prices, tickers, range) = prices_from_moves(&moves);
        let weights = Weights::equal(tickers.len()).unwrap();
        let out = ReturnsPipeline::build(&prices, &tickers, range, window, &weights).unwrap();

        // T = moves.len() + 1 raw prices
        let periods = moves.len();
        prop_assert_eq!(out.log_returns.n_periods(), periods);
        prop_assert!(out.log_returns.rows().iter().all(|r| r.len() == tickers.len()));
        let expected = (periods + 1).saturating_sub(window);
        prop_assert_eq!(out.rolling.len(), expected);
    }

    #[test]
    fn prop_parametric_linear_in_value(moves in moves_strategy(), k in 1u32..1_000_000) {
        let (prices, tickers, range) = prices_from_moves(&moves);
        let weights = Weights::equal(tickers.len()).unwrap();
        let out = ReturnsPipeline::build(&prices, &tickers, range, 1, &weights).unwrap();

        let unit = parametric_var(&out.log_returns, &weights, 1, 0.95, Decimal::ONE).unwrap();
        let scaled =
            parametric_var(&out.log_returns, &weights, 1, 0.95, Decimal::from(k)).unwrap();
        prop_assert_eq!(scaled.loss, unit.loss * Decimal::from(k));
    }

    #[test]
    fn prop_confidence_monotone(
        moves in moves_strategy(),
        window in 1usize..3,
        c_low in 0.5..0.98f64,
        bump in 0.0..0.019f64,
    ) {
        let (prices, tickers, range) = prices_from_moves(&moves);
        let weights = Weights::equal(tickers.len()).unwrap();
        let out = ReturnsPipeline::build(&prices, &tickers, range, window, &weights).unwrap();
        let c_high = c_low + bump;
        let value = Decimal::from(100_000);

        let h_low = historical_var(&out.rolling, c_low, value).unwrap();
        let h_high = historical_var(&out.rolling, c_high, value).unwrap();
        prop_assert!(h_high.loss_ratio >= h_low.loss_ratio - 1e-15);

        let p_low = parametric_var(&out.log_returns, &weights, window, c_low, value).unwrap();
        let p_high = parametric_var(&out.log_returns, &weights, window, c_high, value).unwrap();
        prop_assert!(p_high.loss_ratio >= p_low.loss_ratio - 1e-12);
    }

    #[test]
    fn prop_parametric_non_negative(moves in moves_strategy(), c in 0.5..0.999f64) {
        let (prices, tickers, range) = prices_from_moves(&moves);
        let weights = Weights::equal(tickers.len()).unwrap();
        let m = LogReturnMatrix::from_prices(
            &portfolio_var_core::returns::align(&prices, &tickers, range).unwrap(),
        );
        let var = parametric_var(&m, &weights, 5, c, Decimal::from(1000)).unwrap();
        prop_assert!(var.loss >= Decimal::ZERO);
    }

    #[test]
    fn prop_historical_non_negative_for_centred_samples(
        half in prop::collection::vec(0.0..0.05f64, 5..60),
        c in 0.5..0.99f64,
    ) {
        // Symmetric sample around zero: the loss-side quantile is never a gain.
        let values: Vec<f64> = half.iter().flat_map(|v| [*v, -*v]).collect();
        let rolling = returns::RollingReturnSeries::from_returns(&values, &[], 1).unwrap();
        let var = historical_var(&rolling, c, Decimal::from(1000)).unwrap();
        prop_assert!(var.loss >= Decimal::ZERO);
    }
}

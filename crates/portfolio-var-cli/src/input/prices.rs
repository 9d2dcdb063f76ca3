//! Price table loading.
//!
//! Two layouts are accepted:
//! - wide CSV, `date,AAPL,MSFT,...`, one row per trading day; a blank cell
//!   is a missing observation for that ticker
//! - JSON, `{"AAPL": [{"date": "2024-01-02", "price": 185.2}, ...], ...}`

use chrono::NaiveDate;
use std::io;

use portfolio_var_core::{PricePoint, PriceSeries};
use tracing::debug;

use crate::input::file;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Load a price table from `path`, picking the layout by extension.
pub fn load_prices(path: &str) -> Result<PriceSeries, Box<dyn std::error::Error>> {
    let (canonical, contents) = file::read_text(path)?;
    let is_json = canonical.extension().and_then(|e| e.to_str()) == Some("json");

    let prices = if is_json {
        parse_json(&contents)
    } else {
        parse_csv(contents.as_bytes())
    }
    .map_err(|e| format!("Failed to load prices from '{}': {}", canonical.display(), e))?;

    debug!(
        path = %canonical.display(),
        tickers = prices.len(),
        "loaded price table"
    );
    Ok(prices)
}

pub fn parse_json(contents: &str) -> Result<PriceSeries, Box<dyn std::error::Error>> {
    let mut prices: PriceSeries = serde_json::from_str(contents)?;
    for series in prices.values_mut() {
        series.sort_by_key(|p| p.date);
    }
    Ok(prices)
}

pub fn parse_csv<R: io::Read>(reader: R) -> Result<PriceSeries, Box<dyn std::error::Error>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.len() < 2 {
        return Err("price CSV needs a date column and at least one ticker column".into());
    }
    let tickers: Vec<String> = headers.iter().skip(1).map(|h| h.to_string()).collect();

    let mut prices: PriceSeries = tickers.iter().map(|t| (t.clone(), Vec::new())).collect();

    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        // header is line 1
        let row = line + 2;
        let date_cell = record.get(0).unwrap_or_default();
        let date = NaiveDate::parse_from_str(date_cell, DATE_FORMAT)
            .map_err(|e| format!("row {}: bad date '{}': {}", row, date_cell, e))?;

        for (ticker, cell) in tickers.iter().zip(record.iter().skip(1)) {
            if cell.is_empty() {
                continue;
            }
            let price: f64 = cell
                .parse()
                .map_err(|e| format!("row {}: bad price '{}' for {}: {}", row, cell, ticker, e))?;
            if let Some(series) = prices.get_mut(ticker) {
                series.push(PricePoint::new(date, price));
            }
        }
    }

    for series in prices.values_mut() {
        series.sort_by_key(|p| p.date);
    }
    Ok(prices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_wide_csv() {
        let csv = "date,AAPL,MSFT\n2024-01-02,185.5,370.0\n2024-01-03,184.0,371.25\n";
        let prices = parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(prices.len(), 2);
        assert_eq!(
            prices["AAPL"],
            vec![
                PricePoint::new(d(2024, 1, 2), 185.5),
                PricePoint::new(d(2024, 1, 3), 184.0),
            ]
        );
        assert_eq!(prices["MSFT"][1], PricePoint::new(d(2024, 1, 3), 371.25));
    }

    #[test]
    fn test_blank_cell_is_missing_observation() {
        let csv = "date,AAPL,MSFT\n2024-01-02,185.5,\n2024-01-03,184.0,371.25\n";
        let prices = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(prices["AAPL"].len(), 2);
        assert_eq!(prices["MSFT"], vec![PricePoint::new(d(2024, 1, 3), 371.25)]);
    }

    #[test]
    fn test_csv_rows_sorted_by_date() {
        let csv = "date,X\n2024-01-03,2.0\n2024-01-02,1.0\n";
        let prices = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(prices["X"][0].date, d(2024, 1, 2));
    }

    #[test]
    fn test_csv_bad_price_reports_row() {
        let csv = "date,X\n2024-01-02,1.0\n2024-01-03,abc\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 3"));
    }

    #[test]
    fn test_csv_without_tickers_rejected() {
        let csv = "date\n2024-01-02\n";
        assert!(parse_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_json_layout() {
        let json = r#"{"GOOG": [
            {"date": "2024-01-03", "price": 139.1},
            {"date": "2024-01-02", "price": 138.2}
        ]}"#;
        let prices = parse_json(json).unwrap();
        assert_eq!(
            prices["GOOG"],
            vec![
                PricePoint::new(d(2024, 1, 2), 138.2),
                PricePoint::new(d(2024, 1, 3), 139.1),
            ]
        );
    }
}

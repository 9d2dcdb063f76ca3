use serde_json::Value;
use std::io;

use super::{format_cell, result_of};

const ESTIMATE_COLUMNS: [&str; 6] = [
    "method",
    "confidence_level",
    "window",
    "portfolio_value",
    "loss_ratio",
    "loss",
];

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    write_csv(&mut wtr, value);
    let _ = wtr.flush();
}

fn write_csv<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) {
    let result = result_of(value);

    if let Some(history) = result.get("history").and_then(Value::as_array) {
        write_array_csv(wtr, history);
    } else if result.get("historical").is_some() && result.get("parametric").is_some() {
        // One row per estimator
        let _ = wtr.write_record(ESTIMATE_COLUMNS);
        for key in ["historical", "parametric"] {
            let est = &result[key];
            let row: Vec<String> = ESTIMATE_COLUMNS.iter().map(|c| format_cell(&est[*c])).collect();
            let _ = wtr.write_record(&row);
        }
    } else if let Value::Object(map) = result {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in map {
            let _ = wtr.write_record([key.as_str(), &format_cell(val)]);
        }
    } else {
        let _ = wtr.write_record([&format_cell(result)]);
    }
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_cell).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

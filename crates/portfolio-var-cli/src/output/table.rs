use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_cell, result_of};

const ESTIMATE_FIELDS: [&str; 4] = ["confidence_level", "window", "loss_ratio", "loss"];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    let result = result_of(value);

    if let Some(history) = result.get("history").and_then(Value::as_array) {
        print_array_table(history);
        if let Some(failures) = result.get("failures").and_then(Value::as_array) {
            if !failures.is_empty() {
                println!("\nFailures:");
                print_array_table(failures);
            }
        }
    } else if result.get("historical").is_some() && result.get("parametric").is_some() {
        print_request_table(&result["request"]);
        println!();
        print_estimate_table(result);
    } else {
        print_flat_object(result);
    }

    if let Some(envelope) = value.as_object() {
        print_footer(envelope);
    }
}

fn print_request_table(request: &Value) {
    let mut builder = Builder::default();
    builder.push_record(["Input", "Value"]);
    if let Value::Object(map) = request {
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_cell(val)]);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_estimate_table(result: &Value) {
    let mut builder = Builder::default();
    let mut header = vec!["Method".to_string()];
    header.extend(ESTIMATE_FIELDS.iter().map(|f| f.to_string()));
    builder.push_record(header);

    for key in ["historical", "parametric"] {
        let est = &result[key];
        let mut row = vec![format_cell(&est["method"])];
        row.extend(ESTIMATE_FIELDS.iter().map(|f| format_cell(&est[*f])));
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));

    for key in ["observations", "rolling_observations"] {
        if let Some(n) = result.get(key) {
            println!("{}: {}", key, format_cell(n));
        }
    }
}

fn print_footer(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_cell(val)]);
        }
        println!("{}", Table::from(builder));
    } else {
        println!("{}", format_cell(value));
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", format_cell(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_cell).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }

    println!("{}", Table::from(builder));
}

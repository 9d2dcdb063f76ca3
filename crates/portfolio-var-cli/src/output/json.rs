use serde_json::Value;
use tracing::error;

/// Pretty-print the output envelope to stdout.
pub fn print_json(value: &Value) {
    match render(value) {
        Ok(s) => println!("{}", s),
        Err(e) => error!(error = %e, "failed to render JSON output"),
    }
}

fn render(value: &Value) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

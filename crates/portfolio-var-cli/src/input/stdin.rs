use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Parse a request document piped on stdin.
///
/// `Ok(None)` when stdin is a terminal or the pipe carries only whitespace, so
/// the caller can fall back to its flags.
pub fn read_request<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| format!("Failed to read request from stdin: {}", e))?;
    parse_request(&buffer)
}

fn parse_request<T: DeserializeOwned>(text: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let request = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse request JSON from stdin: {}", e))?;
    Ok(Some(request))
}

//! Alert payload parsing.
//!
//! Alerts normally arrive as JSON. Some producers publish a loose
//! `{key: value, key: value}` rendering instead; that form is rewritten
//! into JSON by plain text substitution and parsed again.

use serde_json::Value;
use tracing::{error, info};

use crate::error::{AlertError, Result};

/// Substitutions applied in order to a payload that is not valid JSON.
const REPAIRS: [(&str, &str); 5] = [
    ("{", "{\""),
    ("}", "\"}"),
    (", ", "\", \""),
    (": ", "\": \""),
    ("'", "\""),
];

/// Rewrite a loose dict rendering into (hopefully) valid JSON.
pub fn repair_payload(message: &str) -> String {
    REPAIRS
        .iter()
        .fold(message.to_string(), |text, (from, to)| text.replace(from, to))
}

/// Parse an alert message, falling back to [`repair_payload`].
pub fn parse_alert(message: &str) -> Result<Value> {
    if let Ok(alert) = serde_json::from_str::<Value>(message) {
        return Ok(alert);
    }

    match serde_json::from_str::<Value>(&repair_payload(message)) {
        Ok(alert) => {
            info!("Repaired malformed alert payload");
            Ok(alert)
        }
        Err(e) => {
            error!(payload = %message, error = %e, "Failed to parse alert payload");
            Err(AlertError::malformed(e.to_string()))
        }
    }
}

//! Alert e-mail composition.

use serde_json::Value;

use crate::error::Result;

const UNKNOWN: &str = "Unknown";

/// Subject and plain-text body of an alert notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEmail {
    pub subject: String,
    pub body: String,
}

/// Field of an alert object as display text; strings are shown unquoted.
fn field_text(alert: &Value, key: &str) -> String {
    match alert.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => UNKNOWN.to_string(),
    }
}

impl AlertEmail {
    pub fn compose(alert: &Value) -> Result<Self> {
        let pretty = serde_json::to_string_pretty(alert)?;

        Ok(Self {
            subject: format!("SOAR Alert: {}", field_text(alert, "type")),
            body: format!(
                "Alert received from {}:\n\n{}",
                field_text(alert, "source"),
                pretty
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compose() {
        let email = AlertEmail::compose(&json!({"type": "brute_force", "source": "ids", "count": 3}))
            .unwrap();

        assert_eq!(email.subject, "SOAR Alert: brute_force");
        assert_eq!(
            email.body,
            "Alert received from ids:\n\n{\n  \"type\": \"brute_force\",\n  \"source\": \"ids\",\n  \"count\": 3\n}"
        );
    }

    #[test]
    fn test_defaults_when_fields_missing() {
        let email = AlertEmail::compose(&json!({"severity": "high"})).unwrap();
        assert_eq!(email.subject, "SOAR Alert: Unknown");
        assert!(email.body.starts_with("Alert received from Unknown:\n\n"));
    }

    #[test]
    fn test_non_string_fields() {
        let email = AlertEmail::compose(&json!({"type": 42})).unwrap();
        assert_eq!(email.subject, "SOAR Alert: 42");

        let email = AlertEmail::compose(&json!(["not", "an", "object"])).unwrap();
        assert_eq!(email.subject, "SOAR Alert: Unknown");
    }
}

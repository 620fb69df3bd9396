//! Alert Forwarder
//!
//! Turns each SNS record into an e-mail. Records are handled in order and
//! independently: a payload that cannot be parsed or an e-mail that cannot
//! be sent is logged and the next record is processed.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::email::AlertEmail;
use crate::event::{SnsEvent, SnsRecord};
use crate::mailer::AlertMailer;
use crate::parse::parse_alert;

/// What happened to one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Delivered; carries the server's message id
    Sent(String),
    Malformed,
    Failed(String),
}

/// Tally of one event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForwardReport {
    pub received: usize,
    pub sent: usize,
    pub malformed: usize,
    pub failed: usize,
}

impl ForwardReport {
    pub fn record(&mut self, outcome: &RecordOutcome) {
        self.received += 1;
        match outcome {
            RecordOutcome::Sent(_) => self.sent += 1,
            RecordOutcome::Malformed => self.malformed += 1,
            RecordOutcome::Failed(_) => self.failed += 1,
        }
    }
}

pub struct AlertForwarder {
    mailer: Arc<dyn AlertMailer>,
}

impl AlertForwarder {
    pub fn new(mailer: Arc<dyn AlertMailer>) -> Self {
        Self { mailer }
    }

    pub async fn handle_event(&self, event: &SnsEvent) -> ForwardReport {
        info!(records = event.records.len(), "Received alert event");
        if let Ok(raw) = serde_json::to_string(event) {
            debug!(event = %raw, "Alert event payload");
        }

        let mut report = ForwardReport::default();
        for record in &event.records {
            let outcome = self.handle_record(record).await;
            report.record(&outcome);
        }

        info!(
            received = report.received,
            sent = report.sent,
            malformed = report.malformed,
            failed = report.failed,
            "Alert event processed"
        );
        report
    }

    pub async fn handle_record(&self, record: &SnsRecord) -> RecordOutcome {
        let alert = match parse_alert(record.message()) {
            Ok(alert) => alert,
            Err(_) => return RecordOutcome::Malformed,
        };

        let email = match AlertEmail::compose(&alert) {
            Ok(email) => email,
            Err(e) => {
                warn!(error = %e, "Failed to compose alert e-mail");
                return RecordOutcome::Failed(e.to_string());
            }
        };

        match self.mailer.send(&email).await {
            Ok(message_id) => {
                info!(
                    message_id = %message_id,
                    sns_message_id = record.sns.message_id.as_deref().unwrap_or("-"),
                    subject = %email.subject,
                    "Alert e-mail sent"
                );
                RecordOutcome::Sent(message_id)
            }
            Err(e) => {
                error!(error = %e, subject = %email.subject, "Failed to send alert e-mail");
                RecordOutcome::Failed(e.to_string())
            }
        }
    }
}

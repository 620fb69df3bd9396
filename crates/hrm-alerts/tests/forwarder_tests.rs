//! AlertForwarder Tests
//!
//! Tests for:
//! - One e-mail per parseable record, in order
//! - Malformed payloads skipped without stopping the batch
//! - Send failures counted and the batch continuing

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use hrm_alerts::{
    AlertEmail, AlertError, AlertForwarder, AlertMailer, ForwardReport, RecordOutcome, SnsEvent,
    SnsMessage, SnsRecord,
};

/// Mailer that keeps every e-mail; fails subjects containing `fail_on`.
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<AlertEmail>>,
    fail_on: Option<String>,
}

impl RecordingMailer {
    fn failing_on(subject_part: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_on: Some(subject_part.to_string()),
        }
    }
}

#[async_trait]
impl AlertMailer for RecordingMailer {
    async fn send(&self, email: &AlertEmail) -> hrm_alerts::Result<String> {
        if let Some(part) = &self.fail_on {
            if email.subject.contains(part.as_str()) {
                return Err(AlertError::Queue("simulated send failure".to_string()));
            }
        }
        let mut sent = self.sent.lock().await;
        sent.push(email.clone());
        Ok(format!("msg-{}", sent.len()))
    }
}

fn record(message: &str) -> SnsRecord {
    SnsRecord {
        sns: SnsMessage {
            message: message.to_string(),
            ..Default::default()
        },
    }
}

fn event(messages: &[&str]) -> SnsEvent {
    SnsEvent {
        records: messages.iter().map(|m| record(m)).collect(),
    }
}

#[tokio::test]
async fn test_forwards_each_record() {
    let mailer = Arc::new(RecordingMailer::default());
    let forwarder = AlertForwarder::new(mailer.clone());

    let report = forwarder
        .handle_event(&event(&[
            r#"{"type": "brute_force", "source": "ids"}"#,
            "{type: port_scan, source: firewall}",
        ]))
        .await;

    assert_eq!(
        report,
        ForwardReport { received: 2, sent: 2, malformed: 0, failed: 0 }
    );

    let sent = mailer.sent.lock().await;
    assert_eq!(sent[0].subject, "SOAR Alert: brute_force");
    assert_eq!(sent[1].subject, "SOAR Alert: port_scan");
    assert!(sent[1].body.starts_with("Alert received from firewall:\n\n"));
}

#[tokio::test]
async fn test_malformed_record_is_skipped() {
    let mailer = Arc::new(RecordingMailer::default());
    let forwarder = AlertForwarder::new(mailer.clone());

    let report = forwarder
        .handle_event(&event(&[
            "garbage",
            r#"{"type": "malware"}"#,
            "",
        ]))
        .await;

    assert_eq!(
        report,
        ForwardReport { received: 3, sent: 1, malformed: 2, failed: 0 }
    );
    let sent = mailer.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.starts_with("Alert received from Unknown:"));
}

#[tokio::test]
async fn test_send_failure_does_not_stop_the_batch() {
    let mailer = Arc::new(RecordingMailer::failing_on("first"));
    let forwarder = AlertForwarder::new(mailer.clone());

    let report = forwarder
        .handle_event(&event(&[r#"{"type": "first"}"#, r#"{"type": "second"}"#]))
        .await;

    assert_eq!(
        report,
        ForwardReport { received: 2, sent: 1, malformed: 0, failed: 1 }
    );
    assert_eq!(mailer.sent.lock().await[0].subject, "SOAR Alert: second");
}

#[tokio::test]
async fn test_empty_event() {
    let forwarder = AlertForwarder::new(Arc::new(RecordingMailer::default()));
    let event: SnsEvent = serde_json::from_str("{}").unwrap();

    assert_eq!(forwarder.handle_event(&event).await, ForwardReport::default());
}

#[tokio::test]
async fn test_record_outcome_carries_message_id() {
    let forwarder = AlertForwarder::new(Arc::new(RecordingMailer::default()));

    let outcome = forwarder.handle_record(&record(r#"{"type": "x"}"#)).await;
    assert_eq!(outcome, RecordOutcome::Sent("msg-1".to_string()));

    let outcome = forwarder.handle_record(&record("???")).await;
    assert_eq!(outcome, RecordOutcome::Malformed);
}

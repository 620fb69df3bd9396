//! SQS alert intake
//!
//! Long-polls a queue subscribed to the alert topic. Every message body is
//! an SNS notification envelope carrying one record. Bodies that are not
//! envelopes are deleted on receipt so they are not redelivered.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use aws_sdk_sqs::{types::Message as SqsMessage, Client};
use tracing::{debug, error, warn};

use crate::error::{AlertError, Result};
use crate::event::{SnsNotification, SnsRecord};
use crate::queue::{AlertQueue, ReceivedAlert};

/// Parse a queue message body written by SNS.
pub fn parse_envelope(body: &str) -> Result<SnsRecord> {
    let envelope: SnsNotification = serde_json::from_str(body)?;
    Ok(envelope.into())
}

pub struct SqsAlertSource {
    client: Client,
    queue_url: String,
    queue_name: String,
    wait_time_seconds: i32,
    visibility_timeout_seconds: i32,
    max_messages: i32,
    total_polled: AtomicU64,
    total_deleted: AtomicU64,
}

impl SqsAlertSource {
    pub const DEFAULT_WAIT_TIME_SECONDS: i32 = 20;

    pub fn new(client: Client, queue_url: String) -> Self {
        let queue_name = queue_url
            .rsplit('/')
            .next()
            .unwrap_or("unknown")
            .to_string();

        Self {
            client,
            queue_url,
            queue_name,
            wait_time_seconds: Self::DEFAULT_WAIT_TIME_SECONDS,
            visibility_timeout_seconds: 60,
            max_messages: 10,
            total_polled: AtomicU64::new(0),
            total_deleted: AtomicU64::new(0),
        }
    }

    /// Long poll wait in seconds (SQS max is 20)
    pub fn with_wait_time_seconds(mut self, seconds: i32) -> Self {
        self.wait_time_seconds = seconds.clamp(0, 20);
        self
    }

    pub fn with_visibility_timeout(mut self, seconds: i32) -> Self {
        self.visibility_timeout_seconds = seconds.max(0);
        self
    }

    /// Messages per receive (SQS max is 10)
    pub fn with_max_messages(mut self, max: u32) -> Self {
        self.max_messages = max.clamp(1, 10) as i32;
        self
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// (polled, deleted) since start
    pub fn totals(&self) -> (u64, u64) {
        (
            self.total_polled.load(Ordering::Relaxed),
            self.total_deleted.load(Ordering::Relaxed),
        )
    }

    fn parse_sqs_message(&self, sqs_msg: &SqsMessage) -> Result<ReceivedAlert> {
        let body = sqs_msg
            .body()
            .ok_or_else(|| AlertError::Queue("Message body is empty".to_string()))?;

        let receipt_handle = sqs_msg
            .receipt_handle()
            .ok_or_else(|| AlertError::Queue("Missing receipt handle".to_string()))?
            .to_string();

        Ok(ReceivedAlert {
            record: parse_envelope(body)?,
            receipt_handle,
        })
    }
}

#[async_trait]
impl AlertQueue for SqsAlertSource {
    fn name(&self) -> &str {
        &self.queue_name
    }

    /// Receive one batch. Messages whose body is not an SNS envelope are
    /// deleted here and left out of the result.
    async fn poll(&self) -> Result<Vec<ReceivedAlert>> {
        let result = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(self.max_messages)
            .visibility_timeout(self.visibility_timeout_seconds)
            .wait_time_seconds(self.wait_time_seconds)
            .send()
            .await
            .map_err(|e| AlertError::Queue(e.to_string()))?;

        let sqs_messages = result.messages.unwrap_or_default();
        let mut alerts = Vec::with_capacity(sqs_messages.len());

        for sqs_msg in sqs_messages {
            match self.parse_sqs_message(&sqs_msg) {
                Ok(alert) => alerts.push(alert),
                Err(e) => {
                    error!(queue = %self.queue_name, error = %e, "Failed to parse SQS message");
                    if let Some(handle) = sqs_msg.receipt_handle() {
                        if let Err(e) = self.delete(handle).await {
                            warn!(error = %e, "Failed to delete unparseable message");
                        }
                    }
                }
            }
        }

        if !alerts.is_empty() {
            self.total_polled.fetch_add(alerts.len() as u64, Ordering::Relaxed);
            debug!(queue = %self.queue_name, count = alerts.len(), "Polled alerts from SQS");
        }

        Ok(alerts)
    }

    async fn delete(&self, receipt_handle: &str) -> Result<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| AlertError::Queue(e.to_string()))?;

        self.total_deleted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_envelope() {
        let record = parse_envelope(
            r#"{"Type":"Notification","MessageId":"abc","TopicArn":"arn:aws:sns:eu-central-1:1:soar","Message":"{\"type\":\"scan\"}"}"#,
        )
        .unwrap();
        assert_eq!(record.message(), r#"{"type":"scan"}"#);
        assert_eq!(record.sns.message_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_parse_envelope_requires_message() {
        assert!(matches!(
            parse_envelope(r#"{"Type":"Notification"}"#),
            Err(AlertError::Json(_))
        ));
        assert!(parse_envelope("plain text").is_err());
    }
}

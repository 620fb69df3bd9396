//! SNS delivery shapes.
//!
//! [`SnsEvent`] is the document a topic subscription hands to a function
//! invocation. [`SnsNotification`] is the envelope SNS writes into an SQS
//! queue subscribed to the same topic.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnsEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<SnsRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnsRecord {
    #[serde(rename = "Sns", default)]
    pub sns: SnsMessage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SnsMessage {
    /// Raw alert payload
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_arn: Option<String>,
}

impl SnsRecord {
    pub fn message(&self) -> &str {
        &self.sns.message
    }
}

/// SNS notification as delivered to an SQS queue
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SnsNotification {
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub topic_arn: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

impl From<SnsNotification> for SnsRecord {
    fn from(n: SnsNotification) -> Self {
        Self {
            sns: SnsMessage {
                message: n.message,
                subject: n.subject,
                message_id: n.message_id,
                topic_arn: n.topic_arn,
            },
        }
    }
}

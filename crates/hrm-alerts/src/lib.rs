//! HRM Alerts
//!
//! Forwards security alerts published on an SNS topic to an e-mail
//! address. Events arrive either as a function-style SNS event document or
//! through an SQS queue subscribed to the topic.

pub mod email;
pub mod error;
pub mod event;
pub mod forwarder;
pub mod mailer;
pub mod parse;
pub mod queue;
pub mod sqs;

pub use email::AlertEmail;
pub use error::{AlertError, Result};
pub use event::{SnsEvent, SnsMessage, SnsNotification, SnsRecord};
pub use forwarder::{AlertForwarder, ForwardReport, RecordOutcome};
pub use mailer::{AlertMailer, SmtpAlertMailer, SmtpSettings};
pub use parse::{parse_alert, repair_payload};
pub use queue::{forward_until, AlertQueue, ReceivedAlert};
pub use sqs::{parse_envelope, SqsAlertSource};

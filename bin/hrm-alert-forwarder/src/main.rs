//! HRM Alert Forwarder
//!
//! Forwards SNS security alerts to e-mail. Two ways to run:
//!
//! - `--event <file|->`: handle one SNS event document and print the report
//! - otherwise: long-poll the SQS queue subscribed to the alert topic
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HRM_CONFIG` | - | Path to a TOML config file |
//! | `HRM_ALERT_SOURCE` | - | Sender address |
//! | `HRM_ALERT_DESTINATION` | - | Recipient address |
//! | `HRM_SMTP_HOST` | - | SMTP relay host |
//! | `HRM_SMTP_PORT` | `587` | SMTP relay port |
//! | `HRM_SMTP_USERNAME` | - | SMTP user |
//! | `HRM_SMTP_PASSWORD` | - | SMTP password |
//! | `HRM_ALERT_QUEUE_URL` | - | SQS queue URL (queue mode) |
//! | `HRM_ALERT_REGION` | `eu-central-1` | AWS region of the queue |
//! | `RUST_LOG` | `info` | Log level |

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use hrm_alerts::{
    forward_until, AlertForwarder, SmtpAlertMailer, SmtpSettings, SnsEvent, SqsAlertSource,
};
use hrm_config::{AppConfig, ConfigLoader};

#[derive(Parser, Debug)]
#[command(name = "hrm-alert-forwarder")]
#[command(about = "Forward SNS security alerts to e-mail")]
struct Args {
    /// TOML config file (overrides HRM_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// SNS event document to process once; `-` reads stdin
    #[arg(long)]
    event: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    hrm_common::logging::init_logging("hrm-alert-forwarder");

    let loader = match &args.config {
        Some(path) => ConfigLoader::with_path(path.clone()),
        None => ConfigLoader::new(),
    };
    let config = loader.load().context("Failed to load configuration")?;
    config
        .validate_alerts()
        .context("Invalid alert configuration")?;

    let forwarder = AlertForwarder::new(Arc::new(build_mailer(&config)?));

    match args.event {
        Some(source) => run_once(&forwarder, &source).await,
        None => run_queue(&forwarder, &config).await,
    }
}

fn build_mailer(config: &AppConfig) -> Result<SmtpAlertMailer> {
    let smtp = &config.alerts.smtp;
    let settings = SmtpSettings {
        host: smtp.host.clone(),
        port: smtp.port,
        username: smtp.username.clone(),
        password: smtp.password.clone(),
        starttls: smtp.starttls,
    };

    SmtpAlertMailer::new(&settings, &config.alerts.source, &config.alerts.destination)
        .context("Failed to create SMTP mailer")
}

async fn run_once(forwarder: &AlertForwarder, source: &str) -> Result<()> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))?
    };

    let event: SnsEvent = serde_json::from_str(&raw).context("Event is not an SNS event document")?;
    let report = forwarder.handle_event(&event).await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_queue(forwarder: &AlertForwarder, config: &AppConfig) -> Result<()> {
    let queue = &config.alerts.queue;
    if queue.queue_url.is_empty() {
        bail!("alerts.queue.queue_url must be set (HRM_ALERT_QUEUE_URL) unless --event is given");
    }

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(queue.region.clone()))
        .load()
        .await;
    let client = aws_sdk_sqs::Client::new(&aws_config);

    let source = SqsAlertSource::new(client, queue.queue_url.clone())
        .with_wait_time_seconds(queue.wait_time_seconds)
        .with_visibility_timeout(queue.visibility_timeout)
        .with_max_messages(queue.max_messages);

    info!(queue = %source.queue_name(), region = %queue.region, "Forwarding alerts from SQS");

    // A batch already received is sent and deleted before this returns.
    forward_until(&source, forwarder, hrm_common::shutdown_signal()).await;

    let (polled, deleted) = source.totals();
    info!(polled, deleted, "HRM Alert Forwarder shutdown complete");
    Ok(())
}

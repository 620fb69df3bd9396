//! Alert Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Malformed alert: {message}")]
    Malformed { message: String },

    #[error("Invalid e-mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build e-mail: {0}")]
    Compose(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AlertError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, AlertError>;

//! HRM Console Server
//!
//! Serves the directory admin console.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HRM_CONFIG` | - | Path to a TOML config file |
//! | `HRM_HTTP_PORT` | `5000` | HTTP port |
//! | `HRM_HTTP_HOST` | `0.0.0.0` | Bind address |
//! | `OKTA_DOMAIN` | - | Okta tenant URL |
//! | `OKTA_API_TOKEN` | - | Okta API token |
//! | `SECRET_KEY` | - | Session signing secret |
//! | `HRM_DEV_MODE` | `false` | Use a seeded in-memory directory |
//! | `RUST_LOG` | `info` | Log level |
//! | `LOG_FORMAT` | `text` | `json` for structured logs |

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use hrm_config::{AppConfig, SessionConfig};
use hrm_console::{console_router, ConsoleState, SessionService, SessionSettings};
use hrm_directory::{DirectoryClient, InMemoryDirectory, OktaClient, OktaConfig};

#[tokio::main]
async fn main() -> Result<()> {
    hrm_common::logging::init_logging("hrm-console-server");

    info!("Starting HRM Console Server");

    let config = AppConfig::load().context("Failed to load configuration")?;
    config
        .validate_console()
        .context("Invalid console configuration")?;

    let directory = build_directory(&config)?;
    let sessions = Arc::new(SessionService::new(session_settings(&config.session)));

    let app = console_router(ConsoleState::new(directory, sessions))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Console listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(hrm_common::shutdown_signal())
        .await?;

    info!("HRM Console Server shutdown complete");
    Ok(())
}

fn build_directory(config: &AppConfig) -> Result<Arc<dyn DirectoryClient>> {
    if config.dev_mode {
        warn!("Dev mode: using seeded in-memory directory (login admin@example.com / admin)");
        return Ok(Arc::new(InMemoryDirectory::seeded()));
    }

    let okta = OktaClient::new(
        OktaConfig::new(&config.directory.domain, &config.directory.api_token)
            .with_timeout(Duration::from_secs(config.directory.timeout_secs)),
    )
    .context("Failed to create Okta client")?;

    Ok(Arc::new(okta))
}

fn session_settings(session: &SessionConfig) -> SessionSettings {
    SessionSettings {
        secret_key: session.secret_key.clone(),
        cookie_name: session.cookie_name.clone(),
        secure: session.secure,
        same_site: session.same_site.clone(),
        expiry_secs: session.expiry_secs,
        issuer: session.issuer.clone(),
    }
}

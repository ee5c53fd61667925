// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Letters Guard Service
//!
//! Sits in front of the letters comment store. Every comment write is
//! checked against the sender's rate window, then validated and sanitized;
//! the prepared comment is returned for the caller to persist.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `COMMENT_MAX_REQUESTS` / `COMMENT_WINDOW_MS`: comment quota (default: 5 per 60000 ms)
//! - `API_MAX_REQUESTS` / `API_WINDOW_MS`: API-wide quota (default: 100 per 60000 ms)
//! - `SWEEP_INTERVAL_SECS`: expired window sweep interval (default: 60)
//! - `MAX_CONTENT_CHARS`: comment length limit (default: 10000)
//! - `TRUST_FORWARDED_HEADERS`: identify clients by proxy headers (default: true)
//! - `ALLOWED_ORIGINS`: comma-separated CORS origins (default: none)
//! - `METRICS_ENABLED`: expose Prometheus metrics (default: true)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use letters_guard::{config::Config, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        comment_max_requests = config.comment_limit.max_requests,
        comment_window_ms = config.comment_limit.window_ms,
        api_max_requests = config.api_limit.max_requests,
        api_window_ms = config.api_limit.window_ms,
        "Starting letters guard"
    );

    let state = Arc::new(handlers::AppState::new(config.clone())?);

    // Sweep expired rate windows so the key maps stay bounded
    let sweep_state = state.clone();
    let sweep_interval = config.sweep_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            let removed = sweep_state.sweep().await;
            if removed > 0 {
                debug!(removed, "Swept expired rate windows");
            }
        }
    });

    let app = handlers::router(state);

    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

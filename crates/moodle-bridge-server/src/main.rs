// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Moodle Bridge - Webhook Synchronization Server
//!
//! An HTTP server responsible for:
//! - Receiving Moodle event webhooks (users, courses, categories)
//! - Presence (connect/disconnect) status updates
//! - Site-wide role table sync
//! - Mirroring the resulting records into a Frappe/ERPNext site

use tracing::{info, warn};

use moodle_bridge_server::config::Config;
use moodle_bridge_server::routes;
use moodle_bridge_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodle_bridge_server=info,moodle_bridge_sync=info".into()),
        )
        .init();

    // Load .env file if present
    if let Err(e) = dotenvy::dotenv() {
        warn!("No .env file loaded: {}", e);
    }

    // Load configuration
    let config = Config::from_env()?;

    info!(
        frappe_url = %config.frappe_url,
        addr = %config.http_addr,
        "Starting Moodle Bridge"
    );

    let state = AppState::new(&config)?;
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;
    info!(addr = %config.http_addr, "Webhook server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Moodle Bridge shut down");

    Ok(())
}

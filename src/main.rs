// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! IP Ban Ledger Service
//!
//! Exposes the in-process ledger over HTTP so a reverse proxy can ask, per
//! request, whether a client address is banned.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `VISIT_LIMIT`: Visits per cycle before an automatic ban (default: 60)
//! - `CYCLE_SECS`: Decay cycle length in seconds (default: 60)
//! - `OVER_LIMIT_BAN_MINUTES`: Automatic ban length (default: 10)
//! - `METRICS_ENABLED`: Serve Prometheus metrics (default: true)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ip_ban_ledger::{
    config::{Config, LedgerConfig, MetricsConfig},
    handlers::{router, AppState},
    ledger::IpLedger,
    metrics::LedgerMetrics,
};

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

    let config = load_config();
    info!(
        bind_addr = %config.bind_addr,
        visit_limit = config.ledger.visit_limit,
        cycle_secs = config.ledger.cycle_secs,
        over_limit_ban_minutes = config.ledger.over_limit_ban_minutes,
        "Starting IP ban ledger"
    );

    let metrics = if config.metrics.enabled {
        Some(LedgerMetrics::new()?)
    } else {
        None
    };

    let (stop_tx, stop_rx) = watch::channel(false);
    let sweep_metrics = metrics.clone();
    let (ledger, decay) = IpLedger::start_observed(config.ledger.clone(), stop_rx, move |report| {
        if let Some(metrics) = &sweep_metrics {
            metrics.observe_sweep(report);
        }
    })?;

    let state = Arc::new(AppState {
        ledger,
        metrics,
        config: config.clone(),
    });
    let app = router(state);

    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down decay scheduler");
    stop_tx.send(true)?;
    decay.join().await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Load configuration from environment variables.
fn load_config() -> Config {
    Config {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        ledger: LedgerConfig {
            visit_limit: env_or("VISIT_LIMIT", 60),
            cycle_secs: env_or("CYCLE_SECS", 60),
            over_limit_ban_minutes: env_or("OVER_LIMIT_BAN_MINUTES", 10),
        },
        metrics: MetricsConfig {
            enabled: env_or("METRICS_ENABLED", true),
            ..Default::default()
        },
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

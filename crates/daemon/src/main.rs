// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! foldjobd — the service binary: loads `Config`, wires the shared KV
//! client and reasoner client into one `AppState`, serves the axum
//! HTTP surface, and spawns the reaper as a background task on the
//! same runtime.
//!
//! Wiring order is config -> adapters -> runtime -> spawn background
//! tasks -> serve: an axum HTTP server plus one `tokio::spawn`ed
//! reaper loop in place of a Unix-socket listener with checkpoint/flush
//! tasks.

use anyhow::Context;
use fj_daemon::config::Config;
use fj_daemon::reaper::{self, ReaperConfig};
use fj_kv::KeySchema;
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let config = Config::load();
    info!("starting foldjobd");

    let (app_state, reaper_kv) = fj_daemon::build_app_state(&config).await?;

    let reaper_keys = KeySchema::new(config.key_prefix.clone());
    let reaper_config = ReaperConfig {
        interval: std::time::Duration::from_secs(config.reaper_interval_secs),
        stale_terminal_secs: config.stale_terminal_secs,
        orphan_meta_secs: config.orphan_meta_secs,
    };
    tokio::spawn(async move {
        reaper::run(reaper_kv, reaper_keys, reaper_config).await;
    });

    let router = fj_web::build_router(app_state, &config.cors_origins);
    let addr: SocketAddr = format!("{}:{}", config.bind_host, config.bind_port)
        .parse()
        .context("FOLDJOB_BIND_HOST/FOLDJOB_BIND_PORT must form a valid socket address")?;

    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    let shutdown = async {
        let ctrl_c = async {
            let _ = tokio::signal::ctrl_c().await;
        };
        #[cfg(unix)]
        let terminate = async {
            sigterm.recv().await;
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {}
            _ = terminate => {}
        }
        info!("shutdown signal received");
    };

    if let Err(e) = axum::serve(listener, router).with_graceful_shutdown(shutdown).await {
        error!(error = %e, "server exited with error");
        return Err(e.into());
    }

    info!("foldjobd stopped");
    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `obd`: the ops backup daemon binary.

use ob_daemon::{router, startup, AppState, Config, ConfigError, LifecycleError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("obd: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), DaemonError> {
    let config = Config::load()?;

    // The daemon log directory must exist before the appender opens it.
    if let Some(parent) = config.daemon_log.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let file_appender = tracing_appender::rolling::never(
        config.daemon_log.parent().unwrap_or(std::path::Path::new(".")),
        config
            .daemon_log
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "obd.log".to_string()),
    );
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let state = startup(config)?;
    let bind = state.config.bind;
    let app = router(AppState {
        deps: state.deps.clone(),
        orchestrator: state.orchestrator.clone(),
    });

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|source| DaemonError::Bind {
            addr: bind.to_string(),
            source,
        })?;
    info!(addr = %bind, "listening");

    // `state` stays alive here: dropping it would release the PID lock.
    axum::serve(listener, app).await.map_err(DaemonError::Serve)?;
    drop(state);
    Ok(())
}

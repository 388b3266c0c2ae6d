//! HTTP listener for the intake API.

use anyhow::{Context, Result};
use axum::Router;
use intake_core::Config;
use tokio::net::TcpListener;

/// Serve `app` until SIGINT or SIGTERM. Open requests are allowed to finish.
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding intake API to {}", addr))?;

    tracing::info!(
        addr = %addr,
        max_upload_bytes = config.max_upload_size_bytes,
        conversion_workers = config.conversion_max_workers,
        "Accepting uploads"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(stop_requested())
        .await
        .context("serving intake API")
}

async fn stop_requested() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "SIGINT handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };
    tracing::info!(signal, "Stopping intake API, draining open requests");
}

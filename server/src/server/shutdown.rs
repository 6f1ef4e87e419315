//! Graceful shutdown.

use std::future::IntoFuture;
use std::time::Duration;
use tokio::signal;
use tokio::sync::oneshot;

/// Waits for Ctrl+C (SIGINT) or, on unix, SIGTERM.
///
/// If a handler cannot be installed that signal is ignored and the other
/// one still triggers shutdown.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}

/// Serve `router` on `listener` until `signal` resolves, then give in-flight
/// requests at most `drain_timeout` to finish.
///
/// # Errors
///
/// Returns error if the server fails while accepting connections.
pub async fn serve_until<F>(
    listener: tokio::net::TcpListener,
    router: axum::Router,
    signal: F,
    drain_timeout: Duration,
) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();

    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            signal.await;
            let _ = signalled_tx.send(());
        })
        .into_future();

    let deadline = async move {
        if signalled_rx.await.is_ok() {
            tokio::time::sleep(drain_timeout).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => result,
        () = deadline => {
            tracing::warn!(timeout_secs = drain_timeout.as_secs(), "Shutdown timeout elapsed, dropping open connections");
            Ok(())
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::routing::get;

    #[tokio::test]
    async fn test_serve_until_stops_on_signal() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let router = axum::Router::new().route("/", get(|| async { "ok" }));

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            serve_until(listener, router, async {}, Duration::from_secs(1)),
        )
        .await;

        assert!(result.unwrap().is_ok());
    }
}

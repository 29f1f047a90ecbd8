//! Server crate for movie-bridge.
//!
//! Holds the application context that coordinates the two stores, the HTTP
//! routes on top of it and the listener loop.

pub mod context;
pub mod error;
pub mod openapi;
pub mod routes;

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

pub use context::{AppContext, CommonMovies, ContextSettings};
pub use error::ApiError;
pub use routes::router;

/// Serve the API on `listen` until Ctrl-C or SIGTERM
pub async fn serve(ctx: AppContext, listen: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(listen).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

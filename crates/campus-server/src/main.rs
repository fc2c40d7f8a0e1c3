use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use campus_core::TokenSigner;
use campus_db::{Database, DatabaseConfig};
use campus_server::config::ServerConfig;
use campus_server::routes;
use campus_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("campus=info".parse()?))
        .with_target(false)
        .init();

    let config = ServerConfig::from_env()?;

    let db = Database::connect(&DatabaseConfig::from_env()?).await?;
    db.init_schema().await?;

    let state = Arc::new(AppState {
        db,
        tokens: TokenSigner::new(config.jwt_secret.as_bytes()),
    });

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!(env = %config.env, "starting server on {}", config.addr);
    let listener = TcpListener::bind(&config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM. Once a signal arrives, a watchdog
/// gives in-flight requests a bounded grace period before forcing the
/// process down.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install CTRL+C handler: {err}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!("failed to install SIGTERM handler: {err}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");

    tokio::spawn(async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        tracing::warn!("graceful shutdown timed out, exiting");
        std::process::exit(1);
    });
}

use std::sync::Arc;

use noteful_server::{
    AppState,
    config::{self, Storage},
    repository::{MemoryRepository, PgRepository, Repository},
    router,
};

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt::init();

    // Load config
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {e}");
        panic!("failed to load config: {e}");
    });
    tracing::info!("Successfully loaded server config");

    // Repository creation and migration
    let repo: Arc<dyn Repository> = match &cfg.storage {
        Storage::Postgres { dsn } => {
            let repo = PgRepository::new(dsn).await.unwrap_or_else(|e| {
                tracing::error!("Failed to establish database connection: {e}");
                panic!("failed to establish database connection: {e}");
            });

            repo.migrate().await.unwrap_or_else(|e| {
                tracing::error!("Failed to migrate database: {e}");
                panic!("failed to migrate database: {e}");
            });

            Arc::new(repo)
        }
        Storage::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on shutdown");
            Arc::new(MemoryRepository::new())
        }
    };

    let app = router(AppState::new(repo));

    let listener = tokio::net::TcpListener::bind(cfg.address())
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind to {}: {e}", cfg.address());
            panic!("failed to bind to address: {e}");
        });

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Started listening on {}", addr),
        Err(e) => tracing::warn!("Listening on unknown address: {e}"),
    }

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("HTTP server error: {e}");
        panic!("failed to start HTTP server: {e}");
    }

    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}

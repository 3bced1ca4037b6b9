use std::sync::Arc;

use todo_service::config::ServerConfig;
use todo_service::server;
use todo_service::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env();

    eprintln!("Todo Service v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_conn_str);
    eprintln!("   Items API: http://{}/v1/items", config.bind_address());

    // ── Database ─────────────────────────────────────────────────────────
    let db: Arc<dyn Database> = Arc::new(
        LibSqlBackend::open(&config.db_conn_str)
            .await
            .unwrap_or_else(|e| {
                eprintln!(
                    "Error: Failed to open database at {}: {}",
                    config.db_conn_str, e
                );
                std::process::exit(1);
            }),
    );

    // ── HTTP ─────────────────────────────────────────────────────────────
    let app = server::app(db);
    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: Failed to bind {}: {}", config.bind_address(), e);
            std::process::exit(1);
        });

    tracing::info!(addr = %config.bind_address(), "Todo service started");
    axum::serve(listener, app).await?;

    Ok(())
}

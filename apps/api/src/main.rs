use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod router;

use shared_config::AppConfig;

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn build_app(config: Arc<AppConfig>) -> Router {
    // The dashboard is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router::create_router(config)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env();
    if !config.is_configured() {
        warn!("Supabase settings are incomplete; data endpoints will fail until they are set");
    }
    info!(
        "Clinic hours {:02}:00-{:02}:00, {} minute slots, {} dedicated rooms",
        config.scheduling.open_hour,
        config.scheduling.close_hour,
        config.scheduling.slot_minutes,
        config.scheduling.dedicated_rooms.len()
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let app = build_app(Arc::new(config));

    let listener = TcpListener::bind(addr).await?;
    info!("Clinic operations API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

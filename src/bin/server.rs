use std::sync::Arc;

use clap::Parser;
use leaderboard_server::api::{router, AppState};
use leaderboard_server::config::ServerConfig;
use leaderboard_server::names::NameValidator;
use leaderboard_server::service::LeaderboardService;
use tower_http::services::{ServeDir, ServeFile};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    let config = ServerConfig::parse();

    let policy = match config.moderation_policy() {
        Ok(policy) => policy,
        Err(error) => {
            tracing::error!(%error, "failed to load moderation blocklist");
            std::process::exit(1);
        }
    };
    tracing::info!(
        version = policy.active_version(),
        terms = policy.banned_terms().len(),
        "moderation policy loaded"
    );

    let gate = config.admin_gate();
    if !gate.is_configured() {
        tracing::warn!("no admin code configured; record removal is disabled");
    }

    let names = NameValidator::new(policy);
    let service = LeaderboardService::new(Arc::new(config.record_store(&names)), names);
    let app = router(AppState::new(service, Arc::new(gate)));

    let app = if let Some(static_dir) = config.resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        tracing::info!(root = %static_dir.display(), "serving static files");
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        tracing::info!("static file root not found; serving API only");
        app
    };

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind server socket");

    tracing::info!(addr = %bind_addr, "listening");
    axum::serve(listener, app)
        .await
        .expect("server runtime failed");
}

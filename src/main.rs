mod app;
mod attendance;
mod config;
mod db;
mod error;
mod qr;
mod routes;
mod state;
mod storage;
mod users;

use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "attendance=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;

    let shared = qr::bootstrap_shared_qr(app_state.storage.as_ref(), &app_state.config)
        .await
        .context("bootstrap shared qr")?;
    tracing::info!(key = shared.key, payload = %shared.payload, regenerated = shared.regenerated, "shared qr ready");

    if let Err(e) = users::services::provision_pending(&app_state).await {
        tracing::warn!(error = %e, "could not retry pending provisioning; continuing");
    }

    let config = app_state.config.clone();
    let app = app::build_app(app_state);
    app::serve(app, &config).await
}

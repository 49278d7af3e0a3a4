use std::sync::Arc;

use activity_dashboard::dashboard_config;
use activity_dashboard::state::AppState;
use anyhow::Context;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shared::init_tracing!()?;
    let env = shared::load_env_config!()?;

    let config = dashboard_config::load(&env.data_dir).with_context(|| {
        format!("failed to load dashboard settings from {}", env.data_dir.display())
    })?;
    let state = Arc::new(AppState::new(&env.data_dir, config));
    info!(
        entries = state.snapshot().len(),
        data_dir = %env.data_dir.display(),
        "event log loaded"
    );

    let app = activity_dashboard::router(state);
    let listener = tokio::net::TcpListener::bind(env.bind)
        .await
        .with_context(|| format!("failed to bind to {}", env.bind))?;
    info!("listening on {}", env.bind);
    axum::serve(listener, app).await?;
    Ok(())
}

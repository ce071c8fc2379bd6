use anyhow::Result;
use fitplan_api::{build_app, ApiConfig};
use fitplan_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("fitplan_api");

    let config = ApiConfig::from_env();
    let app = build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!(
        bind = %config.bind,
        model_dir = %config.model_dir.display(),
        "fitplan api started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

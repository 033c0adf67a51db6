use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use football_stats_api::api::{AppState, build_router};
use football_stats_api::config::Config;
use football_stats_api::provider::ApiFootball;
use football_stats_api::service::StatsService;

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("football_stats_api=info")),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    // The blocking HTTP client owns its own runtime, so it must be created
    // and dropped outside the server's.
    let provider = ApiFootball::new(&config.provider).context("failed to build provider client")?;
    let service = Arc::new(StatsService::new(Arc::new(provider), config.clone()));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let result = runtime.block_on(serve(Arc::clone(&service), &config.bind_addr));
    drop(runtime);
    drop(service);
    result
}

async fn serve(service: Arc<StatsService>, bind_addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = bind_addr, "listening");
    axum::serve(listener, build_router(AppState { service }))
        .await
        .context("server error")
}

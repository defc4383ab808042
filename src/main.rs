use std::sync::Arc;

use medialog_api::{
    achievements::AchievementCatalog,
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, create_redis_client, Cache, PgNotifier, PgUnlockStore},
    services::{MetadataClient, PgStatsProvider},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let cache = Cache::new(redis_client);

    let metadata = config
        .metadata_api_key
        .as_ref()
        .map(|key| MetadataClient::new(cache.clone(), key.clone(), config.metadata_api_url.clone()));
    if metadata.is_none() {
        tracing::warn!("No metadata API key configured; /search is disabled");
    }

    let catalog = Arc::new(AchievementCatalog::standard());
    tracing::info!(achievement_count = catalog.len(), "Achievement catalog loaded");

    let state = AppState::new(
        catalog,
        Arc::new(PgStatsProvider::new(pool.clone())),
        Arc::new(PgUnlockStore::new(pool.clone())),
        Arc::new(PgNotifier::new(pool)),
        metadata,
    );

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}

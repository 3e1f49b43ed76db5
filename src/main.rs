//! Service entry point: settings from env, store selection, schema, optional seed, serve.

use pizza_catalog::{
    app, apply_migrations, ensure_database_exists, AppState, CatalogStore, MemoryStore, PgStore, Settings,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pizza_catalog=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let state = match settings.database_url.as_deref() {
        Some(database_url) => {
            ensure_database_exists(database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(database_url)
                .await?;
            apply_migrations(&pool).await?;
            build_state(PgStore::new(pool), settings.seed_data).await?
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            build_state(MemoryStore::new(), settings.seed_data).await?
        }
    };

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn build_state(store: impl CatalogStore + 'static, seed: bool) -> Result<AppState, Box<dyn std::error::Error>> {
    if seed && store.seed().await? {
        tracing::info!("demo catalog inserted");
    }
    Ok(AppState::new(store))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

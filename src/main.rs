use std::sync::Arc;

use trailerguess_api::{
    api::{create_router, AppState},
    config::Config,
    db,
    services::providers::tmdb::TmdbProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trailerguess_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    let provider = Arc::new(TmdbProvider::new(
        config.tmdb_api_url.clone(),
        config.tmdb_api_token.clone(),
    ));

    let state = AppState::new(pool, provider);
    let app = create_router(state);

    let addr = config.listen_addr();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}

use std::{net::SocketAddr, time::Duration};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecommerce_backoffice::{
    app::build_router,
    config::AppConfig,
    db::{Db, run_migrations},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ecommerce_backoffice=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let db = Db::connect(&config.database_url, config.db_retry.clone()).await?;
    run_migrations(&*db.conn()).await?;
    let _monitor = db.spawn_monitor(Duration::from_secs(config.db_health_interval_secs));

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    let app = build_router(AppState::new(db, config));

    tracing::info!("listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}

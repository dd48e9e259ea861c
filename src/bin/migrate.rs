use ecommerce_backoffice::{
    config::AppConfig,
    db::{Db, run_migrations},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let db = Db::connect(&config.database_url, config.db_retry.clone()).await?;
    run_migrations(&*db.conn()).await?;
    println!("Migrations applied");
    Ok(())
}

use food_order::{
    config::AppConfig,
    db::{create_orm_conn, pg_pool, run_migrations},
};
use tower_sessions_sqlx_store::PostgresStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    PostgresStore::new(pg_pool(&orm)).migrate().await?;
    println!("Migrations applied");
    Ok(())
}

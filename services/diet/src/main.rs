use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use common::database::{DatabaseConfig, init_pool, run_migrations};
use diet::{
    MIGRATOR,
    config::AppConfig,
    repositories::{UserRepository, meal::MealRepository},
    routes,
    state::AppState,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting diet service");

    let app_config = AppConfig::load()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool, &MIGRATOR).await?;

    let app_state = AppState::new(
        Arc::new(UserRepository::new(pool.clone())),
        Arc::new(MealRepository::new(pool)),
        app_config.session.clone(),
    );

    info!("Diet service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let address = app_config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Diet service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}

//! CivicWatch Server: Citizen Issue Reporting Platform
//!
//! Main entry point that loads configuration, prepares the database,
//! and starts the server.

use tracing_subscriber::{EnvFilter, fmt};

use civicwatch_core::config::AppConfig;
use civicwatch_core::error::AppError;
use civicwatch_database::DatabasePool;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Load configuration for the environment named by `CIVICWATCH_ENV`
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("CIVICWATCH_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Connect to the database, apply migrations, and run the server until
/// shutdown
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CivicWatch v{}", env!("CARGO_PKG_VERSION"));

    tracing::info!("Connecting to database...");
    let db_pool = DatabasePool::connect(&config.database).await?.into_pool();

    tracing::info!("Running database migrations...");
    civicwatch_database::migration::run_migrations(&db_pool).await?;
    tracing::info!("Database migrations complete");

    civicwatch_api::run_server(config, db_pool).await?;

    tracing::info!("CivicWatch server shut down gracefully");
    Ok(())
}

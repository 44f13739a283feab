//! Database migration command.

use civicwatch_core::error::AppError;

use crate::output;

/// Run all pending migrations
pub async fn execute(env: &str) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;

    println!("Running database migrations...");
    civicwatch_database::migration::run_migrations(&pool).await?;
    output::print_success("All migrations applied successfully.");

    Ok(())
}

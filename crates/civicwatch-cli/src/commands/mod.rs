//! CLI command definitions and dispatch.

pub mod admin;
pub mod department;
pub mod migrate;
pub mod serve;
pub mod user;

use clap::{Parser, Subcommand};

use civicwatch_core::error::AppError;

use crate::output::OutputFormat;

/// CivicWatch: Citizen Issue Reporting Platform
#[derive(Debug, Parser)]
#[command(name = "civicwatch", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (loads config/default and config/{env})
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the CivicWatch server
    Serve(serve::ServeArgs),
    /// Run all pending database migrations
    Migrate,
    /// Admin account management
    Admin(admin::AdminArgs),
    /// User management
    User(user::UserArgs),
    /// Department catalogue management
    Department(department::DepartmentArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.env).await,
            Commands::Migrate => migrate::execute(&self.env).await,
            Commands::Admin(args) => admin::execute(args, &self.env).await,
            Commands::User(args) => user::execute(args, &self.env, self.format).await,
            Commands::Department(args) => department::execute(args, &self.env, self.format).await,
        }
    }
}

/// Helper: load configuration for the selected environment
pub fn load_config(env: &str) -> Result<civicwatch_core::config::AppConfig, AppError> {
    civicwatch_core::config::AppConfig::load(env)
}

/// Helper: create database pool from config
pub async fn create_db_pool(
    config: &civicwatch_core::config::AppConfig,
) -> Result<sqlx::PgPool, AppError> {
    let pool = civicwatch_database::DatabasePool::connect(&config.database).await?;
    Ok(pool.into_pool())
}

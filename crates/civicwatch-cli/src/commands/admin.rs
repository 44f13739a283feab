//! Admin account management commands.

use clap::{Args, Subcommand};

use civicwatch_auth::password::PasswordHasher;
use civicwatch_core::error::AppError;
use civicwatch_database::repositories::user::UserRepository;
use civicwatch_entity::user::model::CreateUser;
use civicwatch_entity::user::UserRole;

use crate::output;

/// Arguments for admin commands
#[derive(Debug, Args)]
pub struct AdminArgs {
    /// Admin subcommand
    #[command(subcommand)]
    pub command: AdminCommand,
}

/// Admin subcommands
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Create a new admin account
    Create {
        /// Email
        #[arg(short, long)]
        email: Option<String>,
        /// Full name
        #[arg(short, long)]
        full_name: Option<String>,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
}

/// Execute admin commands
pub async fn execute(args: &AdminArgs, env: &str) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;
    let user_repo = UserRepository::new(pool);
    let hasher = PasswordHasher::new();

    match &args.command {
        AdminCommand::Create {
            email,
            full_name,
            password,
        } => {
            let email = match email {
                Some(e) => e.clone(),
                None => dialoguer::Input::new()
                    .with_prompt("Admin email")
                    .interact_text()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
            };

            let full_name = match full_name {
                Some(n) => n.clone(),
                None => dialoguer::Input::new()
                    .with_prompt("Full name")
                    .interact_text()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
            };

            let password = match password {
                Some(p) => p.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("Admin password")
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
            };

            let password_hash = hasher.hash_password(&password).await?;

            let user = user_repo
                .create(&CreateUser {
                    email: email.clone(),
                    password_hash,
                    full_name,
                    role: UserRole::Admin,
                })
                .await?;

            output::print_success(&format!("Admin account '{email}' created (id: {})", user.id));
        }
    }

    Ok(())
}

//! User management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use civicwatch_core::error::AppError;
use civicwatch_core::types::pagination::PageRequest;
use civicwatch_database::repositories::user::UserRepository;
use civicwatch_entity::user::{UserRole, UserStatus};

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List accounts, newest first
    List {
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u64,
        /// Accounts per page
        #[arg(long, default_value = "50")]
        per_page: u64,
    },
    /// Change an account's role
    Role {
        /// Email of the account
        email: String,
        /// New role: admin, official, or citizen
        role: String,
    },
    /// Re-enable a disabled account
    Enable {
        /// Email of the account
        email: String,
    },
    /// Disable an account
    Disable {
        /// Email of the account
        email: String,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    email: String,
    full_name: String,
    role: String,
    status: String,
    created_at: String,
}

impl From<&civicwatch_entity::user::User> for UserRow {
    fn from(user: &civicwatch_entity::user::User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role.to_string(),
            status: user.status.to_string(),
            created_at: user.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute user commands
pub async fn execute(args: &UserArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;
    let user_repo = UserRepository::new(pool);

    match &args.command {
        UserCommand::List { page, per_page } => {
            let result = user_repo
                .find_all(&PageRequest::new(*page, *per_page))
                .await?;

            let rows: Vec<UserRow> = result.items.iter().map(UserRow::from).collect();
            output::print_list(&rows, format);
            println!(
                "Page {} of {} ({} accounts)",
                result.page, result.total_pages, result.total_items
            );
        }
        UserCommand::Role { email, role } => {
            let role = parse_role(role)?;
            let user = find_by_email(&user_repo, email).await?;
            user_repo.update_role(user.id, role).await?;
            output::print_success(&format!("Role of '{email}' set to {role}"));
        }
        UserCommand::Enable { email } => {
            let user = find_by_email(&user_repo, email).await?;
            user_repo.update_status(user.id, UserStatus::Active).await?;
            output::print_success(&format!("Account '{email}' enabled"));
        }
        UserCommand::Disable { email } => {
            let user = find_by_email(&user_repo, email).await?;
            user_repo
                .update_status(user.id, UserStatus::Disabled)
                .await?;
            output::print_success(&format!("Account '{email}' disabled"));
        }
    }

    Ok(())
}

async fn find_by_email(
    user_repo: &UserRepository,
    email: &str,
) -> Result<civicwatch_entity::user::User, AppError> {
    user_repo
        .find_by_email(email)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User '{email}' not found")))
}

fn parse_role(role: &str) -> Result<UserRole, AppError> {
    match role.to_ascii_lowercase().as_str() {
        "admin" => Ok(UserRole::Admin),
        "official" => Ok(UserRole::Official),
        "citizen" => Ok(UserRole::Citizen),
        other => Err(AppError::validation(format!(
            "Unknown role '{other}'; expected admin, official, or citizen"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_accepts_known_roles() {
        assert_eq!(parse_role("Admin").unwrap(), UserRole::Admin);
        assert_eq!(parse_role("official").unwrap(), UserRole::Official);
        assert_eq!(parse_role("CITIZEN").unwrap(), UserRole::Citizen);
    }

    #[test]
    fn test_parse_role_rejects_unknown() {
        assert!(parse_role("moderator").is_err());
    }
}

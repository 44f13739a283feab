//! Department catalogue CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use civicwatch_core::error::AppError;
use civicwatch_database::repositories::department::DepartmentRepository;
use civicwatch_entity::department::CreateDepartment;

use crate::output::{self, OutputFormat};

/// Arguments for department commands
#[derive(Debug, Args)]
pub struct DepartmentArgs {
    /// Department subcommand
    #[command(subcommand)]
    pub command: DepartmentCommand,
}

/// Department subcommands
#[derive(Debug, Subcommand)]
pub enum DepartmentCommand {
    /// List all departments
    List,
    /// Create a department
    Create {
        /// Department name
        name: String,
        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
    },
}

/// Department display row for table output
#[derive(Debug, Serialize, Tabled)]
struct DepartmentRow {
    id: String,
    name: String,
    description: String,
}

/// Execute department commands
pub async fn execute(
    args: &DepartmentArgs,
    env: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;
    let department_repo = DepartmentRepository::new(pool);

    match &args.command {
        DepartmentCommand::List => {
            let departments = department_repo.find_all().await?;
            let rows: Vec<DepartmentRow> = departments
                .iter()
                .map(|d| DepartmentRow {
                    id: d.id.to_string(),
                    name: d.name.clone(),
                    description: d.description.clone().unwrap_or_default(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        DepartmentCommand::Create { name, description } => {
            let department = department_repo
                .create(&CreateDepartment {
                    name: name.clone(),
                    description: description.clone(),
                })
                .await?;
            output::print_success(&format!(
                "Department '{}' created (id: {})",
                department.name, department.id
            ));
        }
    }

    Ok(())
}

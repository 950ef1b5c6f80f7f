use anyhow::Result;
use clap::Parser;
use console::style;

use stepwise_core::config::StepwiseConfig;
use stepwise_runtime::db::{self, DatabaseChange};

use super::{connect, resolve};
use crate::app::Outcome;

/// Create a PostgreSQL database if it does not exist.
#[derive(Parser)]
pub struct CreateDbCommand {
    /// Name of the database to create.
    #[arg(long)]
    pub db_name: String,

    /// Connection URL of a role allowed to create databases.
    #[arg(long, env = "OWNER_DATABASE_URL", hide_env_values = true)]
    pub owner_db_url: Option<String>,
}

impl CreateDbCommand {
    pub async fn execute(self, config: &StepwiseConfig) -> Result<Outcome> {
        let url = owner_url(self.owner_db_url.as_deref(), config)?;
        let owner = connect(&url, config).await?;

        let change = db::create_database(owner.pool(), &self.db_name).await?;
        println!("{}", describe(change, &self.db_name));

        owner.close().await;
        Ok(Outcome::Exit)
    }
}

/// Delete a PostgreSQL database if it exists.
#[derive(Parser)]
pub struct DeleteDbCommand {
    /// Name of the database to delete.
    #[arg(long)]
    pub db_name: String,

    /// Connection URL of a role allowed to drop the database.
    #[arg(long, env = "OWNER_DATABASE_URL", hide_env_values = true)]
    pub owner_db_url: Option<String>,
}

impl DeleteDbCommand {
    pub async fn execute(self, config: &StepwiseConfig) -> Result<Outcome> {
        let url = owner_url(self.owner_db_url.as_deref(), config)?;
        let owner = connect(&url, config).await?;

        let change = db::delete_database(owner.pool(), &self.db_name).await?;
        println!("{}", describe(change, &self.db_name));

        owner.close().await;
        Ok(Outcome::Exit)
    }
}

fn owner_url(flag: Option<&str>, config: &StepwiseConfig) -> Result<String> {
    Ok(resolve(
        flag,
        config.database.owner_url.as_deref(),
        "owner-db-url",
        "OWNER_DATABASE_URL",
    )?)
}

/// One-line report of a create or delete.
pub(crate) fn describe(change: DatabaseChange, name: &str) -> String {
    match change {
        DatabaseChange::Created => format!("{} Created database: {}", style("✅").green(), name),
        DatabaseChange::AlreadyExists => {
            format!("{}  Database already exists: {}", style("⚠️").yellow(), name)
        }
        DatabaseChange::Deleted => format!("{}  Deleted database: {}", style("🗑️").red(), name),
        DatabaseChange::NotFound => {
            format!("{}  Database does not exist: {}", style("⚠️").yellow(), name)
        }
    }
}

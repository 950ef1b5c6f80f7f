use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use sqlx::PgPool;

use stepwise_core::config::StepwiseConfig;
use stepwise_core::migration::MigrationRegistry;

use super::{connect, migrator, print_status, print_status_after_failure, resolve};
use crate::app::Outcome;

/// Apply pending migrations.
#[derive(Parser)]
pub struct UpCommand {
    /// Database connection URL.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub db_url: Option<String>,

    /// Keep the host application running after a successful migration.
    #[arg(long)]
    pub no_exit: bool,
}

impl UpCommand {
    pub async fn execute(
        self,
        registry: &MigrationRegistry<PgPool>,
        config: &StepwiseConfig,
    ) -> Result<Outcome> {
        let url = resolve(
            self.db_url.as_deref(),
            config.database.url.as_deref(),
            "db-url",
            "DATABASE_URL",
        )?;
        let db = connect(&url, config).await?;
        let migrator = migrator(&db, registry, config)?;

        println!("Running migrations...");
        let before = migrator.snapshot().await;
        if let Err(e) = migrator.migrate().await {
            print_status_after_failure(&migrator).await;
            return Err(e.into());
        }
        let after = migrator.snapshot().await;

        print!("{}", migrator.diff(&before, &after).render());
        print_status(&migrator, false).await?;

        if self.no_exit {
            Ok(Outcome::Continue)
        } else {
            db.close().await;
            Ok(Outcome::Exit)
        }
    }
}

/// Roll migrations back: the last one by default.
#[derive(Parser)]
pub struct DownCommand {
    /// Database connection URL.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub db_url: Option<String>,

    /// Roll back everything applied after this migration, keeping it.
    #[arg(long, conflicts_with = "all")]
    pub id: Option<String>,

    /// Roll back every applied migration.
    #[arg(long)]
    pub all: bool,
}

impl DownCommand {
    pub async fn execute(
        self,
        registry: &MigrationRegistry<PgPool>,
        config: &StepwiseConfig,
    ) -> Result<Outcome> {
        let url = resolve(
            self.db_url.as_deref(),
            config.database.url.as_deref(),
            "db-url",
            "DATABASE_URL",
        )?;
        let db = connect(&url, config).await?;
        let migrator = migrator(&db, registry, config)?;

        let result = match self.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => migrator
                .rollback_to(id)
                .await
                .map(|_| format!("Rollback to migration: {} complete.", id))
                .context("failed to roll back to migration"),
            None if self.all => migrator
                .rollback_all()
                .await
                .map(|_| "Rollback all migrations complete.".to_string())
                .context("failed to roll back all migrations"),
            None => migrator
                .rollback_last()
                .await
                .map(|_| "Rollback last complete.".to_string())
                .context("rollback failed"),
        };

        match result {
            Ok(message) => {
                println!("{} {}", style("✅").green(), message);
                print_status(&migrator, false).await?;
                db.close().await;
                Ok(Outcome::Exit)
            }
            Err(e) => {
                print_status_after_failure(&migrator).await;
                Err(e)
            }
        }
    }
}

/// Show the current migration status.
#[derive(Parser)]
pub struct StatusCommand {
    /// Database connection URL.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub db_url: Option<String>,
}

impl StatusCommand {
    pub async fn execute(
        self,
        registry: &MigrationRegistry<PgPool>,
        config: &StepwiseConfig,
    ) -> Result<Outcome> {
        let url = resolve(
            self.db_url.as_deref(),
            config.database.url.as_deref(),
            "db-url",
            "DATABASE_URL",
        )?;
        let db = connect(&url, config).await?;
        let migrator = migrator(&db, registry, config)?;

        print_status(&migrator, false).await?;
        db.close().await;
        Ok(Outcome::Exit)
    }
}

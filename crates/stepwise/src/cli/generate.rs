use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use sqlx::PgPool;

use stepwise_codegen::ModelGenerator;
use stepwise_core::config::StepwiseConfig;
use stepwise_core::error::StepwiseError;
use stepwise_core::migration::MigrationRegistry;
use stepwise_runtime::db;

use super::{connect, migrator, resolve};
use crate::app::Outcome;

/// Generate Rust models from the database schema.
///
/// Pending migrations are applied first so the models match the registry.
#[derive(Parser)]
pub struct GenCommand {
    /// Database connection URL.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub db_url: Option<String>,

    /// Output directory for generated models. Its contents are replaced.
    #[arg(long)]
    pub out: Option<String>,
}

impl GenCommand {
    pub async fn execute(
        self,
        registry: &MigrationRegistry<PgPool>,
        config: &StepwiseConfig,
    ) -> Result<Outcome> {
        let out = self
            .out
            .as_deref()
            .or(config.codegen.out.as_deref())
            .map(str::trim)
            .filter(|out| !out.is_empty())
            .map(String::from)
            .ok_or_else(|| {
                StepwiseError::InvalidArgument(
                    "out is required: pass --out or set [codegen] out in stepwise.toml".into(),
                )
            })?;

        let url = resolve(
            self.db_url.as_deref(),
            config.database.url.as_deref(),
            "db-url",
            "DATABASE_URL",
        )?;
        let db = connect(&url, config).await?;

        let applied = migrator(&db, registry, config)?
            .migrate()
            .await
            .context("failed to migrate before generating models")?;
        if !applied.is_empty() {
            println!(
                "{} Applied {} pending migration(s) first",
                style("🆕").cyan(),
                applied.len()
            );
        }

        let tables = db::introspect_tables(db.pool()).await?;
        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        println!("Generating models for tables: {}", names.join(", "));

        ModelGenerator::new(&out)
            .generate(&tables)
            .context("failed to generate models")?;

        println!("{} Models generated in: {}", style("✅").green(), out);
        println!("{} Model generation complete.", style("🎉").bold());

        db.close().await;
        Ok(Outcome::Exit)
    }
}

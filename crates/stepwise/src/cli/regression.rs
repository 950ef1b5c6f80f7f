use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use sqlx::PgPool;

use stepwise_core::config::StepwiseConfig;
use stepwise_core::migration::MigrationRegistry;
use stepwise_runtime::{db, RoundTripStage};

use super::database::describe;
use super::{connect, migrator, resolve};
use crate::app::Outcome;

/// Recreate a scratch database, then migrate up, roll everything back and
/// migrate again, printing the full status after each step.
#[derive(Parser)]
pub struct RegressionCommand {
    /// Connection URL of a role allowed to create and drop the scratch database.
    #[arg(long, env = "OWNER_DATABASE_URL", hide_env_values = true)]
    pub owner_db_url: Option<String>,

    /// Connection URL of the scratch database.
    #[arg(long, env = "REGRESSION_DATABASE_URL", hide_env_values = true)]
    pub regression_db_url: Option<String>,

    /// Name of the scratch database. It is dropped first if it exists.
    #[arg(long)]
    pub db_name: String,
}

impl RegressionCommand {
    pub async fn execute(
        self,
        registry: &MigrationRegistry<PgPool>,
        config: &StepwiseConfig,
    ) -> Result<Outcome> {
        let owner_url = resolve(
            self.owner_db_url.as_deref(),
            config.database.owner_url.as_deref(),
            "owner-db-url",
            "OWNER_DATABASE_URL",
        )?;
        let regression_url = resolve(
            self.regression_db_url.as_deref(),
            config.database.regression_url.as_deref(),
            "regression-db-url",
            "REGRESSION_DATABASE_URL",
        )?;

        let owner = connect(&owner_url, config).await?;
        let change = db::delete_database(owner.pool(), &self.db_name).await?;
        println!("{}", describe(change, &self.db_name));
        let change = db::create_database(owner.pool(), &self.db_name).await?;
        println!("{}", describe(change, &self.db_name));
        owner.close().await;

        let scratch = connect(&regression_url, config).await?;
        let migrator = migrator(&scratch, registry, config)?;

        migrator
            .round_trip_with(|stage, report| {
                println!("\n{} {}", style("▶").cyan(), stage_label(stage));
                print!("{}", report.render(true));
            })
            .await
            .context("regression failed")?;

        println!(
            "{} Regression test complete, migration all up and all down, and migrate again, all pass.",
            style("✅").green()
        );

        scratch.close().await;
        Ok(Outcome::Exit)
    }
}

fn stage_label(stage: RoundTripStage) -> &'static str {
    match stage {
        RoundTripStage::Migrated => "After migrating up",
        RoundTripStage::RolledBack => "After rolling back all",
        RoundTripStage::Remigrated => "After migrating up again",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_name_is_required() {
        assert!(RegressionCommand::try_parse_from(["regression"]).is_err());

        let cmd = RegressionCommand::try_parse_from([
            "regression",
            "--owner-db-url",
            "postgres://owner@localhost/postgres",
            "--regression-db-url",
            "postgres://owner@localhost/scratch",
            "--db-name",
            "scratch",
        ])
        .unwrap();
        assert_eq!(cmd.db_name, "scratch");
        assert_eq!(
            cmd.regression_db_url.as_deref(),
            Some("postgres://owner@localhost/scratch")
        );
    }
}

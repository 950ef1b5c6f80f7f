//! Entry point a host binary calls before starting its own work.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use sqlx::PgPool;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use stepwise_core::config::StepwiseConfig;
use stepwise_core::migration::MigrationRegistry;

use crate::cli::{self, Cli};

/// What the host application should do after [`Stepwise::run`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No stepwise command was given (or `up --no-exit`); keep running.
    Continue,
    /// A command ran to completion; the process should exit.
    Exit,
}

impl Outcome {
    pub fn should_exit(self) -> bool {
        self == Outcome::Exit
    }
}

/// Migration commands embedded in a host binary.
///
/// ```ignore
/// let registry = MigrationRegistry::new().with(create_users()).with(create_orders());
/// if Stepwise::new(registry).run().await?.should_exit() {
///     return Ok(());
/// }
/// // start the application
/// ```
pub struct Stepwise {
    registry: MigrationRegistry<PgPool>,
    config_path: PathBuf,
    config: Option<StepwiseConfig>,
}

impl Stepwise {
    pub fn new(registry: MigrationRegistry<PgPool>) -> Self {
        Self {
            registry,
            config_path: PathBuf::from("stepwise.toml"),
            config: None,
        }
    }

    /// Read configuration from `path` instead of `./stepwise.toml`.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Use `config` instead of reading a file.
    pub fn config(mut self, config: StepwiseConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn registry(&self) -> &MigrationRegistry<PgPool> {
        &self.registry
    }

    /// Dispatch on the process arguments.
    pub async fn run(&self) -> Result<Outcome> {
        self.run_from(std::env::args_os()).await
    }

    /// Dispatch on `args`, the first of which is the program name.
    pub async fn run_from<I, T>(&self, args: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let dotenv = dotenvy::dotenv();
        init_tracing();
        if let Err(e) = dotenv {
            debug!(".env not loaded: {}", e);
        }

        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let Some(command) = args.get(1).and_then(|arg| arg.to_str()) else {
            return Ok(Outcome::Continue);
        };

        match command {
            "help" | "--help" | "-h" => {
                Cli::command().print_help()?;
                println!();
                return Ok(Outcome::Exit);
            }
            other if !cli::is_command(other) => {
                debug!("Not a stepwise command: {}", other);
                return Ok(Outcome::Continue);
            }
            _ => {}
        }

        let cli = match Cli::try_parse_from(&args) {
            Ok(cli) => cli,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.print()?;
                return Ok(Outcome::Exit);
            }
            Err(e) => return Err(e.into()),
        };

        let config = match &self.config {
            Some(config) => config.clone(),
            None => StepwiseConfig::load_or_default(&self.config_path)?,
        };

        cli.execute(&self.registry, &config).await
    }
}

/// Install a subscriber unless the host already has one.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stepwise() -> Stepwise {
        Stepwise::new(MigrationRegistry::new()).config(StepwiseConfig::default())
    }

    #[tokio::test]
    async fn test_no_arguments_continue() {
        let outcome = stepwise().run_from(["bookshelf"]).await.unwrap();
        assert_eq!(outcome, Outcome::Continue);
        assert!(!outcome.should_exit());
    }

    #[tokio::test]
    async fn test_unknown_command_continues() {
        let outcome = stepwise()
            .run_from(["bookshelf", "serve", "--port", "8080"])
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Continue);
    }

    #[tokio::test]
    async fn test_help_exits() {
        for flag in ["help", "--help", "-h"] {
            let outcome = stepwise().run_from(["bookshelf", flag]).await.unwrap();
            assert_eq!(outcome, Outcome::Exit);
        }
    }

    #[tokio::test]
    async fn test_command_help_exits() {
        let outcome = stepwise().run_from(["bookshelf", "up", "--help"]).await.unwrap();
        assert_eq!(outcome, Outcome::Exit);
    }

    #[tokio::test]
    async fn test_bad_flag_is_an_error() {
        let result = stepwise().run_from(["bookshelf", "up", "--bogus"]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_url_is_an_error() {
        // An empty flag overrides any DATABASE_URL in the environment
        let err = stepwise()
            .run_from(["bookshelf", "status", "--db-url", ""])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("db-url"));
    }

    #[tokio::test]
    async fn test_gen_requires_out() {
        let err = stepwise()
            .run_from(["bookshelf", "gen", "--db-url", "postgres://localhost/none"])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("out"));
    }

    #[tokio::test]
    async fn test_config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stepwise.toml");
        std::fs::write(&path, "[codegen]\nout = \"\"\n[database]\nurl = \"\"\n").unwrap();

        let err = Stepwise::new(MigrationRegistry::new())
            .config_path(&path)
            .run_from(["bookshelf", "status", "--db-url", ""])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("db-url"));

        std::fs::write(&path, "[database\n").unwrap();
        let err = Stepwise::new(MigrationRegistry::new())
            .config_path(&path)
            .run_from(["bookshelf", "status"])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}

mod database;

pub use database::DatabaseConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, StepwiseError};

/// Root configuration for stepwise.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepwiseConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Migration behaviour.
    #[serde(default)]
    pub migrations: MigrationsConfig,

    /// Model generation settings.
    #[serde(default)]
    pub codegen: CodegenConfig,
}

impl StepwiseConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| StepwiseError::Config(format!("Failed to read config file: {}", e)))?;

        Self::parse_toml(&content)
    }

    /// Load configuration from a file if it exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content)?;

        toml::from_str(&content)
            .map_err(|e| StepwiseError::Config(format!("Failed to parse config: {}", e)))
    }
}

/// Migration behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationsConfig {
    /// Refuse to run when the history references ids missing from the registry.
    #[serde(default = "default_strict")]
    pub strict: bool,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            strict: default_strict(),
        }
    }
}

fn default_strict() -> bool {
    true
}

/// Model generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Output directory for generated models.
    pub out: Option<String>,
}

/// Substitute environment variables in the format ${VAR_NAME}.
///
/// Unset variables are left untouched.
fn substitute_env_vars(content: &str) -> Result<String> {
    let mut result = content.to_string();
    let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| StepwiseError::Config(e.to_string()))?;

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(&cap[0], &value);
        }
    }

    Ok(result)
}

use thiserror::Error;

/// Core error type for stepwise operations.
#[derive(Error, Debug)]
pub enum StepwiseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    /// The history table could not be created or read.
    #[error("Migration history setup failed: {0}")]
    SchemaSetup(String),

    /// A history record could not be written or removed.
    #[error("Migration history error: {0}")]
    History(String),

    #[error("Migration '{id}' failed to apply: {source}")]
    ForwardAction {
        id: String,
        #[source]
        source: Box<StepwiseError>,
    },

    #[error("Migration '{id}' failed to roll back: {source}")]
    ReverseAction {
        id: String,
        #[source]
        source: Box<StepwiseError>,
    },

    #[error("No applied migration to roll back")]
    NoAppliedMigration,

    #[error("Applied migrations missing from the registry: {}", .0.join(", "))]
    UnknownAppliedMigration(Vec<String>),

    #[error("Migration '{0}' is not in the registry")]
    UnknownMigration(String),

    #[error("Migration '{0}' is not applied")]
    NotApplied(String),

    #[error("Duplicate migration id: {0}")]
    DuplicateMigrationId(String),

    #[error("Invalid migration id: {0}")]
    InvalidMigrationId(String),

    #[error("Migration '{0}' has no rollback action")]
    RollbackImpossible(String),

    #[error("Code generation error: {0}")]
    Codegen(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

impl StepwiseError {
    /// Wrap an error raised by a migration's forward action.
    pub fn forward(id: impl Into<String>, source: StepwiseError) -> Self {
        StepwiseError::ForwardAction {
            id: id.into(),
            source: Box::new(source),
        }
    }

    /// Wrap an error raised by a migration's reverse action.
    pub fn reverse(id: impl Into<String>, source: StepwiseError) -> Self {
        StepwiseError::ReverseAction {
            id: id.into(),
            source: Box::new(source),
        }
    }
}

/// Result type alias using StepwiseError.
pub type Result<T> = std::result::Result<T, StepwiseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_applied_lists_ids() {
        let err = StepwiseError::UnknownAppliedMigration(vec!["a".into(), "b".into()]);
        assert_eq!(
            err.to_string(),
            "Applied migrations missing from the registry: a, b"
        );
    }

    #[test]
    fn test_forward_error_keeps_source() {
        let err = StepwiseError::forward("0001_users", StepwiseError::Database("boom".into()));
        assert!(err.to_string().contains("0001_users"));
        assert!(err.to_string().contains("boom"));
        assert!(std::error::Error::source(&err).is_some());
    }
}

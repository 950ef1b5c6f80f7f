//! Rust model generation from a live database schema.

pub mod models;
pub mod naming;

pub use models::ModelGenerator;

use stepwise_core::StepwiseError;

/// Code generation error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("refusing to generate into {0:?}")]
    InvalidOutputDir(String),
}

impl From<Error> for StepwiseError {
    fn from(e: Error) -> Self {
        StepwiseError::Codegen(e.to_string())
    }
}

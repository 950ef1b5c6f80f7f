use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::{Result, StepwiseError};

/// Maximum length of a migration id (size of the history `id` column).
pub const MAX_ID_LEN: usize = 255;

/// Type alias for a boxed forward or reverse migration action.
///
/// The action borrows the database handle for the duration of its future.
pub type MigrationAction<H> =
    Arc<dyn for<'a> Fn(&'a H) -> BoxFuture<'a, Result<()>> + Send + Sync>;

/// A single named, reversible schema change.
///
/// ```ignore
/// let users = Migration::new(
///     "20251107100000_create_users",
///     |db: &PgPool| Box::pin(async move {
///         sqlx::query("CREATE TABLE users (id UUID PRIMARY KEY)").execute(db).await?;
///         Ok(())
///     }),
///     |db: &PgPool| Box::pin(async move { drop_tables(db, &["users"]).await }),
/// );
/// ```
pub struct Migration<H> {
    id: String,
    up: MigrationAction<H>,
    down: Option<MigrationAction<H>>,
}

impl<H> Migration<H> {
    /// Create a migration with both a forward and a reverse action.
    pub fn new<U, D>(id: impl Into<String>, up: U, down: D) -> Self
    where
        U: for<'a> Fn(&'a H) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
        D: for<'a> Fn(&'a H) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            up: Arc::new(up),
            down: Some(Arc::new(down)),
        }
    }

    /// Create a migration that cannot be rolled back.
    pub fn irreversible<U>(id: impl Into<String>, up: U) -> Self
    where
        U: for<'a> Fn(&'a H) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            up: Arc::new(up),
            down: None,
        }
    }

    /// The caller-assigned identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether a reverse action exists.
    pub fn is_reversible(&self) -> bool {
        self.down.is_some()
    }

    /// Run the forward action.
    pub fn apply<'a>(&'a self, handle: &'a H) -> BoxFuture<'a, Result<()>> {
        (self.up)(handle)
    }

    /// Run the reverse action.
    pub fn revert<'a>(&'a self, handle: &'a H) -> BoxFuture<'a, Result<()>> {
        match &self.down {
            Some(down) => down(handle),
            None => {
                let id = self.id.clone();
                Box::pin(async move { Err(StepwiseError::RollbackImpossible(id)) })
            }
        }
    }
}

impl<H> Clone for Migration<H> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            up: self.up.clone(),
            down: self.down.clone(),
        }
    }
}

impl<H> fmt::Debug for Migration<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("id", &self.id)
            .field("reversible", &self.is_reversible())
            .finish()
    }
}

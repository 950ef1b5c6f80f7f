mod definition;
mod registry;

pub use definition::{Migration, MigrationAction, MAX_ID_LEN};
pub use registry::MigrationRegistry;

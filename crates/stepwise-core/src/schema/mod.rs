mod table;
mod types;

pub use table::{ColumnSchema, TableSchema};
pub use types::{RustType, SqlType};

pub mod admin;
mod introspect;
mod pool;

pub use admin::{create_database, delete_database, drop_tables, quote_ident, DatabaseChange};
pub use introspect::introspect_tables;
pub use pool::Database;

//! Rust model structs from introspected tables.

use std::fmt::Write as _;
use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use stepwise_core::schema::{ColumnSchema, TableSchema};

use crate::naming::{escape_keyword, field_name, to_pascal_case, to_snake_ident};
use crate::Error;

/// Files that mark a project root rather than a models directory.
const PROJECT_MARKERS: &[&str] = &["Cargo.toml", ".git"];

/// Writes one model file per table plus a `mod.rs`.
pub struct ModelGenerator {
    output_dir: PathBuf,
}

impl ModelGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Replace the output directory's contents with models for `tables`.
    ///
    /// Returns the written paths, `mod.rs` last.
    pub fn generate(&self, tables: &[TableSchema]) -> Result<Vec<PathBuf>, Error> {
        self.check_output_dir()?;

        if self.output_dir.exists() {
            debug!("Clearing {}", self.output_dir.display());
            fs::remove_dir_all(&self.output_dir)?;
        }
        fs::create_dir_all(&self.output_dir)?;

        let generated_at = Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        let mut modules = Vec::with_capacity(tables.len());
        let mut written = Vec::with_capacity(tables.len() + 1);

        for table in tables {
            let module = escape_keyword(&to_snake_ident(&table.name));
            let path = self
                .output_dir
                .join(format!("{}.rs", module.trim_start_matches("r#")));

            fs::write(&path, render_model(table, &generated_at))?;
            modules.push((module, to_pascal_case(&table.name)));
            written.push(path);
        }

        let mod_path = self.output_dir.join("mod.rs");
        fs::write(&mod_path, render_mod(&modules, &generated_at))?;
        written.push(mod_path);

        info!(
            "Generated {} models in {}",
            tables.len(),
            self.output_dir.display()
        );
        Ok(written)
    }

    /// The directory is wiped before writing. Refused: paths with `..` or
    /// without a named component, the working directory and its ancestors,
    /// and directories holding a `Cargo.toml` or `.git`.
    fn check_output_dir(&self) -> Result<(), Error> {
        let refuse = || Error::InvalidOutputDir(self.output_dir.display().to_string());

        if self.output_dir.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(refuse());
        }

        let mut named = false;
        for component in self.output_dir.components() {
            match component {
                Component::ParentDir => return Err(refuse()),
                Component::Normal(_) => named = true,
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }
        if !named {
            return Err(refuse());
        }

        if self.output_dir.exists() {
            let target = fs::canonicalize(&self.output_dir)?;
            let cwd = fs::canonicalize(std::env::current_dir()?)?;
            if cwd.starts_with(&target) {
                return Err(refuse());
            }
            if PROJECT_MARKERS.iter().any(|marker| target.join(marker).exists()) {
                return Err(refuse());
            }
        }
        Ok(())
    }
}

fn header(generated_at: &str) -> String {
    format!(
        "// Code generated by stepwise. DO NOT EDIT.\n// Generated at {}\n\n",
        generated_at
    )
}

fn render_model(table: &TableSchema, generated_at: &str) -> String {
    let struct_name = to_pascal_case(&table.name);
    let mut out = header(generated_at);

    let _ = writeln!(out, "/// Row of the `{}` table.", table.name);
    out.push_str(
        "#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, sqlx::FromRow)]\n",
    );
    let _ = writeln!(out, "pub struct {} {{", struct_name);
    for column in &table.columns {
        render_field(&mut out, column);
    }
    out.push_str("}\n\n");

    let _ = writeln!(out, "impl {} {{", struct_name);
    let _ = writeln!(out, "    pub const TABLE: &'static str = {:?};", table.name);
    out.push_str("}\n");
    out
}

fn render_field(out: &mut String, column: &ColumnSchema) {
    let (name, renamed) = field_name(&column.name);
    if renamed {
        let _ = writeln!(out, "    #[serde(rename = {:?})]", column.name);
        let _ = writeln!(out, "    #[sqlx(rename = {:?})]", column.name);
    }
    let _ = writeln!(out, "    pub {}: {},", name, column.rust_type().to_rust());
}

fn render_mod(modules: &[(String, String)], generated_at: &str) -> String {
    let mut out = header(generated_at);
    for (module, _) in modules {
        let _ = writeln!(out, "pub mod {};", module);
    }
    if !modules.is_empty() {
        out.push('\n');
    }
    for (module, struct_name) in modules {
        let _ = writeln!(out, "pub use {}::{};", module, struct_name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_core::schema::SqlType;

    fn users() -> TableSchema {
        TableSchema::new("users")
            .with_column(ColumnSchema::new("id", SqlType::Uuid).as_primary_key())
            .with_column(ColumnSchema::new("email", SqlType::Varchar(Some(255))))
            .with_column(ColumnSchema::new("type", SqlType::Text).as_nullable())
            .with_column(ColumnSchema::new("created_at", SqlType::Timestamptz).as_nullable())
    }

    #[test]
    fn test_render_model() {
        let source = render_model(&users(), "2025-01-01T00:00:00Z");

        assert!(source.starts_with("// Code generated by stepwise. DO NOT EDIT."));
        assert!(source.contains("sqlx::FromRow)]\npub struct Users {"));
        assert!(source.contains("    pub id: uuid::Uuid,\n"));
        assert!(source.contains("    pub email: String,\n"));
        assert!(source.contains("    pub r#type: Option<String>,\n"));
        assert!(source.contains("    pub created_at: Option<chrono::DateTime<chrono::Utc>>,\n"));
        assert!(source.contains("pub const TABLE: &'static str = \"users\";"));
        assert!(!source.contains("rename"));
    }

    #[test]
    fn test_render_model_renames_odd_columns() {
        let table = TableSchema::new("audit log")
            .with_column(ColumnSchema::new("Event Name", SqlType::Text));
        let source = render_model(&table, "now");

        assert!(source.contains("pub struct AuditLog {"));
        assert!(source.contains("#[serde(rename = \"Event Name\")]"));
        assert!(source.contains("#[sqlx(rename = \"Event Name\")]"));
        assert!(source.contains("pub event_name: String,"));
    }

    #[test]
    fn test_generate_writes_files_and_clears_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("models");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("stale.rs"), "// old").unwrap();

        let orders = TableSchema::new("orders")
            .with_column(ColumnSchema::new("id", SqlType::BigInt).as_primary_key());
        let written = ModelGenerator::new(&out)
            .generate(&[orders, users()])
            .unwrap();

        assert_eq!(
            written,
            vec![out.join("orders.rs"), out.join("users.rs"), out.join("mod.rs")]
        );
        assert!(!out.join("stale.rs").exists());

        let module = fs::read_to_string(out.join("mod.rs")).unwrap();
        assert!(module.contains("pub mod orders;\npub mod users;\n"));
        assert!(module.contains("pub use orders::Orders;\npub use users::Users;\n"));
    }

    #[test]
    fn test_generate_with_no_tables() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty");

        let written = ModelGenerator::new(&out).generate(&[]).unwrap();
        assert_eq!(written, vec![out.join("mod.rs")]);
    }

    #[test]
    fn test_generate_refuses_dangerous_dirs() {
        for dir in ["", ".", "/", "  ", "./", "./.", "..", "../models", "src/.."] {
            let result = ModelGenerator::new(dir).generate(&[users()]);
            assert!(
                matches!(result, Err(Error::InvalidOutputDir(_))),
                "accepted {:?}",
                dir
            );
        }
    }

    #[test]
    fn test_generate_refuses_working_directory() {
        let cwd = std::env::current_dir().unwrap();
        let result = ModelGenerator::new(&cwd).generate(&[]);
        assert!(matches!(result, Err(Error::InvalidOutputDir(_))));
        assert!(cwd.exists());
    }

    #[test]
    fn test_generate_refuses_project_root() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("app");
        fs::create_dir_all(project.join("src")).unwrap();
        fs::write(project.join("Cargo.toml"), "[package]").unwrap();
        fs::write(project.join("src/main.rs"), "fn main() {}").unwrap();

        let with_slash = format!("{}/", project.display());
        let through_parent = project.join("src").join("..");
        for out in [PathBuf::from(with_slash), through_parent] {
            let result = ModelGenerator::new(&out).generate(&[]);
            assert!(
                matches!(result, Err(Error::InvalidOutputDir(_))),
                "accepted {:?}",
                out
            );
        }

        assert!(project.join("Cargo.toml").exists());
        assert!(project.join("src/main.rs").exists());
    }
}

//! Migration scripts.
//!
//! A [`Migration`] bundles an operation list with the model it leads to.
//! [`ScriptGenerator`] turns migrations into commands, or into one SQL script
//! where transactional commands are grouped between `BEGIN TRANSACTION;` and
//! `COMMIT;`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::commands::MigrationCommand;
use crate::dialect::MigrationDialect;
use crate::error::Result;
use crate::operations::MigrationOperation;
use crate::schema::{RelationalModel, SchemaSnapshot};

/// A migration ready for SQL generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Migration {
    /// Migration identifier, e.g. `20240101000000_Initial`.
    pub id: String,
    /// Operations, in order.
    #[serde(default)]
    pub operations: Vec<MigrationOperation>,
    /// Model after the migration is applied.
    #[serde(default)]
    pub target_model: Option<RelationalModel>,
}

impl Migration {
    /// Creates an empty migration.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            operations: Vec::new(),
            target_model: None,
        }
    }

    /// Adds an operation to this migration.
    #[must_use]
    pub fn operation(mut self, operation: impl Into<MigrationOperation>) -> Self {
        self.operations.push(operation.into());
        self
    }

    /// Adds operations to this migration.
    #[must_use]
    pub fn operations(mut self, operations: Vec<MigrationOperation>) -> Self {
        self.operations.extend(operations);
        self
    }

    /// Sets the model after this migration.
    #[must_use]
    pub fn target_model(mut self, model: RelationalModel) -> Self {
        self.target_model = Some(model);
        self
    }

    /// Parses a migration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a migration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Generates SQL for migrations.
#[derive(Debug, Clone)]
pub struct ScriptGenerator<D: MigrationDialect> {
    dialect: D,
}

impl<D: MigrationDialect> ScriptGenerator<D> {
    /// Creates a generator for `dialect`.
    pub fn new(dialect: D) -> Self {
        Self { dialect }
    }

    /// Returns the dialect.
    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Generates the commands of one migration.
    pub fn sql_for(&self, migration: &Migration) -> Result<Vec<MigrationCommand>> {
        let model = migration
            .target_model
            .as_ref()
            .map(|model| model as &dyn SchemaSnapshot);
        let commands = self.dialect.generate(&migration.operations, model)?;
        info!(
            migration = %migration.id,
            dialect = self.dialect.name(),
            commands = commands.len(),
            "Generated migration"
        );
        Ok(commands)
    }

    /// Generates a script applying `migrations` in order.
    ///
    /// Each migration starts with a `-- id` line. Runs of transactional
    /// commands are wrapped in a transaction; suppressed commands are
    /// emitted between transactions.
    pub fn script(&self, migrations: &[Migration]) -> Result<String> {
        let mut script = String::new();
        for migration in migrations {
            let commands = self.sql_for(migration)?;

            script.push_str("-- ");
            script.push_str(&migration.id);
            script.push('\n');

            let mut in_transaction = false;
            for command in &commands {
                if command.transaction_suppressed && in_transaction {
                    script.push_str("COMMIT;\n\n");
                    in_transaction = false;
                } else if !command.transaction_suppressed && !in_transaction {
                    script.push_str("BEGIN TRANSACTION;\n\n");
                    in_transaction = true;
                }
                script.push_str(&command.command_text);
                script.push_str("\n\n");
            }
            if in_transaction {
                script.push_str("COMMIT;\n\n");
            }
        }
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use super::*;
    use crate::config::GeneratorOptions;
    use crate::dialect::SqliteDialect;
    use crate::logger::RecordingLogger;
    use crate::operations::{ColumnDefinition, CreateTableOperation};
    use crate::schema::{Column, Table};

    fn generator() -> ScriptGenerator<SqliteDialect> {
        ScriptGenerator::new(SqliteDialect::new().with_logger(Arc::new(RecordingLogger::new())))
    }

    #[test]
    fn test_script_wraps_transactions() {
        let migration = Migration::new("0001_Initial")
            .operation(
                CreateTableOperation::new("A")
                    .column("Id", ColumnDefinition::new("INTEGER").not_null())
                    .primary_key("PK_A", &["Id"]),
            )
            .operation(MigrationOperation::drop_table("B"));

        let script = generator().script(&[migration]).unwrap();
        assert_eq!(
            script,
            "-- 0001_Initial\nBEGIN TRANSACTION;\n\nCREATE TABLE \"A\" (\n    \"Id\" INTEGER NOT NULL CONSTRAINT \"PK_A\" PRIMARY KEY\n);\n\nDROP TABLE \"B\";\n\nCOMMIT;\n\n"
        );
    }

    #[test]
    fn test_script_commits_before_suppressed_commands() {
        let model = RelationalModel::new().table(
            Table::new("People")
                .column(Column::new("Id", "INTEGER").not_null())
                .primary_key("PK_People", &["Id"]),
        );
        let migration = Migration::new("0002_DropName")
            .operation(MigrationOperation::drop_column("People", "Name"))
            .target_model(model);

        let script = generator().script(&[migration]).unwrap();
        let pragma_off = script.find("PRAGMA foreign_keys = 0;").unwrap();
        let first_commit = script.find("COMMIT;").unwrap();
        assert!(first_commit < pragma_off);
        assert_eq!(script.matches("BEGIN TRANSACTION;").count(), 2);
        assert!(script.trim_end().ends_with("PRAGMA foreign_keys = 1;"));
    }

    #[test]
    fn test_script_without_transactions() {
        let dialect = SqliteDialect::new()
            .with_logger(Arc::new(RecordingLogger::new()))
            .with_options(GeneratorOptions::new().no_transactions());
        let migration = Migration::new("0003").operation(MigrationOperation::drop_table("A"));

        let script = ScriptGenerator::new(dialect).script(&[migration]).unwrap();
        assert_eq!(script, "-- 0003\nDROP TABLE \"A\";\n\n");
    }

    #[test]
    fn test_migration_from_path() {
        let migration = Migration::new("0001")
            .operation(MigrationOperation::rename_table("A", "B"))
            .target_model(RelationalModel::new().table(Table::new("B")));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&migration).unwrap().as_bytes())
            .unwrap();

        assert_eq!(Migration::from_path(file.path()).unwrap(), migration);
    }
}

#![allow(dead_code)]

use std::sync::Arc;

use sqlite_migrations::annotations::AUTOINCREMENT;
use sqlite_migrations::prelude::*;

/// A dialect recording its diagnostics.
pub fn dialect() -> (SqliteDialect, Arc<RecordingLogger>) {
    let logger = Arc::new(RecordingLogger::new());
    (SqliteDialect::new().with_logger(logger.clone()), logger)
}

/// `"Id" INTEGER NOT NULL` flagged as autoincrement.
pub fn id_column() -> Column {
    Column::new("Id", "INTEGER")
        .not_null()
        .annotations(Annotations::new().with(AUTOINCREMENT, true))
}

/// The `People` table with an autoincrement `Id` key followed by `columns`.
pub fn people(columns: Vec<Column>) -> Table {
    let mut table = Table::new("People")
        .column(id_column())
        .primary_key("PK_People", &["Id"]);
    for column in columns {
        table = table.column(column);
    }
    table
}

pub fn model(tables: Vec<Table>) -> RelationalModel {
    tables.into_iter().fold(RelationalModel::new(), RelationalModel::table)
}

pub fn sql(operations: &[MigrationOperation], model: Option<&RelationalModel>) -> Vec<String> {
    let (dialect, _) = dialect();
    dialect
        .generate(operations, model.map(|m| m as &dyn SchemaSnapshot))
        .unwrap_or_else(|e| panic!("Failed to generate SQL: {e}"))
        .into_iter()
        .map(|command| command.command_text)
        .collect()
}

pub fn assert_sql(
    operations: &[MigrationOperation],
    model: Option<&RelationalModel>,
    expected: &[&str],
) {
    let actual = sql(operations, model);
    assert_eq!(actual, expected, "\nGenerated:\n{}", actual.join("\n\n"));
}

/// The swap tail of a single `People` rebuild.
pub const PEOPLE_SWAP: [&str; 4] = [
    "PRAGMA foreign_keys = 0;",
    "DROP TABLE \"People\";",
    "ALTER TABLE \"ef_temp_People\" RENAME TO \"People\";",
    "PRAGMA foreign_keys = 1;",
];

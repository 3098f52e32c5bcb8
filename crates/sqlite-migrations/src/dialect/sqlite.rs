//! SQLite dialect for migrations.
//!
//! SQLite has limited ALTER TABLE support, so most structural changes are
//! first rewritten into table rebuilds by [`RebuildPlanner`]. Operations that
//! still reach the generator afterwards cannot be expressed and are rejected.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::MigrationDialect;
use crate::commands::{MigrationCommand, MigrationCommandListBuilder};
use crate::config::GeneratorOptions;
use crate::error::{MigrateError, Result};
use crate::logger::{MigrationsLogger, TracingLogger};
use crate::operations::{
    AddColumnOperation, AddForeignKeyOperation, AddPrimaryKeyOperation, AlterDatabaseOperation,
    ColumnDefinition, CreateIndexOperation, CreateTableOperation, DeleteDataOperation,
    InsertDataOperation, MigrationOperation, RenameTableOperation, UpdateDataOperation,
};
use crate::rebuild::RebuildPlanner;
use crate::schema::{ReferentialAction, SchemaSnapshot};
use crate::value::{TypeMapping, Value};

/// SpatiaLite geometry types, without their dimension suffix.
const SPATIAL_TYPES: [&str; 8] = [
    "GEOMETRY",
    "POINT",
    "LINESTRING",
    "POLYGON",
    "MULTIPOINT",
    "MULTILINESTRING",
    "MULTIPOLYGON",
    "GEOMETRYCOLLECTION",
];

/// SQLite migration dialect.
#[derive(Clone)]
pub struct SqliteDialect {
    options: GeneratorOptions,
    logger: Arc<dyn MigrationsLogger>,
}

impl fmt::Debug for SqliteDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteDialect")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for SqliteDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqliteDialect {
    /// Creates a new SQLite dialect reporting diagnostics through `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: GeneratorOptions::default(),
            logger: Arc::new(TracingLogger),
        }
    }

    /// Sets the generator options.
    #[must_use]
    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the diagnostics logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn MigrationsLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Returns the generator options.
    #[must_use]
    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn end_command(&self, builder: &mut MigrationCommandListBuilder, suppress_transaction: bool) {
        builder.end_command(suppress_transaction || self.options.no_transactions);
    }

    /// Generates a column definition, e.g. `"Name" TEXT NOT NULL DEFAULT ''`.
    fn column_definition(&self, name: &str, column: &ColumnDefinition) -> String {
        let mut sql = self.quote_identifier(name);

        if let Some(computed) = &column.computed_column_sql {
            sql.push_str(" AS (");
            sql.push_str(computed);
            sql.push(')');
            if column.is_stored == Some(true) {
                sql.push_str(" STORED");
            }
            if let Some(collation) = &column.collation {
                sql.push_str(" COLLATE ");
                sql.push_str(collation);
            }
            return sql;
        }

        if let Some(column_type) = &column.column_type {
            sql.push(' ');
            sql.push_str(column_type);
        }
        if let Some(collation) = &column.collation {
            sql.push_str(" COLLATE ");
            sql.push_str(collation);
        }
        sql.push_str(if column.is_nullable {
            " NULL"
        } else {
            " NOT NULL"
        });

        if let Some(default_sql) = &column.default_value_sql {
            sql.push_str(" DEFAULT (");
            sql.push_str(default_sql);
            sql.push(')');
        } else if let Some(value) = column.default_value.as_ref().filter(|v| !v.is_null()) {
            let mapping = TypeMapping::for_store_type(column.column_type.as_deref());
            sql.push_str(" DEFAULT ");
            sql.push_str(&mapping.generate_sql_literal(value));
        }

        if column.annotations.inline_primary_key == Some(true) {
            if let Some(pk_name) = &column.annotations.inline_primary_key_name {
                sql.push_str(" CONSTRAINT ");
                sql.push_str(&self.quote_identifier(pk_name));
            }
            sql.push_str(" PRIMARY KEY");
            if column.annotations.is_autoincrement() {
                sql.push_str(" AUTOINCREMENT");
            }
        }

        sql
    }

    fn column_list(&self, columns: &[String]) -> String {
        let quoted: Vec<String> = columns.iter().map(|c| self.quote_identifier(c)).collect();
        quoted.join(", ")
    }

    fn constraint_prefix(&self, name: Option<&str>) -> String {
        name.map(|n| format!("CONSTRAINT {} ", self.quote_identifier(n)))
            .unwrap_or_default()
    }

    fn primary_key_constraint(&self, pk: &AddPrimaryKeyOperation) -> String {
        format!(
            "{}PRIMARY KEY ({})",
            self.constraint_prefix(pk.name.as_deref()),
            self.column_list(&pk.columns)
        )
    }

    fn foreign_key_constraint(&self, fk: &AddForeignKeyOperation) -> String {
        let mut sql = format!(
            "{}FOREIGN KEY ({}) REFERENCES {}",
            self.constraint_prefix(Some(&fk.name)),
            self.column_list(&fk.columns),
            self.quote_identifier(&fk.principal_table)
        );
        if !fk.principal_columns.is_empty() {
            sql.push_str(" (");
            sql.push_str(&self.column_list(&fk.principal_columns));
            sql.push(')');
        }
        if fk.on_update != ReferentialAction::NoAction {
            sql.push_str(" ON UPDATE ");
            sql.push_str(fk.on_update.to_sql());
        }
        if fk.on_delete != ReferentialAction::NoAction {
            sql.push_str(" ON DELETE ");
            sql.push_str(fk.on_delete.to_sql());
        }
        sql
    }

    fn append_comment(builder: &mut MigrationCommandListBuilder, comment: &str) {
        for line in comment.lines() {
            if line.is_empty() {
                builder.append_line("    --");
            } else {
                builder.append("    -- ").append_line(line);
            }
        }
    }

    /// Generates `CREATE TABLE`.
    ///
    /// A single-column primary key is declared inline so that an integer key
    /// becomes the rowid alias. Spatial columns cannot be declared inline and
    /// are added with `AddGeometryColumn` in the same command.
    fn create_table(&self, op: &CreateTableOperation, builder: &mut MigrationCommandListBuilder) {
        let mut columns: Vec<AddColumnOperation> = Vec::with_capacity(op.columns.len());
        let mut spatial: Vec<&AddColumnOperation> = Vec::new();
        for column in &op.columns {
            if is_spatial_type(column.column.column_type.as_deref()) {
                spatial.push(column);
            } else {
                columns.push(column.clone());
            }
        }

        let mut primary_key = op.primary_key.as_ref();
        if let Some(pk) = primary_key.filter(|pk| pk.columns.len() == 1) {
            if let Some(column) = columns.iter_mut().find(|c| c.name == pk.columns[0]) {
                column.column.annotations.inline_primary_key = Some(true);
                column
                    .column
                    .annotations
                    .inline_primary_key_name
                    .clone_from(&pk.name);
                primary_key = None;
            }
        }

        let mut constraints: Vec<String> = Vec::new();
        if let Some(pk) = primary_key {
            constraints.push(self.primary_key_constraint(pk));
        }
        for unique in &op.unique_constraints {
            constraints.push(format!(
                "{}UNIQUE ({})",
                self.constraint_prefix(Some(&unique.name)),
                self.column_list(&unique.columns)
            ));
        }
        for check in &op.check_constraints {
            constraints.push(format!(
                "{}CHECK ({})",
                self.constraint_prefix(Some(&check.name)),
                check.sql
            ));
        }
        for fk in &op.foreign_keys {
            constraints.push(self.foreign_key_constraint(fk));
        }

        builder
            .append("CREATE TABLE ")
            .append(&self.quote_identifier(&op.name))
            .append_line(" (");

        if let Some(comment) = &op.comment {
            Self::append_comment(builder, comment);
            builder.append_line("");
        }

        let column_comments = columns.iter().any(|c| c.column.comment.is_some());
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                builder.append_line(",");
                if column_comments {
                    builder.append_line("");
                }
            }
            if let Some(comment) = &column.column.comment {
                Self::append_comment(builder, comment);
            }
            builder
                .append("    ")
                .append(&self.column_definition(&column.name, &column.column));
        }

        for (i, constraint) in constraints.iter().enumerate() {
            if i > 0 || !columns.is_empty() {
                builder.append_line(",");
            }
            builder.append("    ").append(constraint);
        }
        builder.append_line("").append_line(");");

        if spatial.is_empty() {
            self.end_command(builder, false);
            return;
        }
        for column in spatial {
            self.add_geometry_column(&op.name, column, builder);
        }
        self.end_command(builder, false);
    }

    /// Generates `ALTER TABLE ... ADD`, or `AddGeometryColumn` for spatial
    /// columns.
    fn add_column(&self, op: &AddColumnOperation, builder: &mut MigrationCommandListBuilder) {
        if is_spatial_type(op.column.column_type.as_deref()) {
            debug_assert!(
                builder.is_empty(),
                "AddGeometryColumn cannot be composed with other DDL in one command"
            );
            self.add_geometry_column(&op.table, op, builder);
            self.end_command(builder, false);
            return;
        }

        builder
            .append("ALTER TABLE ")
            .append(&self.quote_identifier(&op.table))
            .append(" ADD ")
            .append(&self.column_definition(&op.name, &op.column))
            .append_line(";");
        self.end_command(builder, false);
    }

    fn add_geometry_column(
        &self,
        table: &str,
        op: &AddColumnOperation,
        builder: &mut MigrationCommandListBuilder,
    ) {
        let text = TypeMapping::for_store_type(Some("TEXT"));
        let geometry_type = normalize_spatial_type(op.column.column_type.as_deref().unwrap_or_default());
        let srid = op.column.annotations.srid.unwrap_or(0);

        builder
            .append("SELECT AddGeometryColumn(")
            .append(&text.generate_sql_literal(&Value::from(table)))
            .append(", ")
            .append(&text.generate_sql_literal(&Value::from(op.name.as_str())))
            .append(", ")
            .append(&srid.to_string())
            .append(", ")
            .append(&text.generate_sql_literal(&Value::from(geometry_type)))
            .append(", -1, ")
            .append(if op.column.is_nullable { "0" } else { "1" })
            .append_line(");");
    }

    fn rename_table(&self, op: &RenameTableOperation, builder: &mut MigrationCommandListBuilder) {
        let Some(new_name) = op.new_name.as_ref().filter(|n| **n != op.name) else {
            return;
        };
        builder
            .append("ALTER TABLE ")
            .append(&self.quote_identifier(&op.name))
            .append(" RENAME TO ")
            .append(&self.quote_identifier(new_name))
            .append_line(";");
        self.end_command(builder, false);
    }

    fn create_index(&self, op: &CreateIndexOperation, builder: &mut MigrationCommandListBuilder) {
        builder.append("CREATE ");
        if op.is_unique {
            builder.append("UNIQUE ");
        }
        builder
            .append("INDEX ")
            .append(&self.quote_identifier(&op.name))
            .append(" ON ")
            .append(&self.quote_identifier(&op.table))
            .append(" (")
            .append(&self.column_list(&op.columns))
            .append(")");
        if let Some(filter) = &op.filter {
            builder.append(" WHERE ").append(filter);
        }
        builder.append_line(";");
        self.end_command(builder, false);
    }

    /// Literal renderers for `columns`: explicit types first, then the model.
    fn type_mappings(
        columns: &[String],
        column_types: Option<&[String]>,
        table: &str,
        schema: Option<&str>,
        model: Option<&dyn SchemaSnapshot>,
    ) -> Vec<TypeMapping> {
        let snapshot_table = model.and_then(|m| m.find_table(table, schema));
        columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let store_type = column_types
                    .and_then(|types| types.get(i))
                    .map(String::as_str)
                    .or_else(|| {
                        snapshot_table
                            .and_then(|t| t.get_column(column))
                            .and_then(|c| c.store_type.as_deref())
                    });
                TypeMapping::for_store_type(store_type)
            })
            .collect()
    }

    fn key_condition(
        &self,
        table: &str,
        key_columns: &[String],
        key_values: &[Value],
        mappings: &[TypeMapping],
    ) -> Result<String> {
        check_arity(table, "key", key_columns.len(), key_values.len())?;
        let conditions: Vec<String> = key_columns
            .iter()
            .zip(key_values)
            .zip(mappings)
            .map(|((column, value), mapping)| {
                if value.is_null() {
                    format!("{} IS NULL", self.quote_identifier(column))
                } else {
                    format!(
                        "{} = {}",
                        self.quote_identifier(column),
                        mapping.generate_sql_literal(value)
                    )
                }
            })
            .collect();
        Ok(conditions.join(" AND "))
    }

    fn insert_data(
        &self,
        op: &InsertDataOperation,
        model: Option<&dyn SchemaSnapshot>,
        builder: &mut MigrationCommandListBuilder,
    ) -> Result<()> {
        let mappings = Self::type_mappings(
            &op.columns,
            op.column_types.as_deref(),
            &op.table,
            op.schema.as_deref(),
            model,
        );
        for row in &op.values {
            check_arity(&op.table, "value", op.columns.len(), row.len())?;
            let literals: Vec<String> = row
                .iter()
                .zip(&mappings)
                .map(|(value, mapping)| mapping.generate_sql_literal(value))
                .collect();
            builder
                .append("INSERT INTO ")
                .append(&self.quote_identifier(&op.table))
                .append(" (")
                .append(&self.column_list(&op.columns))
                .append_line(")")
                .append("VALUES (")
                .append(&literals.join(", "))
                .append_line(");");
            self.end_command(builder, false);
        }
        Ok(())
    }

    fn update_data(
        &self,
        op: &UpdateDataOperation,
        model: Option<&dyn SchemaSnapshot>,
        builder: &mut MigrationCommandListBuilder,
    ) -> Result<()> {
        check_arity(&op.table, "row", op.key_values.len(), op.values.len())?;
        let key_mappings = Self::type_mappings(
            &op.key_columns,
            None,
            &op.table,
            op.schema.as_deref(),
            model,
        );
        let mappings =
            Self::type_mappings(&op.columns, None, &op.table, op.schema.as_deref(), model);

        for (keys, row) in op.key_values.iter().zip(&op.values) {
            check_arity(&op.table, "value", op.columns.len(), row.len())?;
            let assignments: Vec<String> = op
                .columns
                .iter()
                .zip(row)
                .zip(&mappings)
                .map(|((column, value), mapping)| {
                    format!(
                        "{} = {}",
                        self.quote_identifier(column),
                        mapping.generate_sql_literal(value)
                    )
                })
                .collect();
            let condition = self.key_condition(&op.table, &op.key_columns, keys, &key_mappings)?;
            builder
                .append("UPDATE ")
                .append(&self.quote_identifier(&op.table))
                .append(" SET ")
                .append_line(&assignments.join(", "))
                .append("WHERE ")
                .append(&condition)
                .append_line(";");
            self.end_command(builder, false);
        }
        Ok(())
    }

    fn delete_data(
        &self,
        op: &DeleteDataOperation,
        model: Option<&dyn SchemaSnapshot>,
        builder: &mut MigrationCommandListBuilder,
    ) -> Result<()> {
        let key_mappings = Self::type_mappings(
            &op.key_columns,
            None,
            &op.table,
            op.schema.as_deref(),
            model,
        );
        for keys in &op.key_values {
            let condition = self.key_condition(&op.table, &op.key_columns, keys, &key_mappings)?;
            builder
                .append("DELETE FROM ")
                .append_line(&self.quote_identifier(&op.table))
                .append("WHERE ")
                .append(&condition)
                .append_line(";");
            self.end_command(builder, false);
        }
        Ok(())
    }

    /// `InitSpatialMetaData` runs only when spatial metadata gets enabled.
    fn alter_database(&self, op: &AlterDatabaseOperation, builder: &mut MigrationCommandListBuilder) {
        let enabled = op.annotations.init_spatial_metadata == Some(true);
        let was_enabled = op.old_annotations.init_spatial_metadata == Some(true);
        if enabled && !was_enabled {
            builder.append_line("SELECT InitSpatialMetaData();");
            self.end_command(builder, false);
        }
    }
}

impl MigrationDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn generate(
        &self,
        operations: &[MigrationOperation],
        model: Option<&dyn SchemaSnapshot>,
    ) -> Result<Vec<MigrationCommand>> {
        let planner = RebuildPlanner::new(model, self.logger.as_ref())
            .with_temp_table_prefix(self.options.temp_table_prefix.clone());
        let operations = planner.rewrite(operations.to_vec());

        let mut builder = MigrationCommandListBuilder::new();
        for operation in &operations {
            self.generate_operation(operation, model, &mut builder)?;
        }

        let commands = builder.into_commands();
        for command in &commands {
            debug!(
                sql = %command.command_text,
                suppressed = command.transaction_suppressed,
                "Generated migration command"
            );
        }
        Ok(commands)
    }

    fn generate_operation(
        &self,
        operation: &MigrationOperation,
        model: Option<&dyn SchemaSnapshot>,
        builder: &mut MigrationCommandListBuilder,
    ) -> Result<()> {
        match operation {
            MigrationOperation::CreateTable(op) => self.create_table(op, builder),

            MigrationOperation::AddColumn(op) => self.add_column(op, builder),

            MigrationOperation::DropTable(op) => {
                builder
                    .append("DROP TABLE ")
                    .append(&self.quote_identifier(&op.name))
                    .append_line(";");
                self.end_command(builder, false);
            }

            MigrationOperation::RenameTable(op) => self.rename_table(op, builder),

            MigrationOperation::RenameColumn(op) => {
                builder
                    .append("ALTER TABLE ")
                    .append(&self.quote_identifier(&op.table))
                    .append(" RENAME COLUMN ")
                    .append(&self.quote_identifier(&op.name))
                    .append(" TO ")
                    .append(&self.quote_identifier(&op.new_name))
                    .append_line(";");
                self.end_command(builder, false);
            }

            MigrationOperation::CreateIndex(op) => self.create_index(op, builder),

            MigrationOperation::DropIndex(op) => {
                builder
                    .append("DROP INDEX ")
                    .append(&self.quote_identifier(&op.name))
                    .append_line(";");
                self.end_command(builder, false);
            }

            MigrationOperation::InsertData(op) => self.insert_data(op, model, builder)?,
            MigrationOperation::UpdateData(op) => self.update_data(op, model, builder)?,
            MigrationOperation::DeleteData(op) => self.delete_data(op, model, builder)?,

            MigrationOperation::Sql(op) => {
                builder.append_line(&op.sql);
                self.end_command(builder, op.suppress_transaction);
            }

            MigrationOperation::AlterDatabase(op) => self.alter_database(op, builder),

            // SQLite has no schemas; table metadata changes only matter
            // through a rebuild.
            MigrationOperation::EnsureSchema(_)
            | MigrationOperation::DropSchema(_)
            | MigrationOperation::AlterTable(_) => {}

            MigrationOperation::RenameIndex(_) => {
                return Err(MigrateError::UnsupportedFeature {
                    feature: "renaming indexes",
                    operation: operation.kind(),
                });
            }

            MigrationOperation::CreateSequence(_)
            | MigrationOperation::AlterSequence(_)
            | MigrationOperation::DropSequence(_)
            | MigrationOperation::RenameSequence(_)
            | MigrationOperation::RestartSequence(_) => {
                return Err(MigrateError::UnsupportedFeature {
                    feature: "sequences",
                    operation: operation.kind(),
                });
            }

            MigrationOperation::AddForeignKey(_)
            | MigrationOperation::AddPrimaryKey(_)
            | MigrationOperation::AddUniqueConstraint(_)
            | MigrationOperation::AddCheckConstraint(_)
            | MigrationOperation::DropColumn(_)
            | MigrationOperation::DropForeignKey(_)
            | MigrationOperation::DropPrimaryKey(_)
            | MigrationOperation::DropUniqueConstraint(_)
            | MigrationOperation::DropCheckConstraint(_)
            | MigrationOperation::AlterColumn(_) => {
                return Err(MigrateError::UnsupportedOperation {
                    operation: operation.kind(),
                });
            }
        }
        Ok(())
    }
}

/// Uppercases a store type and removes its whitespace, e.g. `point z`
/// becomes `POINTZ`.
fn normalize_spatial_type(column_type: &str) -> String {
    column_type
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Returns true for SpatiaLite geometry types, with an optional `Z`, `M` or
/// `ZM` dimension suffix.
fn is_spatial_type(column_type: Option<&str>) -> bool {
    let Some(column_type) = column_type else {
        return false;
    };
    let normalized = normalize_spatial_type(column_type);
    let base = normalized
        .strip_suffix("ZM")
        .or_else(|| normalized.strip_suffix('Z'))
        .or_else(|| normalized.strip_suffix('M'))
        .unwrap_or(&normalized);
    SPATIAL_TYPES.contains(&base) || SPATIAL_TYPES.contains(&normalized.as_str())
}

fn check_arity(table: &str, what: &str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(MigrateError::InvalidOperation(format!(
            "data operation on table '{table}' has {actual} {what} entries, expected {expected}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{Annotations, AUTOINCREMENT, INIT_SPATIAL_METADATA, SRID};
    use crate::logger::RecordingLogger;
    use crate::operations::{DropIndexOperation, EnsureSchemaOperation, SqlOperation};
    use crate::schema::{foreign_key, Column, RelationalModel, Table};

    fn dialect() -> SqliteDialect {
        SqliteDialect::new().with_logger(Arc::new(RecordingLogger::new()))
    }

    fn sql(operation: MigrationOperation) -> Vec<String> {
        dialect()
            .generate(&[operation], None)
            .unwrap()
            .into_iter()
            .map(|c| c.command_text)
            .collect()
    }

    fn id_column() -> ColumnDefinition {
        ColumnDefinition::new("INTEGER")
            .not_null()
            .annotations(Annotations::new().with(AUTOINCREMENT, true))
    }

    #[test]
    fn test_create_table_inlines_single_column_primary_key() {
        let op = CreateTableOperation::new("People")
            .column("Id", id_column())
            .column("Name", ColumnDefinition::new("TEXT"))
            .primary_key("PK_People", &["Id"]);

        assert_eq!(
            sql(op.into()),
            ["CREATE TABLE \"People\" (\n    \"Id\" INTEGER NOT NULL CONSTRAINT \"PK_People\" PRIMARY KEY AUTOINCREMENT,\n    \"Name\" TEXT NULL\n);"]
        );
    }

    #[test]
    fn test_create_table_all_settings() {
        let fk = foreign_key(
            "FK_People_Employers_EmployerId",
            &["EmployerId"],
            "Employers",
            &["Id"],
        )
        .on_delete(ReferentialAction::Cascade);
        let op = CreateTableOperation::new("People")
            .comment("Table comment")
            .column("CustomId", id_column())
            .column(
                "EmployerId",
                ColumnDefinition::new("INTEGER")
                    .not_null()
                    .comment("Employer ID comment"),
            )
            .column(
                "SSN",
                ColumnDefinition::new("TEXT").not_null().collation("NOCASE"),
            )
            .primary_key("PK_People", &["CustomId"])
            .unique_constraint("AK_People_SSN", &["SSN"])
            .check_constraint("CK_People_EmployerId", "\"EmployerId\" > 0")
            .foreign_key(&fk);

        let expected = r#"CREATE TABLE "People" (
    -- Table comment

    "CustomId" INTEGER NOT NULL CONSTRAINT "PK_People" PRIMARY KEY AUTOINCREMENT,

    -- Employer ID comment
    "EmployerId" INTEGER NOT NULL,

    "SSN" TEXT COLLATE NOCASE NOT NULL,
    CONSTRAINT "AK_People_SSN" UNIQUE ("SSN"),
    CONSTRAINT "CK_People_EmployerId" CHECK ("EmployerId" > 0),
    CONSTRAINT "FK_People_Employers_EmployerId" FOREIGN KEY ("EmployerId") REFERENCES "Employers" ("Id") ON DELETE CASCADE
);"#;
        assert_eq!(sql(op.into()), [expected]);
    }

    #[test]
    fn test_create_table_composite_primary_key() {
        let op = CreateTableOperation::new("Foo")
            .column("SomeField1", ColumnDefinition::new("INTEGER").not_null())
            .column("SomeField2", ColumnDefinition::new("INTEGER").not_null())
            .primary_key("PK_Foo", &["SomeField1", "SomeField2"]);

        let statements = sql(op.into());
        assert!(statements[0].ends_with(
            "    CONSTRAINT \"PK_Foo\" PRIMARY KEY (\"SomeField1\", \"SomeField2\")\n);"
        ));
        assert!(!statements[0].contains("NOT NULL CONSTRAINT"));
    }

    #[test]
    fn test_computed_columns() {
        let op = CreateTableOperation::new("People")
            .column("Sum", ColumnDefinition::default().computed("\"X\" + \"Y\"", true).collation("NOCASE"))
            .column("X", ColumnDefinition::new("INTEGER").not_null());

        let statements = sql(op.into());
        assert!(statements[0].contains("    \"Sum\" AS (\"X\" + \"Y\") STORED COLLATE NOCASE,\n"));
    }

    #[test]
    fn test_add_column_defaults() {
        assert_eq!(
            sql(MigrationOperation::add_column(
                "People",
                "Name",
                ColumnDefinition::new("TEXT")
            )),
            ["ALTER TABLE \"People\" ADD \"Name\" TEXT NULL;"]
        );
        assert_eq!(
            sql(MigrationOperation::add_column(
                "People",
                "Sum",
                ColumnDefinition::new("INTEGER").not_null().default_sql("1 + 2")
            )),
            ["ALTER TABLE \"People\" ADD \"Sum\" INTEGER NOT NULL DEFAULT (1 + 2);"]
        );
        assert_eq!(
            sql(MigrationOperation::add_column(
                "People",
                "Birthday",
                ColumnDefinition::new("TEXT")
                    .not_null()
                    .default_value("2015-04-12 17:05:00")
            )),
            ["ALTER TABLE \"People\" ADD \"Birthday\" TEXT NOT NULL DEFAULT '2015-04-12 17:05:00';"]
        );
    }

    #[test]
    fn test_add_spatial_column() {
        let column = ColumnDefinition::new("POINT")
            .annotations(Annotations::new().with(SRID, 4326_i64));
        assert_eq!(
            sql(MigrationOperation::add_column("Geo", "Location", column)),
            ["SELECT AddGeometryColumn('Geo', 'Location', 4326, 'POINT', -1, 0);"]
        );
    }

    #[test]
    fn test_create_table_with_spatial_column() {
        let op = CreateTableOperation::new("Geo")
            .column("Id", id_column())
            .column("Shape", ColumnDefinition::new("polygon z").not_null())
            .primary_key("PK_Geo", &["Id"]);

        let statements = sql(op.into());
        assert_eq!(statements.len(), 1);
        assert!(!statements[0].contains("\"Shape\" "));
        assert!(statements[0]
            .ends_with(");\nSELECT AddGeometryColumn('Geo', 'Shape', 0, 'POLYGONZ', -1, 1);"));
    }

    #[test]
    fn test_spatial_type_detection() {
        assert!(is_spatial_type(Some("GEOMETRY")));
        assert!(is_spatial_type(Some("multipolygon zm")));
        assert!(is_spatial_type(Some("POINTM")));
        assert!(!is_spatial_type(Some("TEXT")));
        assert!(!is_spatial_type(None));
    }

    #[test]
    fn test_rename_operations() {
        assert_eq!(
            sql(MigrationOperation::rename_table("People", "Persons")),
            ["ALTER TABLE \"People\" RENAME TO \"Persons\";"]
        );
        assert!(sql(MigrationOperation::rename_table("People", "People")).is_empty());
        assert_eq!(
            sql(MigrationOperation::rename_column("Entity", "a", "b")),
            ["ALTER TABLE \"Entity\" RENAME COLUMN \"a\" TO \"b\";"]
        );
    }

    #[test]
    fn test_indexes() {
        let op = CreateIndexOperation::new("People", "IX_People_Name", &["Name"])
            .unique()
            .filter("\"Name\" IS NOT NULL AND \"Name\" <> ''");
        assert_eq!(
            sql(op.into()),
            ["CREATE UNIQUE INDEX \"IX_People_Name\" ON \"People\" (\"Name\") WHERE \"Name\" IS NOT NULL AND \"Name\" <> '';"]
        );

        let drop = DropIndexOperation {
            table: None,
            schema: None,
            name: "Foo".to_string(),
        };
        assert_eq!(sql(drop.into()), ["DROP INDEX \"Foo\";"]);
    }

    #[test]
    fn test_rebuild_operations_fail_without_model() {
        let err = dialect()
            .generate(&[MigrationOperation::drop_column("People", "Foo")], None)
            .unwrap_err();
        assert!(matches!(
            err,
            MigrateError::UnsupportedOperation {
                operation: "DropColumnOperation"
            }
        ));
    }

    #[test]
    fn test_unsupported_features() {
        let err = dialect()
            .generate(&[MigrationOperation::rename_index("People", "Foo", "foo")], None)
            .unwrap_err();
        assert_eq!(err.operation(), Some("RenameIndexOperation"));

        let sequence = MigrationOperation::DropSequence(crate::operations::DropSequenceOperation {
            name: "Seq".to_string(),
            schema: None,
        });
        let err = dialect().generate(&[sequence], None).unwrap_err();
        assert!(matches!(
            err,
            MigrateError::UnsupportedFeature {
                feature: "sequences",
                ..
            }
        ));
    }

    #[test]
    fn test_schema_operations_are_noops() {
        let op = MigrationOperation::EnsureSchema(EnsureSchemaOperation {
            name: "dbo".to_string(),
        });
        assert!(sql(op).is_empty());
    }

    #[test]
    fn test_init_spatial_metadata_only_on_transition() {
        let enable = AlterDatabaseOperation {
            annotations: Annotations::new().with(INIT_SPATIAL_METADATA, true),
            old_annotations: Annotations::new(),
        };
        assert_eq!(sql(enable.clone().into()), ["SELECT InitSpatialMetaData();"]);

        let unchanged = AlterDatabaseOperation {
            old_annotations: enable.annotations.clone(),
            ..enable
        };
        assert!(sql(unchanged.into()).is_empty());
    }

    #[test]
    fn test_data_operations() {
        let model = RelationalModel::new().table(
            Table::new("People")
                .column(Column::new("Id", "INTEGER").not_null())
                .column(Column::new("Name", "TEXT"))
                .column(Column::new("Score", "REAL")),
        );
        let operations = vec![
            MigrationOperation::InsertData(InsertDataOperation {
                table: "People".to_string(),
                schema: None,
                columns: vec!["Id".to_string(), "Name".to_string(), "Score".to_string()],
                column_types: None,
                values: vec![
                    vec![Value::Integer(1), Value::from("Ann"), Value::Integer(3)],
                    vec![Value::Integer(2), Value::Null, Value::Real(1.5)],
                ],
            }),
            MigrationOperation::UpdateData(UpdateDataOperation {
                table: "People".to_string(),
                schema: None,
                key_columns: vec!["Id".to_string()],
                key_values: vec![vec![Value::Integer(1)]],
                columns: vec!["Name".to_string()],
                values: vec![vec![Value::from("O'Neil")]],
            }),
            MigrationOperation::DeleteData(DeleteDataOperation {
                table: "People".to_string(),
                schema: None,
                key_columns: vec!["Name".to_string()],
                key_values: vec![vec![Value::Null]],
            }),
        ];

        let statements: Vec<String> = dialect()
            .generate(&operations, Some(&model))
            .unwrap()
            .into_iter()
            .map(|c| c.command_text)
            .collect();
        assert_eq!(
            statements,
            [
                "INSERT INTO \"People\" (\"Id\", \"Name\", \"Score\")\nVALUES (1, 'Ann', 3.0);",
                "INSERT INTO \"People\" (\"Id\", \"Name\", \"Score\")\nVALUES (2, NULL, 1.5);",
                "UPDATE \"People\" SET \"Name\" = 'O''Neil'\nWHERE \"Id\" = 1;",
                "DELETE FROM \"People\"\nWHERE \"Name\" IS NULL;",
            ]
        );
    }

    #[test]
    fn test_data_arity_mismatch() {
        let op = MigrationOperation::InsertData(InsertDataOperation {
            table: "People".to_string(),
            schema: None,
            columns: vec!["Id".to_string(), "Name".to_string()],
            column_types: Some(vec!["INTEGER".to_string(), "TEXT".to_string()]),
            values: vec![vec![Value::Integer(1)]],
        });
        assert!(matches!(
            dialect().generate(&[op], None),
            Err(MigrateError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_transaction_suppression() {
        let op = MigrationOperation::Sql(SqlOperation {
            sql: "PRAGMA foreign_keys = 0;".to_string(),
            suppress_transaction: true,
        });
        let commands = dialect()
            .generate(&[op, MigrationOperation::drop_table("A")], None)
            .unwrap();
        assert!(commands[0].transaction_suppressed);
        assert!(!commands[1].transaction_suppressed);

        let no_transactions =
            dialect().with_options(GeneratorOptions::new().no_transactions());
        let commands = no_transactions
            .generate(&[MigrationOperation::drop_table("A")], None)
            .unwrap();
        assert!(commands[0].transaction_suppressed);
    }
}

//! Table rebuild planning.
//!
//! SQLite's `ALTER TABLE` can only add and rename columns and rename tables.
//! Every other structural change is carried out by rebuilding the table:
//! create a temporary table with the target shape, copy the rows over, drop
//! the original and rename the temporary table into its place.
//!
//! [`RebuildPlanner::rewrite`] walks the operation list once, collects the
//! operations each table rebuild absorbs, and then replaces them with the
//! rebuild sequence. Operations that take no part in a rebuild keep their
//! relative order; all rebuild operations are appended after them.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::config::DEFAULT_TEMP_TABLE_PREFIX;
use crate::dialect::quote_identifier;
use crate::logger::MigrationsLogger;
use crate::operations::{
    AddColumnOperation, AddForeignKeyOperation, AddPrimaryKeyOperation,
    AddUniqueConstraintOperation, AddCheckConstraintOperation, AlterColumnOperation,
    ColumnDefinition, CreateIndexOperation, CreateTableOperation, DropIndexOperation,
    DropTableOperation, MigrationOperation, RenameColumnOperation, RenameIndexOperation,
    RenameTableOperation, SqlOperation,
};
use crate::schema::{schemas_match, SchemaSnapshot, Table};
use crate::value::TypeMapping;

/// Identifies a table by name and schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableKey {
    /// Table name.
    pub table: String,
    /// Schema name.
    pub schema: Option<String>,
}

impl TableKey {
    /// Creates a key.
    #[must_use]
    pub fn new(table: impl Into<String>, schema: Option<&str>) -> Self {
        Self {
            table: table.into(),
            schema: schema.map(ToString::to_string),
        }
    }
}

/// What a pending rebuild of one table has absorbed so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RebuildContext {
    /// Output positions of the operations the rebuild replaces.
    pub operations_to_replace: Vec<usize>,
    /// Columns re-added after being dropped, by name.
    pub add_columns_deferred: BTreeMap<String, AddColumnOperation>,
    /// Names of dropped columns.
    pub drop_columns_deferred: BTreeSet<String>,
    /// Altered columns, by name.
    pub alter_columns_deferred: BTreeMap<String, AlterColumnOperation>,
    /// Renames folded into the rebuild, by new name.
    pub rename_columns_deferred: BTreeMap<String, RenameColumnOperation>,
    /// Indexes on deferred columns, by name.
    pub create_indexes_deferred: BTreeSet<String>,
    /// Kinds of operations that touched the table while the rebuild was pending.
    pub operations_to_warn_for: Vec<&'static str>,
}

impl RebuildContext {
    fn warn_for(&mut self, kind: &'static str) {
        if !self.operations_to_warn_for.contains(&kind) {
            self.operations_to_warn_for.push(kind);
        }
    }

    fn absorb(&mut self, other: Self) {
        self.operations_to_replace.extend(other.operations_to_replace);
        self.add_columns_deferred.extend(other.add_columns_deferred);
        self.drop_columns_deferred.extend(other.drop_columns_deferred);
        self.alter_columns_deferred.extend(other.alter_columns_deferred);
        self.rename_columns_deferred
            .extend(other.rename_columns_deferred);
        self.create_indexes_deferred
            .extend(other.create_indexes_deferred);
        for kind in other.operations_to_warn_for {
            self.warn_for(kind);
        }
    }
}

/// Rebuild contexts in the order their tables were first seen.
#[derive(Debug, Default)]
struct RebuildContexts {
    entries: Vec<(TableKey, RebuildContext)>,
}

impl RebuildContexts {
    fn get_mut(&mut self, key: &TableKey) -> Option<&mut RebuildContext> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, context)| context)
    }

    fn entry(&mut self, key: TableKey) -> &mut RebuildContext {
        let position = match self.entries.iter().position(|(k, _)| *k == key) {
            Some(position) => position,
            None => {
                self.entries.push((key, RebuildContext::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[position].1
    }

    fn remove(&mut self, key: &TableKey) -> Option<RebuildContext> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(position).1)
    }

    /// Moves the context of `from` to `to`, keeping its position. A context
    /// already pending under `to` is merged into it.
    fn rename(&mut self, from: &TableKey, to: TableKey) {
        if *from == to || !self.entries.iter().any(|(k, _)| k == from) {
            return;
        }
        let existing = self.remove(&to);
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == from) {
            entry.0 = to;
            if let Some(existing) = existing {
                entry.1.absorb(existing);
            }
        }
    }

    fn values_mut(&mut self) -> impl Iterator<Item = &mut RebuildContext> {
        self.entries.iter_mut().map(|(_, context)| context)
    }
}

/// Operations produced by the rebuilds of one rewrite.
#[derive(Debug, Default)]
struct RebuildOutput {
    rebuilds: Vec<MigrationOperation>,
    swaps: Vec<MigrationOperation>,
    indexes: Vec<MigrationOperation>,
}

/// Rewrites operation lists so that SQLite can execute them.
pub struct RebuildPlanner<'a> {
    model: Option<&'a dyn SchemaSnapshot>,
    logger: &'a dyn MigrationsLogger,
    temp_table_prefix: String,
}

impl<'a> RebuildPlanner<'a> {
    /// Creates a planner. Without a model no rebuild can be planned.
    #[must_use]
    pub fn new(model: Option<&'a dyn SchemaSnapshot>, logger: &'a dyn MigrationsLogger) -> Self {
        Self {
            model,
            logger,
            temp_table_prefix: DEFAULT_TEMP_TABLE_PREFIX.to_string(),
        }
    }

    /// Sets the prefix of temporary tables.
    #[must_use]
    pub fn with_temp_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_table_prefix = prefix.into();
        self
    }

    /// Rewrites `operations`, replacing the operations SQLite cannot run
    /// directly with table rebuilds.
    #[must_use]
    pub fn rewrite(&self, operations: Vec<MigrationOperation>) -> Vec<MigrationOperation> {
        let mut output: Vec<MigrationOperation> = Vec::with_capacity(operations.len());
        let mut contexts = RebuildContexts::default();
        let mut discarded: BTreeSet<usize> = BTreeSet::new();

        for operation in operations {
            let index = output.len();
            match operation {
                MigrationOperation::AddPrimaryKey(_)
                | MigrationOperation::AddUniqueConstraint(_)
                | MigrationOperation::AddCheckConstraint(_)
                | MigrationOperation::AlterTable(_)
                | MigrationOperation::DropCheckConstraint(_)
                | MigrationOperation::DropForeignKey(_)
                | MigrationOperation::DropPrimaryKey(_)
                | MigrationOperation::DropUniqueConstraint(_) => {
                    if let Some((table, schema)) = operation.table() {
                        contexts
                            .entry(TableKey::new(table, schema))
                            .operations_to_replace
                            .push(index);
                    }
                    output.push(operation);
                }

                MigrationOperation::DropColumn(op) => {
                    let context = contexts.entry(TableKey::new(&op.table, op.schema.as_deref()));
                    context.drop_columns_deferred.insert(op.name.clone());
                    context.operations_to_replace.push(index);
                    output.push(op.into());
                }

                MigrationOperation::AlterColumn(op) => {
                    let context = contexts.entry(TableKey::new(&op.table, op.schema.as_deref()));
                    context
                        .alter_columns_deferred
                        .insert(op.name.clone(), op.clone());
                    context.operations_to_replace.push(index);
                    output.push(op.into());
                }

                MigrationOperation::AddForeignKey(op) => {
                    let created = output.iter_mut().find_map(|existing| match existing {
                        MigrationOperation::CreateTable(create)
                            if create.name == op.table
                                && schemas_match(
                                    create.schema.as_deref(),
                                    op.schema.as_deref(),
                                ) =>
                        {
                            Some(create)
                        }
                        _ => None,
                    });
                    match created {
                        Some(create) => create.foreign_keys.push(op),
                        None => {
                            contexts
                                .entry(TableKey::new(&op.table, op.schema.as_deref()))
                                .operations_to_replace
                                .push(index);
                            output.push(op.into());
                        }
                    }
                }

                MigrationOperation::AddColumn(op) => {
                    let key = TableKey::new(&op.table, op.schema.as_deref());
                    let deferred = match contexts.get_mut(&key) {
                        Some(context) if context.drop_columns_deferred.contains(&op.name) => {
                            context
                                .add_columns_deferred
                                .insert(op.name.clone(), op.clone());
                            context.operations_to_replace.push(index);
                            true
                        }
                        _ => false,
                    };
                    // SQLite has no COMMENT statement; comments live in CREATE TABLE.
                    if !deferred && op.column.comment.is_some() {
                        contexts.entry(key);
                    }
                    output.push(op.into());
                }

                MigrationOperation::RenameColumn(op) => {
                    let key = TableKey::new(&op.table, op.schema.as_deref());
                    if let Some(context) = contexts.get_mut(&key) {
                        if context.drop_columns_deferred.contains(&op.new_name) {
                            context.drop_columns_deferred.insert(op.name.clone());
                            context
                                .rename_columns_deferred
                                .insert(op.new_name.clone(), op.clone());
                            context.operations_to_replace.push(index);
                        }
                    }
                    output.push(op.into());
                }

                MigrationOperation::CreateIndex(op) => {
                    let key = TableKey::new(&op.table, op.schema.as_deref());
                    if let Some(context) = contexts.get_mut(&key) {
                        let on_deferred_column = op.columns.iter().any(|column| {
                            context.add_columns_deferred.contains_key(column)
                                || context.rename_columns_deferred.contains_key(column)
                        });
                        if on_deferred_column {
                            context.create_indexes_deferred.insert(op.name.clone());
                            context.operations_to_replace.push(index);
                        }
                    }
                    output.push(op.into());
                }

                MigrationOperation::RenameTable(op) => {
                    let from = TableKey::new(&op.name, op.schema.as_deref());
                    let to = TableKey::new(
                        op.new_name.as_deref().unwrap_or(&op.name),
                        op.new_schema.as_deref().or(op.schema.as_deref()),
                    );
                    contexts.rename(&from, to);
                    output.push(op.into());
                }

                MigrationOperation::DropTable(op) => output.push(op.into()),

                MigrationOperation::RenameIndex(op) => match self.rewrite_rename_index(&op) {
                    Some((drop, create)) => {
                        output.push(drop.into());
                        output.push(create.into());
                    }
                    None => output.push(op.into()),
                },

                MigrationOperation::CreateTable(_)
                | MigrationOperation::EnsureSchema(_)
                | MigrationOperation::DropSchema(_)
                | MigrationOperation::CreateSequence(_)
                | MigrationOperation::AlterSequence(_)
                | MigrationOperation::DropSequence(_)
                | MigrationOperation::RenameSequence(_)
                | MigrationOperation::RestartSequence(_) => output.push(operation),

                MigrationOperation::InsertData(_)
                | MigrationOperation::UpdateData(_)
                | MigrationOperation::DeleteData(_)
                | MigrationOperation::DropIndex(_)
                | MigrationOperation::Sql(_)
                | MigrationOperation::AlterDatabase(_) => {
                    let kind = operation.kind();
                    match operation.table() {
                        Some((table, schema)) => {
                            if let Some(context) = contexts.get_mut(&TableKey::new(table, schema))
                            {
                                context.warn_for(kind);
                            }
                        }
                        None => {
                            for context in contexts.values_mut() {
                                context.warn_for(kind);
                            }
                        }
                    }
                    output.push(operation);
                }
            }
        }

        let mut rebuilt = RebuildOutput::default();
        for (key, context) in &contexts.entries {
            let Some(table) = self
                .model
                .and_then(|model| model.find_table(&key.table, key.schema.as_deref()))
            else {
                debug!(
                    table = %key.table,
                    "Table not found in the target model, leaving its operations unchanged"
                );
                continue;
            };

            for kind in &context.operations_to_warn_for {
                self.logger.table_rebuild_pending(&key.table, *kind);
            }
            discarded.extend(context.operations_to_replace.iter().copied());
            self.rebuild_table(key, table, context, &mut rebuilt);
        }

        let mut operations: Vec<MigrationOperation> = output
            .into_iter()
            .enumerate()
            .filter(|(index, _)| !discarded.contains(index))
            .map(|(_, operation)| operation)
            .collect();

        if !rebuilt.swaps.is_empty() {
            operations.extend(rebuilt.rebuilds);
            operations.push(foreign_keys_pragma(false));
            operations.extend(rebuilt.swaps);
            operations.push(foreign_keys_pragma(true));
            operations.extend(rebuilt.indexes);
        }

        operations
    }

    /// Replaces a rename with a drop and a re-create of the renamed index
    /// as found in the model.
    fn rewrite_rename_index(
        &self,
        op: &RenameIndexOperation,
    ) -> Option<(DropIndexOperation, CreateIndexOperation)> {
        let table_name = op.table.as_deref()?;
        let table = self
            .model?
            .find_table(table_name, op.schema.as_deref())?;
        let index = table.get_index(&op.new_name)?;

        let drop = DropIndexOperation {
            table: op.table.clone(),
            schema: op.schema.clone(),
            name: op.name.clone(),
        };
        let create = CreateIndexOperation::from_index(table_name, op.schema.as_deref(), index);
        Some((drop, create))
    }

    fn rebuild_table(
        &self,
        key: &TableKey,
        table: &Table,
        context: &RebuildContext,
        rebuilt: &mut RebuildOutput,
    ) {
        let schema = key.schema.as_deref();
        let temp_name = format!("{}{}", self.temp_table_prefix, key.table);

        let mut create = CreateTableOperation::new(&temp_name);
        create.schema = key.schema.clone();
        create.comment.clone_from(&table.comment);
        create.annotations = table.annotations.clone();
        create.primary_key = table.primary_key.as_ref().map(|pk| AddPrimaryKeyOperation {
            table: temp_name.clone(),
            schema: key.schema.clone(),
            name: pk.name.clone(),
            columns: pk.columns.clone(),
        });

        let mut copied: Vec<(String, String)> = Vec::new();
        for column in table.ordered_columns() {
            let mut definition = ColumnDefinition::from(column);
            let added = context.add_columns_deferred.get(&column.name);
            if let Some(add) = added.filter(|add| !add.column.is_nullable) {
                definition.default_value.clone_from(&add.column.default_value);
                definition
                    .default_value_sql
                    .clone_from(&add.column.default_value_sql);
            }
            create.columns.push(AddColumnOperation {
                table: temp_name.clone(),
                schema: key.schema.clone(),
                name: column.name.clone(),
                column: definition,
            });

            if column.computed_column_sql.is_some() || added.is_some() {
                continue;
            }

            let source = context
                .rename_columns_deferred
                .get(&column.name)
                .map_or(column.name.as_str(), |rename| rename.name.as_str());
            let mut expression = quote_identifier(source);

            let made_required = context
                .alter_columns_deferred
                .get(&column.name)
                .filter(|alter| alter.old_column.is_nullable && !alter.column.is_nullable);
            if let Some(alter) = made_required {
                let mapping = TypeMapping::for_store_type(
                    column
                        .store_type
                        .as_deref()
                        .or(alter.column.column_type.as_deref()),
                );
                let fallback = alter
                    .column
                    .default_value
                    .clone()
                    .filter(|value| !value.is_null())
                    .unwrap_or_else(|| mapping.zero_value());
                expression = format!(
                    "IFNULL({expression}, {})",
                    mapping.generate_sql_literal(&fallback)
                );
            }
            copied.push((quote_identifier(&column.name), expression));
        }

        let pk_name = table.primary_key.as_ref().and_then(|pk| pk.name.as_deref());
        create.foreign_keys = table
            .foreign_keys
            .iter()
            .map(|fk| AddForeignKeyOperation::from_foreign_key(&temp_name, schema, fk))
            .collect();
        create.unique_constraints = table
            .unique_constraints
            .iter()
            .filter(|uc| Some(uc.name.as_str()) != pk_name)
            .map(|uc| AddUniqueConstraintOperation {
                table: temp_name.clone(),
                schema: key.schema.clone(),
                name: uc.name.clone(),
                columns: uc.columns.clone(),
            })
            .collect();
        create.check_constraints = table
            .check_constraints
            .iter()
            .map(|ck| AddCheckConstraintOperation {
                table: temp_name.clone(),
                schema: key.schema.clone(),
                name: ck.name.clone(),
                sql: ck.sql.clone(),
            })
            .collect();

        rebuilt.rebuilds.push(create.into());

        for index in &table.indexes {
            if index.is_unique && context.create_indexes_deferred.contains(&index.name) {
                rebuilt
                    .rebuilds
                    .push(CreateIndexOperation::from_index(&temp_name, schema, index).into());
            } else {
                rebuilt
                    .indexes
                    .push(CreateIndexOperation::from_index(&key.table, schema, index).into());
            }
        }

        if !copied.is_empty() {
            let targets: Vec<&str> = copied.iter().map(|(target, _)| target.as_str()).collect();
            let sources: Vec<&str> = copied.iter().map(|(_, source)| source.as_str()).collect();
            let sql = format!(
                "INSERT INTO {} ({})\nSELECT {}\nFROM {};",
                quote_identifier(&temp_name),
                targets.join(", "),
                sources.join(", "),
                quote_identifier(&key.table)
            );
            rebuilt.rebuilds.push(SqlOperation::new(sql).into());
        }

        rebuilt.swaps.push(
            DropTableOperation {
                name: key.table.clone(),
                schema: key.schema.clone(),
            }
            .into(),
        );
        rebuilt.swaps.push(
            RenameTableOperation {
                name: temp_name,
                schema: key.schema.clone(),
                new_name: Some(key.table.clone()),
                new_schema: None,
            }
            .into(),
        );
    }
}

fn foreign_keys_pragma(enabled: bool) -> MigrationOperation {
    SqlOperation {
        sql: format!("PRAGMA foreign_keys = {};", u8::from(enabled)),
        suppress_transaction: true,
    }
    .into()
}

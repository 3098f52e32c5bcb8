//! Migration operations.
//!
//! One record per schema change, plus the closed [`MigrationOperation`] sum
//! type the planner and the SQL generator match on. Every table-scoped
//! operation names its table by `(table, schema)`; SQLite ignores the schema.

use serde::{Deserialize, Serialize};

use crate::annotations::Annotations;
use crate::schema::{Column, ForeignKey, Index, ReferentialAction};
use crate::value::Value;

/// Everything that defines a column, shared by add and alter operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnDefinition {
    /// Store type, e.g. `INTEGER`.
    pub column_type: Option<String>,
    /// Whether the column allows NULL values.
    pub is_nullable: bool,
    /// Default value.
    pub default_value: Option<Value>,
    /// Default given as an SQL expression.
    pub default_value_sql: Option<String>,
    /// Expression of a generated column.
    pub computed_column_sql: Option<String>,
    /// Whether a generated column is stored.
    pub is_stored: Option<bool>,
    /// Column comment.
    pub comment: Option<String>,
    /// Collation name.
    pub collation: Option<String>,
    /// Column annotations.
    pub annotations: Annotations,
}

impl ColumnDefinition {
    /// Creates a nullable column definition of the given type.
    #[must_use]
    pub fn new(column_type: impl Into<String>) -> Self {
        Self {
            column_type: Some(column_type.into()),
            is_nullable: true,
            ..Self::default()
        }
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    /// Sets the column as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Sets the default SQL expression.
    #[must_use]
    pub fn default_sql(mut self, sql: impl Into<String>) -> Self {
        self.default_value_sql = Some(sql.into());
        self
    }

    /// Makes the column a generated column.
    #[must_use]
    pub fn computed(mut self, sql: impl Into<String>, stored: bool) -> Self {
        self.computed_column_sql = Some(sql.into());
        self.is_stored = Some(stored);
        self
    }

    /// Sets the comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Sets the annotations.
    #[must_use]
    pub fn annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }
}

impl From<&Column> for ColumnDefinition {
    fn from(column: &Column) -> Self {
        Self {
            column_type: column.store_type.clone(),
            is_nullable: column.is_nullable,
            default_value: column.default_value.clone(),
            default_value_sql: column.default_value_sql.clone(),
            computed_column_sql: column.computed_column_sql.clone(),
            is_stored: column.is_stored,
            comment: column.comment.clone(),
            collation: column.collation.clone(),
            annotations: column.annotations.clone(),
        }
    }
}

/// Adds a column to an existing table (or defines one inside `CreateTable`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddColumnOperation {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Column name.
    pub name: String,
    /// Column definition.
    pub column: ColumnDefinition,
}

impl AddColumnOperation {
    /// Creates an add-column operation.
    #[must_use]
    pub fn new(table: impl Into<String>, name: impl Into<String>, column: ColumnDefinition) -> Self {
        Self {
            table: table.into(),
            schema: None,
            name: name.into(),
            column,
        }
    }
}

/// Drops a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropColumnOperation {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Column name.
    pub name: String,
}

/// Changes the definition of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterColumnOperation {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Column name.
    pub name: String,
    /// New definition.
    pub column: ColumnDefinition,
    /// Previous definition.
    pub old_column: ColumnDefinition,
}

/// Renames a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameColumnOperation {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Current column name.
    pub name: String,
    /// New column name.
    pub new_name: String,
}

/// Adds a foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddForeignKeyOperation {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Constraint name.
    pub name: String,
    /// Column(s) in the referencing table.
    pub columns: Vec<String>,
    /// Referenced table name.
    pub principal_table: String,
    /// Referenced table schema.
    #[serde(default)]
    pub principal_schema: Option<String>,
    /// Referenced column(s).
    pub principal_columns: Vec<String>,
    /// Action on update.
    #[serde(default)]
    pub on_update: ReferentialAction,
    /// Action on delete.
    #[serde(default)]
    pub on_delete: ReferentialAction,
}

impl AddForeignKeyOperation {
    /// Builds the operation from a snapshot foreign key.
    #[must_use]
    pub fn from_foreign_key(table: &str, schema: Option<&str>, foreign_key: &ForeignKey) -> Self {
        Self {
            table: table.to_string(),
            schema: schema.map(ToString::to_string),
            name: foreign_key.name.clone(),
            columns: foreign_key.columns.clone(),
            principal_table: foreign_key.principal_table.clone(),
            principal_schema: foreign_key.principal_schema.clone(),
            principal_columns: foreign_key.principal_columns.clone(),
            on_update: foreign_key.on_update,
            on_delete: foreign_key.on_delete,
        }
    }
}

/// Drops a foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropForeignKeyOperation {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Constraint name.
    pub name: String,
}

/// Adds a primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPrimaryKeyOperation {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Constraint name.
    #[serde(default)]
    pub name: Option<String>,
    /// Key columns.
    pub columns: Vec<String>,
}

/// Drops a primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropPrimaryKeyOperation {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Constraint name.
    pub name: String,
}

/// Adds a unique constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddUniqueConstraintOperation {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Constraint name.
    pub name: String,
    /// Constrained columns.
    pub columns: Vec<String>,
}

/// Drops a unique constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropUniqueConstraintOperation {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Constraint name.
    pub name: String,
}

/// Adds a check constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddCheckConstraintOperation {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Constraint name.
    pub name: String,
    /// Check expression.
    pub sql: String,
}

/// Drops a check constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropCheckConstraintOperation {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Constraint name.
    pub name: String,
}

/// Creates an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndexOperation {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Index name.
    pub name: String,
    /// Indexed columns.
    pub columns: Vec<String>,
    /// Whether this is a unique index.
    #[serde(default)]
    pub is_unique: bool,
    /// Partial index condition (WHERE clause).
    #[serde(default)]
    pub filter: Option<String>,
}

impl CreateIndexOperation {
    /// Creates a non-unique index operation.
    #[must_use]
    pub fn new(table: impl Into<String>, name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            table: table.into(),
            schema: None,
            name: name.into(),
            columns: columns.iter().map(ToString::to_string).collect(),
            is_unique: false,
            filter: None,
        }
    }

    /// Builds the operation from a snapshot index.
    #[must_use]
    pub fn from_index(table: &str, schema: Option<&str>, index: &Index) -> Self {
        Self {
            table: table.to_string(),
            schema: schema.map(ToString::to_string),
            name: index.name.clone(),
            columns: index.columns.clone(),
            is_unique: index.is_unique,
            filter: index.filter.clone(),
        }
    }

    /// Makes the index unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Sets the partial index condition.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Drops an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropIndexOperation {
    /// Table the index belongs to, when known.
    #[serde(default)]
    pub table: Option<String>,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Index name.
    pub name: String,
}

/// Renames an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameIndexOperation {
    /// Table the index belongs to, when known.
    #[serde(default)]
    pub table: Option<String>,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Current index name.
    pub name: String,
    /// New index name.
    pub new_name: String,
}

/// Creates a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableOperation {
    /// Table name.
    pub name: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Table comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Columns, in creation order.
    pub columns: Vec<AddColumnOperation>,
    /// Primary key.
    #[serde(default)]
    pub primary_key: Option<AddPrimaryKeyOperation>,
    /// Foreign keys.
    #[serde(default)]
    pub foreign_keys: Vec<AddForeignKeyOperation>,
    /// Unique constraints.
    #[serde(default)]
    pub unique_constraints: Vec<AddUniqueConstraintOperation>,
    /// Check constraints.
    #[serde(default)]
    pub check_constraints: Vec<AddCheckConstraintOperation>,
    /// Table annotations.
    #[serde(default)]
    pub annotations: Annotations,
}

impl CreateTableOperation {
    /// Creates an empty create-table operation.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            comment: None,
            columns: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
            unique_constraints: Vec::new(),
            check_constraints: Vec::new(),
            annotations: Annotations::default(),
        }
    }

    /// Sets the comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>, column: ColumnDefinition) -> Self {
        let mut add = AddColumnOperation::new(self.name.clone(), name, column);
        add.schema.clone_from(&self.schema);
        self.columns.push(add);
        self
    }

    /// Sets the primary key.
    #[must_use]
    pub fn primary_key(mut self, name: impl Into<String>, columns: &[&str]) -> Self {
        self.primary_key = Some(AddPrimaryKeyOperation {
            table: self.name.clone(),
            schema: self.schema.clone(),
            name: Some(name.into()),
            columns: columns.iter().map(ToString::to_string).collect(),
        });
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, foreign_key: &ForeignKey) -> Self {
        self.foreign_keys.push(AddForeignKeyOperation::from_foreign_key(
            &self.name,
            self.schema.as_deref(),
            foreign_key,
        ));
        self
    }

    /// Adds a unique constraint.
    #[must_use]
    pub fn unique_constraint(mut self, name: impl Into<String>, columns: &[&str]) -> Self {
        self.unique_constraints.push(AddUniqueConstraintOperation {
            table: self.name.clone(),
            schema: self.schema.clone(),
            name: name.into(),
            columns: columns.iter().map(ToString::to_string).collect(),
        });
        self
    }

    /// Adds a check constraint.
    #[must_use]
    pub fn check_constraint(mut self, name: impl Into<String>, sql: impl Into<String>) -> Self {
        self.check_constraints.push(AddCheckConstraintOperation {
            table: self.name.clone(),
            schema: self.schema.clone(),
            name: name.into(),
            sql: sql.into(),
        });
        self
    }

    /// Sets the annotations.
    #[must_use]
    pub fn annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }
}

/// Drops a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTableOperation {
    /// Table name.
    pub name: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
}

/// Renames a table or moves it to another schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTableOperation {
    /// Current table name.
    pub name: String,
    /// Current schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// New table name, if it changes.
    #[serde(default)]
    pub new_name: Option<String>,
    /// New schema name, if it changes.
    #[serde(default)]
    pub new_schema: Option<String>,
}

/// Changes table-level metadata (comment, annotations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTableOperation {
    /// Table name.
    pub name: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// New comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Previous comment.
    #[serde(default)]
    pub old_comment: Option<String>,
    /// New annotations.
    #[serde(default)]
    pub annotations: Annotations,
    /// Previous annotations.
    #[serde(default)]
    pub old_annotations: Annotations,
}

/// Ensures a schema exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnsureSchemaOperation {
    /// Schema name.
    pub name: String,
}

/// Drops a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropSchemaOperation {
    /// Schema name.
    pub name: String,
}

/// Creates a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSequenceOperation {
    /// Sequence name.
    pub name: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// First value.
    #[serde(default)]
    pub start_value: i64,
    /// Increment.
    pub increment_by: i64,
    /// Lower bound.
    #[serde(default)]
    pub min_value: Option<i64>,
    /// Upper bound.
    #[serde(default)]
    pub max_value: Option<i64>,
    /// Whether the sequence wraps around.
    #[serde(default)]
    pub is_cyclic: bool,
}

/// Changes a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlterSequenceOperation {
    /// Sequence name.
    pub name: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Increment.
    pub increment_by: i64,
    /// Lower bound.
    #[serde(default)]
    pub min_value: Option<i64>,
    /// Upper bound.
    #[serde(default)]
    pub max_value: Option<i64>,
    /// Whether the sequence wraps around.
    #[serde(default)]
    pub is_cyclic: bool,
}

/// Drops a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropSequenceOperation {
    /// Sequence name.
    pub name: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
}

/// Renames a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameSequenceOperation {
    /// Sequence name.
    pub name: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// New sequence name.
    #[serde(default)]
    pub new_name: Option<String>,
    /// New schema name.
    #[serde(default)]
    pub new_schema: Option<String>,
}

/// Restarts a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartSequenceOperation {
    /// Sequence name.
    pub name: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Value to restart at.
    #[serde(default)]
    pub start_value: Option<i64>,
}

/// Inserts seed rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertDataOperation {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Target columns.
    pub columns: Vec<String>,
    /// Store types of the columns, used to render literals.
    #[serde(default)]
    pub column_types: Option<Vec<String>>,
    /// One entry per row, in column order.
    pub values: Vec<Vec<Value>>,
}

/// Updates seed rows identified by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateDataOperation {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Key columns.
    pub key_columns: Vec<String>,
    /// Key values, one entry per row.
    pub key_values: Vec<Vec<Value>>,
    /// Updated columns.
    pub columns: Vec<String>,
    /// New values, one entry per row.
    pub values: Vec<Vec<Value>>,
}

/// Deletes seed rows identified by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteDataOperation {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Key columns.
    pub key_columns: Vec<String>,
    /// Key values, one entry per row.
    pub key_values: Vec<Vec<Value>>,
}

/// Raw SQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlOperation {
    /// SQL text.
    pub sql: String,
    /// Run outside of the migration transaction.
    #[serde(default)]
    pub suppress_transaction: bool,
}

impl SqlOperation {
    /// Creates a transactional SQL operation.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            suppress_transaction: false,
        }
    }
}

/// Changes database-level annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlterDatabaseOperation {
    /// New annotations.
    #[serde(default)]
    pub annotations: Annotations,
    /// Previous annotations.
    #[serde(default)]
    pub old_annotations: Annotations,
}

/// A single migration operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MigrationOperation {
    /// Add a column.
    AddColumn(AddColumnOperation),
    /// Drop a column.
    DropColumn(DropColumnOperation),
    /// Alter a column.
    AlterColumn(AlterColumnOperation),
    /// Rename a column.
    RenameColumn(RenameColumnOperation),
    /// Add a foreign key.
    AddForeignKey(AddForeignKeyOperation),
    /// Drop a foreign key.
    DropForeignKey(DropForeignKeyOperation),
    /// Add a primary key.
    AddPrimaryKey(AddPrimaryKeyOperation),
    /// Drop a primary key.
    DropPrimaryKey(DropPrimaryKeyOperation),
    /// Add a unique constraint.
    AddUniqueConstraint(AddUniqueConstraintOperation),
    /// Drop a unique constraint.
    DropUniqueConstraint(DropUniqueConstraintOperation),
    /// Add a check constraint.
    AddCheckConstraint(AddCheckConstraintOperation),
    /// Drop a check constraint.
    DropCheckConstraint(DropCheckConstraintOperation),
    /// Create an index.
    CreateIndex(CreateIndexOperation),
    /// Drop an index.
    DropIndex(DropIndexOperation),
    /// Rename an index.
    RenameIndex(RenameIndexOperation),
    /// Create a table.
    CreateTable(CreateTableOperation),
    /// Drop a table.
    DropTable(DropTableOperation),
    /// Rename a table.
    RenameTable(RenameTableOperation),
    /// Alter table metadata.
    AlterTable(AlterTableOperation),
    /// Ensure a schema exists.
    EnsureSchema(EnsureSchemaOperation),
    /// Drop a schema.
    DropSchema(DropSchemaOperation),
    /// Create a sequence.
    CreateSequence(CreateSequenceOperation),
    /// Alter a sequence.
    AlterSequence(AlterSequenceOperation),
    /// Drop a sequence.
    DropSequence(DropSequenceOperation),
    /// Rename a sequence.
    RenameSequence(RenameSequenceOperation),
    /// Restart a sequence.
    RestartSequence(RestartSequenceOperation),
    /// Insert seed data.
    InsertData(InsertDataOperation),
    /// Update seed data.
    UpdateData(UpdateDataOperation),
    /// Delete seed data.
    DeleteData(DeleteDataOperation),
    /// Run raw SQL.
    Sql(SqlOperation),
    /// Alter database annotations.
    AlterDatabase(AlterDatabaseOperation),
}

macro_rules! impl_from_operation {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for MigrationOperation {
                fn from(operation: $ty) -> Self {
                    Self::$variant(operation)
                }
            }
        )*
    };
}

impl_from_operation! {
    AddColumn => AddColumnOperation,
    DropColumn => DropColumnOperation,
    AlterColumn => AlterColumnOperation,
    RenameColumn => RenameColumnOperation,
    AddForeignKey => AddForeignKeyOperation,
    DropForeignKey => DropForeignKeyOperation,
    AddPrimaryKey => AddPrimaryKeyOperation,
    DropPrimaryKey => DropPrimaryKeyOperation,
    AddUniqueConstraint => AddUniqueConstraintOperation,
    DropUniqueConstraint => DropUniqueConstraintOperation,
    AddCheckConstraint => AddCheckConstraintOperation,
    DropCheckConstraint => DropCheckConstraintOperation,
    CreateIndex => CreateIndexOperation,
    DropIndex => DropIndexOperation,
    RenameIndex => RenameIndexOperation,
    CreateTable => CreateTableOperation,
    DropTable => DropTableOperation,
    RenameTable => RenameTableOperation,
    AlterTable => AlterTableOperation,
    EnsureSchema => EnsureSchemaOperation,
    DropSchema => DropSchemaOperation,
    CreateSequence => CreateSequenceOperation,
    AlterSequence => AlterSequenceOperation,
    DropSequence => DropSequenceOperation,
    RenameSequence => RenameSequenceOperation,
    RestartSequence => RestartSequenceOperation,
    InsertData => InsertDataOperation,
    UpdateData => UpdateDataOperation,
    DeleteData => DeleteDataOperation,
    Sql => SqlOperation,
    AlterDatabase => AlterDatabaseOperation,
}

impl MigrationOperation {
    /// Creates an add column operation.
    #[must_use]
    pub fn add_column(
        table: impl Into<String>,
        name: impl Into<String>,
        column: ColumnDefinition,
    ) -> Self {
        AddColumnOperation::new(table, name, column).into()
    }

    /// Creates a drop column operation.
    #[must_use]
    pub fn drop_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DropColumn(DropColumnOperation {
            table: table.into(),
            schema: None,
            name: name.into(),
        })
    }

    /// Creates an alter column operation.
    #[must_use]
    pub fn alter_column(
        table: impl Into<String>,
        name: impl Into<String>,
        column: ColumnDefinition,
        old_column: ColumnDefinition,
    ) -> Self {
        Self::AlterColumn(AlterColumnOperation {
            table: table.into(),
            schema: None,
            name: name.into(),
            column,
            old_column,
        })
    }

    /// Creates a rename column operation.
    #[must_use]
    pub fn rename_column(
        table: impl Into<String>,
        name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self::RenameColumn(RenameColumnOperation {
            table: table.into(),
            schema: None,
            name: name.into(),
            new_name: new_name.into(),
        })
    }

    /// Creates a drop table operation.
    #[must_use]
    pub fn drop_table(name: impl Into<String>) -> Self {
        Self::DropTable(DropTableOperation {
            name: name.into(),
            schema: None,
        })
    }

    /// Creates a rename table operation.
    #[must_use]
    pub fn rename_table(name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self::RenameTable(RenameTableOperation {
            name: name.into(),
            schema: None,
            new_name: Some(new_name.into()),
            new_schema: None,
        })
    }

    /// Creates a drop index operation.
    #[must_use]
    pub fn drop_index(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DropIndex(DropIndexOperation {
            table: Some(table.into()),
            schema: None,
            name: name.into(),
        })
    }

    /// Creates a rename index operation.
    #[must_use]
    pub fn rename_index(
        table: impl Into<String>,
        name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self::RenameIndex(RenameIndexOperation {
            table: Some(table.into()),
            schema: None,
            name: name.into(),
            new_name: new_name.into(),
        })
    }

    /// Creates a raw SQL operation.
    #[must_use]
    pub fn sql(sql: impl Into<String>) -> Self {
        Self::Sql(SqlOperation::new(sql))
    }

    /// Returns the operation kind, e.g. `DropColumnOperation`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddColumn(_) => "AddColumnOperation",
            Self::DropColumn(_) => "DropColumnOperation",
            Self::AlterColumn(_) => "AlterColumnOperation",
            Self::RenameColumn(_) => "RenameColumnOperation",
            Self::AddForeignKey(_) => "AddForeignKeyOperation",
            Self::DropForeignKey(_) => "DropForeignKeyOperation",
            Self::AddPrimaryKey(_) => "AddPrimaryKeyOperation",
            Self::DropPrimaryKey(_) => "DropPrimaryKeyOperation",
            Self::AddUniqueConstraint(_) => "AddUniqueConstraintOperation",
            Self::DropUniqueConstraint(_) => "DropUniqueConstraintOperation",
            Self::AddCheckConstraint(_) => "AddCheckConstraintOperation",
            Self::DropCheckConstraint(_) => "DropCheckConstraintOperation",
            Self::CreateIndex(_) => "CreateIndexOperation",
            Self::DropIndex(_) => "DropIndexOperation",
            Self::RenameIndex(_) => "RenameIndexOperation",
            Self::CreateTable(_) => "CreateTableOperation",
            Self::DropTable(_) => "DropTableOperation",
            Self::RenameTable(_) => "RenameTableOperation",
            Self::AlterTable(_) => "AlterTableOperation",
            Self::EnsureSchema(_) => "EnsureSchemaOperation",
            Self::DropSchema(_) => "DropSchemaOperation",
            Self::CreateSequence(_) => "CreateSequenceOperation",
            Self::AlterSequence(_) => "AlterSequenceOperation",
            Self::DropSequence(_) => "DropSequenceOperation",
            Self::RenameSequence(_) => "RenameSequenceOperation",
            Self::RestartSequence(_) => "RestartSequenceOperation",
            Self::InsertData(_) => "InsertDataOperation",
            Self::UpdateData(_) => "UpdateDataOperation",
            Self::DeleteData(_) => "DeleteDataOperation",
            Self::Sql(_) => "SqlOperation",
            Self::AlterDatabase(_) => "AlterDatabaseOperation",
        }
    }

    /// Returns the `(table, schema)` this operation targets, if any.
    #[must_use]
    pub fn table(&self) -> Option<(&str, Option<&str>)> {
        fn key<'a>(table: &'a str, schema: &'a Option<String>) -> Option<(&'a str, Option<&'a str>)> {
            Some((table, schema.as_deref()))
        }

        match self {
            Self::AddColumn(op) => key(&op.table, &op.schema),
            Self::DropColumn(op) => key(&op.table, &op.schema),
            Self::AlterColumn(op) => key(&op.table, &op.schema),
            Self::RenameColumn(op) => key(&op.table, &op.schema),
            Self::AddForeignKey(op) => key(&op.table, &op.schema),
            Self::DropForeignKey(op) => key(&op.table, &op.schema),
            Self::AddPrimaryKey(op) => key(&op.table, &op.schema),
            Self::DropPrimaryKey(op) => key(&op.table, &op.schema),
            Self::AddUniqueConstraint(op) => key(&op.table, &op.schema),
            Self::DropUniqueConstraint(op) => key(&op.table, &op.schema),
            Self::AddCheckConstraint(op) => key(&op.table, &op.schema),
            Self::DropCheckConstraint(op) => key(&op.table, &op.schema),
            Self::CreateIndex(op) => key(&op.table, &op.schema),
            Self::InsertData(op) => key(&op.table, &op.schema),
            Self::UpdateData(op) => key(&op.table, &op.schema),
            Self::DeleteData(op) => key(&op.table, &op.schema),
            Self::DropIndex(op) => op.table.as_deref().map(|t| (t, op.schema.as_deref())),
            Self::RenameIndex(op) => op.table.as_deref().map(|t| (t, op.schema.as_deref())),
            Self::CreateTable(op) => key(&op.name, &op.schema),
            Self::DropTable(op) => key(&op.name, &op.schema),
            Self::RenameTable(op) => key(&op.name, &op.schema),
            Self::AlterTable(op) => key(&op.name, &op.schema),
            Self::EnsureSchema(_)
            | Self::DropSchema(_)
            | Self::CreateSequence(_)
            | Self::AlterSequence(_)
            | Self::DropSequence(_)
            | Self::RenameSequence(_)
            | Self::RestartSequence(_)
            | Self::Sql(_)
            | Self::AlterDatabase(_) => None,
        }
    }

    /// Returns a human-readable description of this operation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::AddColumn(op) => format!("Add column '{}' to table '{}'", op.name, op.table),
            Self::DropColumn(op) => format!("Drop column '{}' from table '{}'", op.name, op.table),
            Self::AlterColumn(op) => format!("Alter column '{}' in table '{}'", op.name, op.table),
            Self::RenameColumn(op) => format!(
                "Rename column '{}' to '{}' in table '{}'",
                op.name, op.new_name, op.table
            ),
            Self::AddForeignKey(op) => {
                format!("Add foreign key '{}' to table '{}'", op.name, op.table)
            }
            Self::DropForeignKey(op) => {
                format!("Drop foreign key '{}' from table '{}'", op.name, op.table)
            }
            Self::AddPrimaryKey(op) => format!("Add primary key to table '{}'", op.table),
            Self::DropPrimaryKey(op) => format!("Drop primary key from table '{}'", op.table),
            Self::AddUniqueConstraint(op) => {
                format!("Add unique constraint '{}' to table '{}'", op.name, op.table)
            }
            Self::DropUniqueConstraint(op) => {
                format!("Drop unique constraint '{}' from table '{}'", op.name, op.table)
            }
            Self::AddCheckConstraint(op) => {
                format!("Add check constraint '{}' to table '{}'", op.name, op.table)
            }
            Self::DropCheckConstraint(op) => {
                format!("Drop check constraint '{}' from table '{}'", op.name, op.table)
            }
            Self::CreateIndex(op) => format!("Create index '{}' on table '{}'", op.name, op.table),
            Self::DropIndex(op) => format!("Drop index '{}'", op.name),
            Self::RenameIndex(op) => format!("Rename index '{}' to '{}'", op.name, op.new_name),
            Self::CreateTable(op) => format!("Create table '{}'", op.name),
            Self::DropTable(op) => format!("Drop table '{}'", op.name),
            Self::RenameTable(op) => format!(
                "Rename table '{}' to '{}'",
                op.name,
                op.new_name.as_deref().unwrap_or(&op.name)
            ),
            Self::AlterTable(op) => format!("Alter table '{}'", op.name),
            Self::EnsureSchema(op) => format!("Ensure schema '{}'", op.name),
            Self::DropSchema(op) => format!("Drop schema '{}'", op.name),
            Self::CreateSequence(op) => format!("Create sequence '{}'", op.name),
            Self::AlterSequence(op) => format!("Alter sequence '{}'", op.name),
            Self::DropSequence(op) => format!("Drop sequence '{}'", op.name),
            Self::RenameSequence(op) => format!("Rename sequence '{}'", op.name),
            Self::RestartSequence(op) => format!("Restart sequence '{}'", op.name),
            Self::InsertData(op) => format!("Insert data into table '{}'", op.table),
            Self::UpdateData(op) => format!("Update data in table '{}'", op.table),
            Self::DeleteData(op) => format!("Delete data from table '{}'", op.table),
            Self::Sql(_) => "Run custom SQL".to_string(),
            Self::AlterDatabase(_) => "Alter database".to_string(),
        }
    }
}

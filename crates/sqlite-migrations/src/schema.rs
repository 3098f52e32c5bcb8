//! Read-only relational snapshot.
//!
//! The rebuild planner consults the snapshot for the full shape of a table
//! (columns, keys, constraints and indexes) because incoming operations only
//! carry the part that changed.

use serde::{Deserialize, Serialize};

use crate::annotations::Annotations;
use crate::value::Value;

/// Read access to a schema model.
pub trait SchemaSnapshot {
    /// Finds a table by name and schema.
    ///
    /// SQLite has no schemas: a `None` schema on either side matches any.
    fn find_table(&self, name: &str, schema: Option<&str>) -> Option<&Table>;
}

/// Foreign key action (ON DELETE, ON UPDATE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReferentialAction {
    /// No action (error if referenced row is deleted/updated).
    #[default]
    NoAction,
    /// Restrict (same as NoAction but checked immediately).
    Restrict,
    /// Cascade the delete/update to referencing rows.
    Cascade,
    /// Set the foreign key column to NULL.
    SetNull,
    /// Set the foreign key column to its default value.
    SetDefault,
}

impl ReferentialAction {
    /// Returns the SQL representation of this action.
    #[must_use]
    pub fn to_sql(&self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// A column of a snapshot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Declared store type, e.g. `INTEGER` or `TEXT`.
    pub store_type: Option<String>,
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
    /// Explicit position hint. Ordered columns come first.
    pub order: Option<i32>,
    /// Column annotations.
    #[serde(default)]
    pub annotations: Annotations,
}

impl Column {
    /// Creates a nullable column.
    #[must_use]
    pub fn new(name: impl Into<String>, store_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store_type: Some(store_type.into()),
            is_nullable: true,
            default_value: None,
            default_value_sql: None,
            computed_column_sql: None,
            is_stored: None,
            comment: None,
            collation: None,
            order: None,
            annotations: Annotations::default(),
        }
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
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

    /// Sets the position hint.
    #[must_use]
    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// Sets the annotations.
    #[must_use]
    pub fn annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }
}

/// Primary key of a snapshot table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    /// Constraint name.
    pub name: Option<String>,
    /// Key columns.
    pub columns: Vec<String>,
}

/// Foreign key of a snapshot table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,
    /// Column(s) in the referencing table.
    pub columns: Vec<String>,
    /// Referenced table name.
    pub principal_table: String,
    /// Referenced table schema.
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

/// Unique constraint of a snapshot table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    /// Constraint name.
    pub name: String,
    /// Columns that form the unique constraint.
    pub columns: Vec<String>,
}

/// Check constraint of a snapshot table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConstraint {
    /// Constraint name.
    pub name: String,
    /// Check expression.
    pub sql: String,
}

/// Index of a snapshot table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Columns included in the index.
    pub columns: Vec<String>,
    /// Whether this is a unique index.
    #[serde(default)]
    pub is_unique: bool,
    /// Partial index condition (WHERE clause).
    pub filter: Option<String>,
}

/// A table of the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Schema name, ignored by SQLite.
    pub schema: Option<String>,
    /// Table comment.
    pub comment: Option<String>,
    /// Column definitions.
    pub columns: Vec<Column>,
    /// Primary key.
    pub primary_key: Option<PrimaryKey>,
    /// Foreign keys.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    /// Unique constraints other than the primary key.
    #[serde(default)]
    pub unique_constraints: Vec<UniqueConstraint>,
    /// Check constraints.
    #[serde(default)]
    pub check_constraints: Vec<CheckConstraint>,
    /// Indexes.
    #[serde(default)]
    pub indexes: Vec<Index>,
    /// Table annotations.
    #[serde(default)]
    pub annotations: Annotations,
}

impl Table {
    /// Creates an empty table.
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
            indexes: Vec::new(),
            annotations: Annotations::default(),
        }
    }

    /// Sets the schema.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Sets the comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Adds a column to the table.
    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Sets the primary key.
    #[must_use]
    pub fn primary_key(mut self, name: impl Into<String>, columns: &[&str]) -> Self {
        self.primary_key = Some(PrimaryKey {
            name: Some(name.into()),
            columns: columns.iter().map(ToString::to_string).collect(),
        });
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Adds a unique constraint.
    #[must_use]
    pub fn unique_constraint(mut self, name: impl Into<String>, columns: &[&str]) -> Self {
        self.unique_constraints.push(UniqueConstraint {
            name: name.into(),
            columns: columns.iter().map(ToString::to_string).collect(),
        });
        self
    }

    /// Adds a check constraint.
    #[must_use]
    pub fn check_constraint(mut self, name: impl Into<String>, sql: impl Into<String>) -> Self {
        self.check_constraints.push(CheckConstraint {
            name: name.into(),
            sql: sql.into(),
        });
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Sets the annotations.
    #[must_use]
    pub fn annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Gets an index by name.
    #[must_use]
    pub fn get_index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Columns in creation order: those with a position hint first, by
    /// ascending hint, then the rest in declaration order.
    #[must_use]
    pub fn ordered_columns(&self) -> Vec<&Column> {
        let mut ordered: Vec<&Column> = self.columns.iter().filter(|c| c.order.is_some()).collect();
        // Stable sort keeps declaration order among equal hints.
        ordered.sort_by_key(|c| c.order);
        ordered.extend(self.columns.iter().filter(|c| c.order.is_none()));
        ordered
    }
}

/// The target relational model (all tables).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationalModel {
    /// All tables in the model.
    pub tables: Vec<Table>,
}

impl RelationalModel {
    /// Creates a new empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table to the model.
    #[must_use]
    pub fn table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Returns table names.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }
}

impl SchemaSnapshot for RelationalModel {
    fn find_table(&self, name: &str, schema: Option<&str>) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name == name && schemas_match(t.schema.as_deref(), schema))
    }
}

/// Schemas are only compared when both sides name one.
pub(crate) fn schemas_match(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Builds a foreign key.
#[must_use]
pub fn foreign_key(
    name: impl Into<String>,
    columns: &[&str],
    principal_table: impl Into<String>,
    principal_columns: &[&str],
) -> ForeignKey {
    ForeignKey {
        name: name.into(),
        columns: columns.iter().map(ToString::to_string).collect(),
        principal_table: principal_table.into(),
        principal_schema: None,
        principal_columns: principal_columns.iter().map(ToString::to_string).collect(),
        on_update: ReferentialAction::NoAction,
        on_delete: ReferentialAction::NoAction,
    }
}

impl ForeignKey {
    /// Sets the ON DELETE action.
    #[must_use]
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = action;
        self
    }
}

impl Index {
    /// Creates a non-unique index.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(ToString::to_string).collect(),
            is_unique: false,
            filter: None,
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

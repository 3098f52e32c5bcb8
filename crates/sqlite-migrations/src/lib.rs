//! SQLite migration SQL generation.
//!
//! SQLite cannot drop columns, alter column definitions or add and remove
//! constraints on an existing table. `sqlite-migrations` takes a list of
//! schema-change operations and rewrites those it cannot run directly into
//! table rebuilds:
//!
//! 1. create a temporary table with the target definition,
//! 2. copy the data over,
//! 3. drop the old table and rename the temporary one,
//! 4. re-create the indexes.
//!
//! The rewritten list is then rendered to SQLite DDL and DML commands.
//!
//! # Architecture
//!
//! - **Operations** - Schema and data changes like `CreateTable`, `DropColumn`,
//!   `InsertData`, etc.
//! - **Schema** - The target model a migration leads to
//! - **Rebuild** - Rewrites operations SQLite cannot run into table rebuilds
//! - **Dialect** - Renders operations to SQL commands
//! - **Script** - Groups commands of migrations into one script
//!
//! # Example
//!
//! ```rust
//! use sqlite_migrations::prelude::*;
//!
//! let model = RelationalModel::new().table(
//!     Table::new("People")
//!         .column(Column::new("Id", "INTEGER").not_null())
//!         .primary_key("PK_People", &["Id"]),
//! );
//!
//! let commands = generate(
//!     &[MigrationOperation::drop_column("People", "Name")],
//!     Some(&model),
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     commands[0].command_text,
//!     "CREATE TABLE \"ef_temp_People\" (\n    \"Id\" INTEGER NOT NULL CONSTRAINT \"PK_People\" PRIMARY KEY\n);"
//! );
//! ```

pub mod annotations;
pub mod commands;
pub mod config;
pub mod dialect;
pub mod error;
pub mod logger;
pub mod operations;
pub mod rebuild;
pub mod schema;
pub mod script;
pub mod value;

use crate::commands::MigrationCommand;
use crate::dialect::{MigrationDialect, SqliteDialect};
use crate::error::Result;
use crate::operations::MigrationOperation;
use crate::schema::SchemaSnapshot;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::annotations::{AnnotationValue, Annotations};
    pub use crate::commands::{MigrationCommand, MigrationCommandListBuilder};
    pub use crate::config::GeneratorOptions;
    pub use crate::dialect::{MigrationDialect, SqliteDialect};
    pub use crate::error::{MigrateError, Result};
    pub use crate::generate;
    pub use crate::logger::{MigrationsLogger, RecordingLogger, TracingLogger};
    pub use crate::operations::{ColumnDefinition, CreateTableOperation, MigrationOperation};
    pub use crate::rebuild::RebuildPlanner;
    pub use crate::schema::{
        foreign_key, Column, Index, ReferentialAction, RelationalModel, SchemaSnapshot, Table,
    };
    pub use crate::script::{Migration, ScriptGenerator};
    pub use crate::value::Value;
}

/// Generates SQLite commands for `operations` with the default options.
///
/// `model` is the schema after the operations are applied. It is needed to
/// rebuild tables; without it, operations requiring a rebuild fail.
pub fn generate(
    operations: &[MigrationOperation],
    model: Option<&dyn SchemaSnapshot>,
) -> Result<Vec<MigrationCommand>> {
    SqliteDialect::new().generate(operations, model)
}

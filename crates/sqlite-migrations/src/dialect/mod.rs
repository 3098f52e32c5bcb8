//! Database dialect implementations.
//!
//! A dialect turns an operation list into executable commands, rewriting
//! whatever its database cannot run directly.

mod sqlite;

pub use sqlite::SqliteDialect;

use crate::commands::{MigrationCommand, MigrationCommandListBuilder};
use crate::error::Result;
use crate::operations::MigrationOperation;
use crate::schema::SchemaSnapshot;

/// Quotes an identifier (table name, column name, etc.), doubling any
/// embedded quote.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Trait for database-specific SQL generation.
pub trait MigrationDialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Generates the commands for an operation list.
    ///
    /// `model` is the schema the migration leads to. Without it, operations
    /// that need the full table definition cannot be generated.
    fn generate(
        &self,
        operations: &[MigrationOperation],
        model: Option<&dyn SchemaSnapshot>,
    ) -> Result<Vec<MigrationCommand>>;

    /// Appends the SQL of a single, already rewritten, operation.
    fn generate_operation(
        &self,
        operation: &MigrationOperation,
        model: Option<&dyn SchemaSnapshot>,
        builder: &mut MigrationCommandListBuilder,
    ) -> Result<()>;

    /// Quote an identifier (table name, column name, etc.).
    fn quote_identifier(&self, name: &str) -> String {
        quote_identifier(name)
    }
}

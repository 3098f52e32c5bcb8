//! Diagnostics raised while generating migration SQL.

use std::sync::Mutex;

use tracing::warn;

/// Receives migration diagnostics.
///
/// Implementations must not influence generation; they only observe.
pub trait MigrationsLogger: Send + Sync {
    /// A table rebuild absorbs an operation whose effect may differ from the
    /// one written in the migration (typically seed data or raw SQL).
    fn table_rebuild_pending(&self, table: &str, operation: &'static str);
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl MigrationsLogger for TracingLogger {
    fn table_rebuild_pending(&self, table: &str, operation: &'static str) {
        warn!(
            table = %table,
            operation = %operation,
            "An operation of type '{}' will be applied while a rebuild of table '{}' is pending. \
             The operation may not behave as expected",
            operation,
            table
        );
    }
}

/// A diagnostic recorded by [`RecordingLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildWarning {
    /// Table being rebuilt.
    pub table: String,
    /// Kind of the affected operation.
    pub operation: &'static str,
}

/// Keeps diagnostics in memory.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<RebuildWarning>>,
}

impl RecordingLogger {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded diagnostics in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<RebuildWarning> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl MigrationsLogger for RecordingLogger {
    fn table_rebuild_pending(&self, table: &str, operation: &'static str) {
        if let Ok(mut events) = self.events.lock() {
            events.push(RebuildWarning {
                table: table.to_string(),
                operation,
            });
        }
    }
}

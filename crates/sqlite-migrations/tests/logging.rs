//! Diagnostics emitted through `tracing`.

mod common;

use std::io;
use std::sync::{Arc, Mutex};

use common::{model, people};
use sqlite_migrations::prelude::*;

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture(level: tracing::Level, f: impl FnOnce()) -> String {
    let buffer = Buffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    buffer.contents()
}

#[test]
fn test_tracing_logger_warns_about_pending_rebuild() {
    let model = model(vec![people(vec![Column::new("Name", "TEXT")])]);
    let operations = [
        MigrationOperation::drop_column("People", "Foo"),
        MigrationOperation::sql("UPDATE \"People\" SET \"Name\" = 'x';"),
    ];

    let output = capture(tracing::Level::WARN, || {
        SqliteDialect::new()
            .generate(&operations, Some(&model))
            .unwrap();
    });

    assert!(output.contains("WARN"));
    assert!(output.contains("table=People"));
    assert!(output.contains("operation=SqlOperation"));
}

#[test]
fn test_generated_commands_are_logged() {
    let output = capture(tracing::Level::DEBUG, || {
        generate(&[MigrationOperation::drop_table("People")], None).unwrap();
    });

    assert!(output.contains("Generated migration command"));
    assert!(output.contains("DROP TABLE"));
}

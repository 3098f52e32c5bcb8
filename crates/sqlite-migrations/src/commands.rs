//! Executable migration commands.

use serde::{Deserialize, Serialize};

/// One executable SQL command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationCommand {
    /// SQL text, including the terminating `;`.
    pub command_text: String,
    /// Must run outside of a transaction.
    #[serde(default)]
    pub transaction_suppressed: bool,
}

impl MigrationCommand {
    /// Creates a command.
    #[must_use]
    pub fn new(command_text: impl Into<String>, transaction_suppressed: bool) -> Self {
        Self {
            command_text: command_text.into(),
            transaction_suppressed,
        }
    }
}

/// Accumulates SQL text into commands.
#[derive(Debug, Default)]
pub struct MigrationCommandListBuilder {
    buffer: String,
    commands: Vec<MigrationCommand>,
}

impl MigrationCommandListBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends text to the current command.
    pub fn append(&mut self, text: &str) -> &mut Self {
        self.buffer.push_str(text);
        self
    }

    /// Appends text followed by a newline.
    pub fn append_line(&mut self, text: &str) -> &mut Self {
        self.buffer.push_str(text);
        self.buffer.push('\n');
        self
    }

    /// Returns true if the current command has no text yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    /// Finishes the current command. Empty commands are discarded.
    pub fn end_command(&mut self, suppress_transaction: bool) -> &mut Self {
        let text = std::mem::take(&mut self.buffer);
        let text = text.trim_end();
        if !text.trim().is_empty() {
            self.commands
                .push(MigrationCommand::new(text, suppress_transaction));
        }
        self
    }

    /// Returns the finished commands, closing any pending one.
    #[must_use]
    pub fn into_commands(mut self) -> Vec<MigrationCommand> {
        self.end_command(false);
        self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_splits_commands() {
        let mut builder = MigrationCommandListBuilder::new();
        builder.append("DROP TABLE \"A\"").append_line(";");
        builder.end_command(false);
        builder.append_line("PRAGMA foreign_keys = 0;");
        builder.end_command(true);
        builder.end_command(false);

        let commands = builder.into_commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].command_text, "DROP TABLE \"A\";");
        assert!(!commands[0].transaction_suppressed);
        assert!(commands[1].transaction_suppressed);
    }

    #[test]
    fn test_pending_text_is_flushed() {
        let mut builder = MigrationCommandListBuilder::new();
        builder.append("SELECT 1;");
        assert!(!builder.is_empty());
        assert_eq!(builder.into_commands().len(), 1);
    }
}

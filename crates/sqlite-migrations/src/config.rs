//! Generator configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Prefix given to the temporary table of a rebuild.
pub const DEFAULT_TEMP_TABLE_PREFIX: &str = "ef_temp_";

/// Options controlling SQL generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Prefix of the temporary table created by a rebuild.
    pub temp_table_prefix: String,
    /// Generate commands that run outside of any transaction.
    pub no_transactions: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            temp_table_prefix: DEFAULT_TEMP_TABLE_PREFIX.to_string(),
            no_transactions: false,
        }
    }
}

impl GeneratorOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the temporary table prefix.
    #[must_use]
    pub fn temp_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_table_prefix = prefix.into();
        self
    }

    /// Disables transactions.
    #[must_use]
    pub fn no_transactions(mut self) -> Self {
        self.no_transactions = true;
        self
    }

    /// Parses options from JSON. Missing fields keep their default.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads options from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::MigrateError;

    #[test]
    fn test_defaults() {
        let options = GeneratorOptions::default();
        assert_eq!(options.temp_table_prefix, "ef_temp_");
        assert!(!options.no_transactions);
    }

    #[test]
    fn test_partial_json() {
        let options = GeneratorOptions::from_json(r#"{"no_transactions": true}"#).unwrap();
        assert!(options.no_transactions);
        assert_eq!(options.temp_table_prefix, DEFAULT_TEMP_TABLE_PREFIX);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"temp_table_prefix": "tmp_"}}"#).unwrap();

        let options = GeneratorOptions::from_path(file.path()).unwrap();
        assert_eq!(options.temp_table_prefix, "tmp_");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            GeneratorOptions::from_json("not json"),
            Err(MigrateError::Serialization(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            GeneratorOptions::from_path(dir.path().join("missing.json")),
            Err(MigrateError::Io(_))
        ));
    }
}

//! Literal values and their SQLite rendering.

use serde::{Deserialize, Serialize};

/// A literal value used for column defaults and seed data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean, stored by SQLite as 0/1.
    Bool(bool),
    /// 64-bit integer.
    Integer(i64),
    /// Double precision float.
    Real(f64),
    /// Text.
    Text(String),
    /// Binary data.
    Blob(Vec<u8>),
}

impl Value {
    /// Returns true for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

/// SQLite column affinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affinity {
    /// INTEGER affinity.
    Integer,
    /// TEXT affinity.
    Text,
    /// BLOB affinity (no conversion).
    Blob,
    /// REAL affinity.
    Real,
    /// NUMERIC affinity.
    Numeric,
}

impl Affinity {
    /// Determines the affinity of a declared column type.
    ///
    /// Rules are applied in order: `INT`, then `CHAR`/`CLOB`/`TEXT`, then
    /// `BLOB` or no type, then `REAL`/`FLOA`/`DOUB`, otherwise NUMERIC.
    #[must_use]
    pub fn of_store_type(store_type: Option<&str>) -> Self {
        let declared = store_type.unwrap_or_default().to_ascii_uppercase();

        if declared.contains("INT") {
            return Self::Integer;
        }
        if declared.contains("CHAR") || declared.contains("CLOB") || declared.contains("TEXT") {
            return Self::Text;
        }
        if declared.contains("BLOB") || declared.trim().is_empty() {
            return Self::Blob;
        }
        if declared.contains("REAL") || declared.contains("FLOA") || declared.contains("DOUB") {
            return Self::Real;
        }
        Self::Numeric
    }
}

/// Renders literals for a column's store type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMapping {
    affinity: Affinity,
}

impl TypeMapping {
    /// Creates the mapping for a declared store type.
    #[must_use]
    pub fn for_store_type(store_type: Option<&str>) -> Self {
        Self {
            affinity: Affinity::of_store_type(store_type),
        }
    }

    /// Returns the affinity this mapping renders for.
    #[must_use]
    pub fn affinity(&self) -> Affinity {
        self.affinity
    }

    /// Value used to backfill NULLs when a column becomes required and no
    /// explicit default was given.
    #[must_use]
    pub fn zero_value(&self) -> Value {
        match self.affinity {
            Affinity::Integer | Affinity::Numeric => Value::Integer(0),
            Affinity::Text => Value::Text(String::new()),
            Affinity::Real => Value::Real(0.0),
            Affinity::Blob => Value::Blob(Vec::new()),
        }
    }

    /// Renders a value as an SQL literal.
    #[must_use]
    pub fn generate_sql_literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Integer(i) => match self.affinity {
                Affinity::Real => format!("{i}.0"),
                _ => i.to_string(),
            },
            Value::Real(r) => real_literal(*r),
            Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Value::Blob(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }
}

fn real_literal(value: f64) -> String {
    if value.is_nan() {
        return "NULL".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "9e999" } else { "-9e999" }.to_string();
    }
    let text = value.to_string();
    if text.contains(['.', 'e', 'E']) {
        text
    } else {
        format!("{text}.0")
    }
}

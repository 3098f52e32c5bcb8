//! Annotations attached to operations and model elements.
//!
//! The keys SQLite generation interprets are stored as typed fields; anything
//! else lands in [`Annotations::extra`] and is carried along untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Whether an integer primary key column uses `AUTOINCREMENT`.
pub const AUTOINCREMENT: &str = "Sqlite:Autoincrement";
/// Key older migrations used for [`AUTOINCREMENT`].
pub const LEGACY_AUTOINCREMENT: &str = "Autoincrement";
/// Marks a column whose single-column primary key is declared inline.
pub const INLINE_PRIMARY_KEY: &str = "Sqlite:InlinePrimaryKey";
/// Constraint name of an inline primary key.
pub const INLINE_PRIMARY_KEY_NAME: &str = "Sqlite:InlinePrimaryKeyName";
/// Spatial reference id of a SpatiaLite geometry column.
pub const SRID: &str = "Sqlite:Srid";
/// Whether the SpatiaLite metadata tables have been initialized.
pub const INIT_SPATIAL_METADATA: &str = "Sqlite:InitSpatialMetaData";

/// A single annotation value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// String value.
    Text(String),
}

impl From<bool> for AnnotationValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AnnotationValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for AnnotationValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AnnotationValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Annotation bag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    /// `Sqlite:Autoincrement`.
    #[serde(rename = "Sqlite:Autoincrement", skip_serializing_if = "Option::is_none")]
    pub autoincrement: Option<bool>,
    /// `Autoincrement`, written by older migrations.
    #[serde(rename = "Autoincrement", skip_serializing_if = "Option::is_none")]
    pub legacy_autoincrement: Option<bool>,
    /// `Sqlite:InlinePrimaryKey`.
    #[serde(rename = "Sqlite:InlinePrimaryKey", skip_serializing_if = "Option::is_none")]
    pub inline_primary_key: Option<bool>,
    /// `Sqlite:InlinePrimaryKeyName`.
    #[serde(rename = "Sqlite:InlinePrimaryKeyName", skip_serializing_if = "Option::is_none")]
    pub inline_primary_key_name: Option<String>,
    /// `Sqlite:Srid`.
    #[serde(rename = "Sqlite:Srid", skip_serializing_if = "Option::is_none")]
    pub srid: Option<i32>,
    /// `Sqlite:InitSpatialMetaData`.
    #[serde(rename = "Sqlite:InitSpatialMetaData", skip_serializing_if = "Option::is_none")]
    pub init_spatial_metadata: Option<bool>,
    /// Annotations this crate does not interpret.
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, AnnotationValue>,
}

impl Annotations {
    /// Creates an empty annotation bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an annotation and returns the bag.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<AnnotationValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets an annotation by key.
    ///
    /// Known keys holding a value of the wrong type are kept in `extra`.
    pub fn set(&mut self, key: &str, value: impl Into<AnnotationValue>) {
        let value = value.into();
        match (key, value) {
            (AUTOINCREMENT, AnnotationValue::Bool(b)) => self.autoincrement = Some(b),
            (LEGACY_AUTOINCREMENT, AnnotationValue::Bool(b)) => {
                self.legacy_autoincrement = Some(b);
            }
            (INLINE_PRIMARY_KEY, AnnotationValue::Bool(b)) => self.inline_primary_key = Some(b),
            (INLINE_PRIMARY_KEY_NAME, AnnotationValue::Text(s)) => {
                self.inline_primary_key_name = Some(s);
            }
            (SRID, AnnotationValue::Integer(i)) if i32::try_from(i).is_ok() => {
                self.srid = i32::try_from(i).ok();
            }
            (INIT_SPATIAL_METADATA, AnnotationValue::Bool(b)) => {
                self.init_spatial_metadata = Some(b);
            }
            (key, value) => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }

    /// Looks an annotation up by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<AnnotationValue> {
        match key {
            AUTOINCREMENT if self.autoincrement.is_some() => {
                self.autoincrement.map(AnnotationValue::Bool)
            }
            LEGACY_AUTOINCREMENT if self.legacy_autoincrement.is_some() => {
                self.legacy_autoincrement.map(AnnotationValue::Bool)
            }
            INLINE_PRIMARY_KEY if self.inline_primary_key.is_some() => {
                self.inline_primary_key.map(AnnotationValue::Bool)
            }
            INLINE_PRIMARY_KEY_NAME if self.inline_primary_key_name.is_some() => self
                .inline_primary_key_name
                .clone()
                .map(AnnotationValue::Text),
            SRID if self.srid.is_some() => self.srid.map(|s| AnnotationValue::Integer(s.into())),
            INIT_SPATIAL_METADATA if self.init_spatial_metadata.is_some() => {
                self.init_spatial_metadata.map(AnnotationValue::Bool)
            }
            _ => self.extra.get(key).cloned(),
        }
    }

    /// Returns true if the column is flagged as `AUTOINCREMENT` under either
    /// the current or the legacy key.
    #[must_use]
    pub fn is_autoincrement(&self) -> bool {
        self.autoincrement
            .or(self.legacy_autoincrement)
            .unwrap_or(false)
    }

    /// Returns true if no annotation is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

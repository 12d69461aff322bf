//! Warehouse table schema
//!
//! The fixed nested schema of the analytics table. It mirrors the export
//! row shape one-to-one; loads are always submitted against this schema.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A bulk-load table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Top-level fields
    pub fields: Vec<TableField>,
}

/// One field of a table schema, possibly nested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableField {
    /// Field name as it appears in the NDJSON rows
    pub name: String,

    /// Field type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Field mode
    #[serde(default)]
    pub mode: FieldMode,

    /// Child fields, for `Record` types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<TableField>,
}

impl TableField {
    /// Create a nullable field
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            mode: FieldMode::Nullable,
            fields: Vec::new(),
        }
    }

    /// Create a repeated record field with children
    pub fn repeated_record(name: impl Into<String>, fields: Vec<TableField>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Record,
            mode: FieldMode::Repeated,
            fields,
        }
    }

    /// Mark this field required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.mode = FieldMode::Required;
        self
    }
}

/// Field data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Float,
    Boolean,
    Timestamp,
    Json,
    Record,
}

/// Field mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    #[default]
    Nullable,
    Required,
    Repeated,
}

/// The fixed schema of the sessions table
pub fn session_table_schema() -> &'static TableSchema {
    static SCHEMA: Lazy<TableSchema> = Lazy::new(|| TableSchema {
        fields: vec![
            TableField::new("startTime", FieldType::Timestamp).required(),
            TableField::new("length", FieldType::Float).required(),
            TableField::new("userAnalyticsId", FieldType::String),
            TableField::new("platform", FieldType::String),
            TableField::new("os", FieldType::String),
            TableField::new("screenSize", FieldType::String),
            TableField::repeated_record(
                "scenes",
                vec![
                    TableField::new("startTime", FieldType::Timestamp).required(),
                    TableField::new("length", FieldType::Float).required(),
                    TableField::new("name", FieldType::String),
                    TableField::new("loadTime", FieldType::Float),
                    TableField::new("dropout", FieldType::Boolean),
                    TableField::repeated_record(
                        "events",
                        vec![
                            TableField::new("time", FieldType::Timestamp).required(),
                            TableField::new("name", FieldType::String),
                            TableField::new("data", FieldType::Json),
                            TableField::new("type", FieldType::String),
                        ],
                    ),
                ],
            ),
        ],
    });
    &SCHEMA
}

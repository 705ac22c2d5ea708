//! Edit deltas.
//!
//! A delta describes one round of changes to a table of records: field
//! updates by position, positions to delete, and rows to append. Deltas are
//! applied to the current edited collection, never to the generated one.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Deserialize;

use datacat_core::{ColumnRecord, FieldError, TableRecord};

use crate::catalog::Notice;
use crate::error::EngineError;

/// A cell value as typed in an edits file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EditValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for EditValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for EditValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

pub type RowEdit = BTreeMap<String, EditValue>;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EditDelta {
    /// Position (as a string key) to field updates
    #[serde(default)]
    pub edited_rows: BTreeMap<String, RowEdit>,
    #[serde(default)]
    pub added_rows: Vec<RowEdit>,
    #[serde(default)]
    pub deleted_rows: Vec<usize>,
}

impl EditDelta {
    pub fn is_empty(&self) -> bool {
        self.edited_rows.is_empty() && self.added_rows.is_empty() && self.deleted_rows.is_empty()
    }

    pub fn edit(mut self, position: usize, field: &str, value: impl Into<EditValue>) -> Self {
        self.edited_rows
            .entry(position.to_string())
            .or_default()
            .insert(field.to_string(), value.into());
        self
    }

    pub fn add(mut self, row: &[(&str, &str)]) -> Self {
        self.added_rows
            .push(row.iter().map(|(k, v)| (k.to_string(), EditValue::from(*v))).collect());
        self
    }

    pub fn delete(mut self, position: usize) -> Self {
        self.deleted_rows.push(position);
        self
    }
}

/// A record that can be edited field by field.
pub trait EditableRow {
    fn set_field(&mut self, name: &str, value: &str) -> Result<(), FieldError>;
}

impl EditableRow for TableRecord {
    fn set_field(&mut self, name: &str, value: &str) -> Result<(), FieldError> {
        self.set_by_name(name, value)
    }
}

impl EditableRow for ColumnRecord {
    fn set_field(&mut self, name: &str, value: &str) -> Result<(), FieldError> {
        self.set_by_name(name, value)
    }
}

/// Apply `delta` to `rows`: edits, then deletions, then additions.
///
/// Deletion positions refer to the collection as it was before any row was
/// removed. Bad positions and rejected values are skipped and reported.
/// `new_row` builds the blank record for each addition, given the rows
/// present at that moment.
pub fn apply_delta<R, F>(rows: &mut Vec<R>, delta: &EditDelta, scope: &str, mut new_row: F) -> Vec<Notice>
where
    R: EditableRow,
    F: FnMut(&[R]) -> R,
{
    let mut notices = Vec::new();

    for (key, fields) in &delta.edited_rows {
        let Some(row) = key.trim().parse::<usize>().ok().and_then(|i| rows.get_mut(i)) else {
            notices.push(Notice::new(scope, format!("edited row {} does not exist", key)));
            continue;
        };
        for (field, value) in fields {
            if let Err(e) = row.set_field(field, &value.to_string()) {
                notices.push(Notice::new(scope, format!("row {}: {}", key, e)));
            }
        }
    }

    let mut doomed = BTreeSet::new();
    for &position in &delta.deleted_rows {
        if position < rows.len() {
            doomed.insert(position);
        } else {
            notices.push(Notice::new(scope, format!("deleted row {} does not exist", position)));
        }
    }
    for position in doomed.into_iter().rev() {
        rows.remove(position);
    }

    for fields in &delta.added_rows {
        let mut row = new_row(rows);
        for (field, value) in fields {
            let value = value.to_string();
            if let Err(e) = row.set_field(field, &value) {
                // Identifier columns come back filled when a whole row is pasted
                if !matches!(e, FieldError::ReadOnly(_)) || !value.trim().is_empty() {
                    notices.push(Notice::new(scope, format!("added row: {}", e)));
                }
            }
        }
        rows.push(row);
    }

    if !delta.is_empty() {
        log::debug!("{}: applied delta, {} row(s) now", scope, rows.len());
    }
    notices
}

/// A whole edits file: one delta for the metadata table and one per
/// dictionary, keyed by table id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SessionEdits {
    #[serde(default)]
    pub metadata: EditDelta,
    #[serde(default)]
    pub dictionaries: BTreeMap<String, EditDelta>,
}

impl SessionEdits {
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        serde_json::from_str(text).map_err(|e| EngineError::EditsParse(e.to_string()))
    }

    pub fn from_toml(text: &str) -> Result<Self, EngineError> {
        toml::from_str(text).map_err(|e| EngineError::EditsParse(e.to_string()))
    }

    /// Parse by file extension: `.toml` is TOML, anything else JSON.
    pub fn parse(text: &str, extension: &str) -> Result<Self, EngineError> {
        if extension.eq_ignore_ascii_case("toml") {
            Self::from_toml(text)
        } else {
            Self::from_json(text)
        }
    }
}

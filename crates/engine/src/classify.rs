//! Classification capability.
//!
//! The catalog builder only knows this trait: given a table sample and an
//! optional context note, return a description of the table and its
//! columns. The HTTP client lives in `datacat-classifier`; tests use stubs.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upper bound on the table description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRequest {
    pub table_name: String,
    /// Column-oriented sample, see [`crate::sample::sample_frame`]
    pub sample: Value,
    pub context: Option<String>,
}

impl ClassificationRequest {
    pub fn sample_json(&self) -> String {
        self.sample.to_string()
    }
}

/// Structured classification result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    #[serde(default)]
    pub table_description: String,
    #[serde(default)]
    pub columns: Vec<ColumnSuggestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSuggestion {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Raw type label; mapped onto the closed column-type set by the builder
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TableMetadata {
    /// Clamp the description to [`MAX_DESCRIPTION_CHARS`] on a char boundary.
    pub fn normalized(mut self) -> Self {
        if let Some((cut, _)) = self.table_description.char_indices().nth(MAX_DESCRIPTION_CHARS) {
            self.table_description.truncate(cut);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyError {
    /// Provider is not configured or disabled.
    Unavailable(String),
    /// Could not reach the provider.
    Network(String),
    /// Provider answered with a non-success status.
    Http(u16, String),
    /// Response was not the expected JSON document.
    Malformed(String),
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "classifier unavailable: {}", msg),
            Self::Network(msg) => write!(f, "network error: {}", msg),
            Self::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            Self::Malformed(msg) => write!(f, "malformed classifier response: {}", msg),
        }
    }
}

impl std::error::Error for ClassifyError {}

pub trait Classifier {
    fn classify(&self, request: &ClassificationRequest) -> Result<TableMetadata, ClassifyError>;
}

impl<C: Classifier + ?Sized> Classifier for &C {
    fn classify(&self, request: &ClassificationRequest) -> Result<TableMetadata, ClassifyError> {
        (**self).classify(request)
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn classify(&self, request: &ClassificationRequest) -> Result<TableMetadata, ClassifyError> {
        (**self).classify(request)
    }
}

/// Parse a model reply into [`TableMetadata`]. Tolerates surrounding
/// whitespace and a fenced ```json block.
pub fn parse_metadata(raw: &str) -> Result<TableMetadata, ClassifyError> {
    let mut body = raw.trim();
    if let Some(rest) = body.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        body = rest.strip_suffix("```").unwrap_or(rest).trim();
    }
    serde_json::from_str::<TableMetadata>(body)
        .map(TableMetadata::normalized)
        .map_err(|e| ClassifyError::Malformed(e.to_string()))
}

// ---------------------------------------------------------------------------
// Memoization
// ---------------------------------------------------------------------------

type MemoKey = (String, String, Option<String>);

/// In-process memo over another classifier, keyed by the exact request
/// (table name, sample, context). Failures are not memoized.
///
/// Not `Sync`: one memo per session.
pub struct Memoized<C> {
    inner: C,
    memo: RefCell<HashMap<MemoKey, TableMetadata>>,
    calls: Cell<usize>,
}

impl<C: Classifier> Memoized<C> {
    pub fn new(inner: C) -> Self {
        Self { inner, memo: RefCell::new(HashMap::new()), calls: Cell::new(0) }
    }

    /// Number of requests forwarded to the wrapped classifier.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl<C: Classifier> Classifier for Memoized<C> {
    fn classify(&self, request: &ClassificationRequest) -> Result<TableMetadata, ClassifyError> {
        let key = (request.table_name.clone(), request.sample_json(), request.context.clone());
        if let Some(hit) = self.memo.borrow().get(&key) {
            log::debug!("memo hit for '{}'", request.table_name);
            return Ok(hit.clone());
        }

        self.calls.set(self.calls.get() + 1);
        let result = self.inner.classify(request)?;
        self.memo.borrow_mut().insert(key, result.clone());
        Ok(result)
    }
}

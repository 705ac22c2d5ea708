// Offline classifier: column types from the sample values, no descriptions

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use datacat_core::ColumnType;

use crate::classify::{ClassificationRequest, Classifier, ClassifyError, ColumnSuggestion, TableMetadata};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M"];

/// Deterministic stand-in for the language model. Every sample key becomes a
/// column whose type is inferred from its non-null values.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl Classifier for HeuristicClassifier {
    fn classify(&self, request: &ClassificationRequest) -> Result<TableMetadata, ClassifyError> {
        let object = request
            .sample
            .as_object()
            .ok_or_else(|| ClassifyError::Malformed("sample is not a JSON object".into()))?;

        let columns = object
            .iter()
            .map(|(name, values)| ColumnSuggestion {
                name: name.clone(),
                kind: Some(infer_type(values).label().to_string()),
                ..Default::default()
            })
            .collect();

        Ok(TableMetadata { table_description: String::new(), columns })
    }
}

/// Type of a sampled column. Columns with no values at all are text.
pub fn infer_type(values: &Value) -> ColumnType {
    let present: Vec<&Value> = match values {
        Value::Array(items) => items.iter().filter(|v| !v.is_null()).collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    };
    if present.is_empty() {
        return ColumnType::Texto;
    }

    if present.iter().all(|v| is_numeric(v)) {
        ColumnType::Numero
    } else if present.iter().all(|v| v.as_str().is_some_and(looks_like_date)) {
        ColumnType::Fecha
    } else {
        ColumnType::Texto
    }
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => {
            let t = s.trim();
            !t.is_empty() && t.parse::<f64>().is_ok_and(f64::is_finite)
        }
        _ => false,
    }
}

fn looks_like_date(raw: &str) -> bool {
    let raw = raw.trim();
    DATE_FORMATS.iter().any(|f| NaiveDate::parse_from_str(raw, f).is_ok())
        || DATETIME_FORMATS.iter().any(|f| NaiveDateTime::parse_from_str(raw, f).is_ok())
}

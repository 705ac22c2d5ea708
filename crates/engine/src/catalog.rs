//! Batch catalog construction.
//!
//! One pass over the selected source tables, in order: sample, classify,
//! detect the unique identifier and emit one metadata record plus the
//! dictionary rows suggested for it.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use datacat_core::{attribute_id, table_id, ColumnRecord, ColumnType, SourceTable, TableRecord};

use crate::classify::{ClassificationRequest, Classifier, ColumnSuggestion, TableMetadata};
use crate::identifier::unique_identifier_label;
use crate::sample::{sample_frame, DEFAULT_SAMPLE_ROWS, DEFAULT_SAMPLE_SEED};

#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub sample_rows: usize,
    pub sample_seed: u64,
    /// Stamped into `date_register` and `date_modified`
    pub registered_on: NaiveDate,
}

impl CatalogOptions {
    pub fn new(registered_on: NaiveDate) -> Self {
        Self {
            sample_rows: DEFAULT_SAMPLE_ROWS,
            sample_seed: DEFAULT_SAMPLE_SEED,
            registered_on,
        }
    }

    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }
}

/// Something the user should know about that did not stop the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Table id, file name, or edit target the notice is about
    pub scope: String,
    pub message: String,
}

impl Notice {
    pub fn new(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self { scope: scope.into(), message: message.into() }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.scope, self.message)
    }
}

/// Generated records for one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub tables: Vec<TableRecord>,
    pub columns: Vec<ColumnRecord>,
    pub notices: Vec<Notice>,
}

impl Catalog {
    /// Generated dictionary rows for one table, in attribute order.
    pub fn columns_for<'a>(&'a self, table_id: &'a str) -> impl Iterator<Item = &'a ColumnRecord> + 'a {
        self.columns.iter().filter(move |c| c.table_id == table_id)
    }
}

pub fn build_catalog<C: Classifier + ?Sized>(
    sources: &[SourceTable],
    context: Option<&str>,
    classifier: &C,
    options: &CatalogOptions,
) -> Catalog {
    let mut catalog = Catalog::default();
    let registered = options.registered_on.format("%Y-%m-%d").to_string();
    let context = context.map(str::trim).filter(|c| !c.is_empty()).map(String::from);

    for (i, source) in sources.iter().enumerate() {
        let id = table_id(i + 1);
        let request = ClassificationRequest {
            table_name: source.table_name.clone(),
            sample: sample_frame(&source.frame, options.sample_rows, options.sample_seed),
            context: context.clone(),
        };

        let metadata = match classifier.classify(&request) {
            Ok(metadata) => metadata.normalized(),
            Err(e) => {
                log::warn!("classification failed for {} ({}): {}", id, source.table_name, e);
                catalog.notices.push(Notice::new(
                    &id,
                    format!("could not classify '{}': {}", source.table_name, e),
                ));
                TableMetadata::default()
            }
        };

        let mut record = TableRecord::new(&id);
        record.table_name = source.table_name.clone();
        record.file_name = source.file_name.clone();
        record.format = source.format.clone();
        record.table_description = metadata.table_description;
        record.date_register = registered.clone();
        record.date_modified = registered.clone();
        record.unique_identifier = unique_identifier_label(&source.frame);

        log::debug!(
            "{} '{}': {} column suggestion(s), identifier {}",
            id,
            record.table_name,
            metadata.columns.len(),
            record.unique_identifier
        );

        catalog.columns.extend(
            metadata
                .columns
                .into_iter()
                .enumerate()
                .map(|(j, suggestion)| column_record(&id, j + 1, suggestion)),
        );
        catalog.tables.push(record);
    }

    catalog
}

fn column_record(table_id: &str, index: usize, suggestion: ColumnSuggestion) -> ColumnRecord {
    fn non_blank(value: Option<String>) -> Option<String> {
        value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    ColumnRecord {
        table_id: table_id.to_string(),
        attribute_id: attribute_id(index),
        name: suggestion.name,
        description: suggestion.description,
        data_type: suggestion.kind.as_deref().and_then(ColumnType::parse),
        new_name: non_blank(suggestion.new_name),
        reason: non_blank(suggestion.reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassifyError;
    use datacat_core::{CellValue, Frame};

    struct Fixed;

    impl Classifier for Fixed {
        fn classify(&self, request: &ClassificationRequest) -> Result<TableMetadata, ClassifyError> {
            if request.table_name == "roto" {
                return Err(ClassifyError::Malformed("not json".into()));
            }
            Ok(TableMetadata {
                table_description: format!("Tabla {}", request.table_name),
                columns: vec![
                    ColumnSuggestion {
                        name: "id".into(),
                        description: "Identificador".into(),
                        kind: Some("number".into()),
                        new_name: Some("  ".into()),
                        reason: None,
                    },
                    ColumnSuggestion {
                        name: "nom".into(),
                        description: "Nombre".into(),
                        kind: Some("tipo_dato.texto".into()),
                        new_name: Some("nombre".into()),
                        reason: Some("Más descriptivo".into()),
                    },
                ],
            })
        }
    }

    fn source(name: &str) -> SourceTable {
        SourceTable {
            file_name: "libro.xlsx".into(),
            table_name: name.into(),
            format: "xlsx".into(),
            fingerprint: "blake3:00".into(),
            frame: Frame::from_rows(
                vec!["id".into(), "nom".into()],
                vec![
                    vec![Some(CellValue::Int(1)), Some(CellValue::Text("a".into()))],
                    vec![Some(CellValue::Int(2)), Some(CellValue::Text("a".into()))],
                ],
            ),
        }
    }

    fn options() -> CatalogOptions {
        CatalogOptions::new(NaiveDate::from_ymd_opt(2024, 5, 6).unwrap())
    }

    #[test]
    fn assigns_ids_in_source_order() {
        let catalog = build_catalog(&[source("b"), source("a"), source("c")], None, &Fixed, &options());
        let ids: Vec<_> = catalog.tables.iter().map(|t| (t.table_id.as_str(), t.table_name.as_str())).collect();
        assert_eq!(ids, vec![("T001", "b"), ("T002", "a"), ("T003", "c")]);
        assert!(catalog.notices.is_empty());
    }

    #[test]
    fn fills_record_from_source_and_classifier() {
        let catalog = build_catalog(&[source("ventas")], Some("area comercial"), &Fixed, &options());
        let t = &catalog.tables[0];
        assert_eq!(t.table_description, "Tabla ventas");
        assert_eq!(t.format, "xlsx");
        assert_eq!(t.file_name, "libro.xlsx");
        assert_eq!(t.date_register, "2024-05-06");
        assert_eq!(t.date_modified, "2024-05-06");
        assert_eq!(t.unique_identifier, "id");
        assert_eq!(t.data_privacy, None);

        let cols: Vec<_> = catalog.columns_for("T001").collect();
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0].attribute_id, "a001");
        assert_eq!(cols[0].data_type, Some(ColumnType::Numero));
        assert_eq!(cols[0].new_name, None);
        assert_eq!(cols[1].attribute_id, "a002");
        assert_eq!(cols[1].data_type, Some(ColumnType::Texto));
        assert_eq!(cols[1].new_name.as_deref(), Some("nombre"));
    }

    #[test]
    fn classification_failure_degrades_to_empty_metadata() {
        let catalog = build_catalog(&[source("roto"), source("ok")], None, &Fixed, &options());
        assert_eq!(catalog.tables.len(), 2);
        assert_eq!(catalog.tables[0].table_description, "");
        assert_eq!(catalog.columns_for("T001").count(), 0);
        assert_eq!(catalog.columns_for("T002").count(), 2);
        assert_eq!(catalog.notices.len(), 1);
        assert_eq!(catalog.notices[0].scope, "T001");
    }
}

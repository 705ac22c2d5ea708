//! Consolidation of the edited catalog into its two export sheets.

use std::collections::BTreeMap;

use serde::Serialize;

use datacat_core::{ColumnField, ColumnRecord, TableField, TableRecord};

use crate::completeness::score;
use crate::steward::append_domain;

pub const METADATA_SHEET: &str = "METADATOS";
pub const DICTIONARY_SHEET: &str = "DICCIONARIO";
pub const COMPLETENESS_HEADER: &str = "% Completitud";
pub const DEFAULT_EXPORT_FILE: &str = "catalogo_metadatos_diccionario.xlsx";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportValue {
    Text(String),
    Number(f64),
}

impl ExportValue {
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<ExportValue>>,
}

/// The two sheets of an exported catalog, metadata first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogExport {
    pub sheets: Vec<ExportSheet>,
}

impl CatalogExport {
    pub fn metadata(&self) -> &ExportSheet {
        &self.sheets[0]
    }

    pub fn dictionary(&self) -> &ExportSheet {
        &self.sheets[1]
    }

    /// Content hash over sheet names, headers and cells.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for sheet in &self.sheets {
            hasher.update(b"sheet\0");
            hasher.update(sheet.name.as_bytes());
            for header in &sheet.headers {
                hasher.update(b"\x1f");
                hasher.update(header.as_bytes());
            }
            for row in &sheet.rows {
                hasher.update(b"\x1e");
                for cell in row {
                    match cell {
                        ExportValue::Text(s) => {
                            hasher.update(b"\x1fs");
                            hasher.update(s.as_bytes());
                        }
                        ExportValue::Number(n) => {
                            hasher.update(b"\x1fn");
                            hasher.update(&n.to_bits().to_le_bytes());
                        }
                    }
                }
            }
        }
        format!("blake3:{}", hasher.finalize().to_hex())
    }
}

/// Dictionary rows in metadata order: for each table, its edited dictionary
/// when one exists (even if empty), otherwise the generated rows. Rows of
/// tables that are no longer in the metadata are dropped.
pub fn merged_dictionary(
    tables: &[TableRecord],
    generated: &[ColumnRecord],
    edited: &BTreeMap<String, Vec<ColumnRecord>>,
) -> Vec<ColumnRecord> {
    let mut merged = Vec::new();
    for table in tables {
        match edited.get(&table.table_id) {
            Some(rows) => merged.extend(rows.iter().cloned()),
            None => merged.extend(generated.iter().filter(|c| c.table_id == table.table_id).cloned()),
        }
    }
    merged
}

pub fn consolidate(
    tables: &[TableRecord],
    generated: &[ColumnRecord],
    edited: &BTreeMap<String, Vec<ColumnRecord>>,
    domain: &str,
) -> CatalogExport {
    let mut meta_headers: Vec<String> = TableField::ALL.iter().map(|f| f.name().to_string()).collect();
    meta_headers.push(COMPLETENESS_HEADER.to_string());

    let meta_rows = tables
        .iter()
        .map(|table| {
            let mut row: Vec<ExportValue> = TableField::ALL
                .iter()
                .map(|&field| {
                    let value = table.get(field);
                    if TableField::STEWARDS.contains(&field) {
                        ExportValue::Text(append_domain(&value, domain))
                    } else {
                        ExportValue::Text(value)
                    }
                })
                .collect();
            row.push(ExportValue::Number(score(table).percent));
            row
        })
        .collect();

    let dict_rows = merged_dictionary(tables, generated, edited)
        .iter()
        .map(|column| ColumnField::ALL.iter().map(|&f| ExportValue::Text(column.get(f))).collect())
        .collect();

    CatalogExport {
        sheets: vec![
            ExportSheet { name: METADATA_SHEET.to_string(), headers: meta_headers, rows: meta_rows },
            ExportSheet {
                name: DICTIONARY_SHEET.to_string(),
                headers: ColumnField::ALL.iter().map(|f| f.header().to_string()).collect(),
                rows: dict_rows,
            },
        ],
    }
}

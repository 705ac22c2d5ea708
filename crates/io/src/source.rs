// Source loading: files and sheet selection to catalog-ready tables

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use datacat_core::SourceTable;

use crate::{csv, xlsx};

/// Extensions read as delimited text.
pub const TEXT_FORMATS: &[&str] = &["csv", "tsv", "txt"];

/// Extensions read as workbooks.
pub const WORKBOOK_FORMATS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

#[derive(Debug, Default)]
pub struct LoadResult {
    /// In file order, then selection order within each workbook
    pub tables: Vec<SourceTable>,
    /// Files or sheets that were skipped, with the reason
    pub warnings: Vec<String>,
}

/// Lower-case extension of a path, empty when there is none.
pub fn format_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

pub fn fingerprint(bytes: &[u8]) -> String {
    format!("blake3:{}", blake3::hash(bytes).to_hex())
}

/// Load every readable table from `paths`.
///
/// With an empty `selection` every selectable sheet of each workbook is
/// loaded in workbook order. Otherwise each workbook contributes the
/// selected sheets it has, in selection order; a name selected twice is
/// loaded once. Unreadable or unsupported files are skipped with a warning
/// and do not stop the others.
pub fn load_sources(paths: &[PathBuf], selection: &[String]) -> LoadResult {
    let mut result = LoadResult::default();
    let mut requested: HashSet<&str> = HashSet::new();
    let selection: Vec<&str> = selection.iter().map(|s| s.trim()).filter(|s| requested.insert(*s)).collect();
    let mut matched: HashSet<&str> = HashSet::new();
    let mut saw_workbook = false;

    for path in paths {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let format = format_of(path);

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                result.warnings.push(format!("{}: {}", file_name, e));
                continue;
            }
        };
        let fingerprint = fingerprint(&bytes);

        if TEXT_FORMATS.contains(&format.as_str()) {
            let content = csv::decode_bytes(bytes);
            let delimiter = if format == "tsv" { b'\t' } else { csv::sniff_delimiter(&content) };
            match csv::import_from_string(&content, delimiter) {
                Ok(frame) => result.tables.push(SourceTable {
                    table_name: file_stem(path),
                    file_name,
                    format,
                    fingerprint,
                    frame,
                }),
                Err(e) => result.warnings.push(format!("{}: {}", file_name, e)),
            }
        } else if WORKBOOK_FORMATS.contains(&format.as_str()) {
            saw_workbook = true;
            let available = match xlsx::list_sheets(path) {
                Ok(names) => xlsx::selectable_sheets(&names),
                Err(e) => {
                    result.warnings.push(format!("{}: {}", file_name, e));
                    continue;
                }
            };

            let chosen: Vec<String> = if selection.is_empty() {
                available
            } else {
                selection
                    .iter()
                    .filter(|s| available.iter().any(|a| a == *s))
                    .map(|s| s.to_string())
                    .collect()
            };
            for name in &selection {
                if chosen.iter().any(|c| c == name) {
                    matched.insert(*name);
                }
            }

            for sheet in chosen {
                match xlsx::import_sheet(path, &sheet) {
                    Ok(frame) => result.tables.push(SourceTable {
                        file_name: file_name.clone(),
                        table_name: sheet,
                        format: format.clone(),
                        fingerprint: fingerprint.clone(),
                        frame,
                    }),
                    Err(e) => result.warnings.push(format!("{} [{}]: {}", file_name, sheet, e)),
                }
            }
        } else {
            result.warnings.push(format!("{}: unsupported format '{}'", file_name, format));
        }
    }

    if saw_workbook {
        for name in &selection {
            if !matched.contains(*name) {
                let reason = if xlsx::is_reserved_sheet(name) { "is reserved" } else { "was not found" };
                result.warnings.push(format!("sheet '{}' {}", name, reason));
            }
        }
    }

    log::debug!("loaded {} table(s), {} warning(s)", result.tables.len(), result.warnings.len());
    result
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

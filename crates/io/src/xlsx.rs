// Workbook import (calamine) and catalog export (rust_xlsxwriter)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};

use datacat_core::{is_na_token, CellValue, ColumnField, ColumnRecord, Frame, TableField, TableRecord};
use datacat_engine::consolidate::{CatalogExport, ExportSheet, ExportValue, DICTIONARY_SHEET, METADATA_SHEET};

use crate::xlsx_validation;

/// Sheets an exported catalog writes. Never offered as sources.
pub const RESERVED_SHEETS: [&str; 2] = [METADATA_SHEET, DICTIONARY_SHEET];

pub fn is_reserved_sheet(name: &str) -> bool {
    let name = name.trim();
    RESERVED_SHEETS.iter().any(|r| r.eq_ignore_ascii_case(name))
}

/// Sheet names in workbook order, reserved names removed.
pub fn selectable_sheets(names: &[String]) -> Vec<String> {
    names.iter().filter(|n| !is_reserved_sheet(n)).cloned().collect()
}

fn open(path: &Path) -> Result<Sheets<std::io::BufReader<std::fs::File>>, String> {
    open_workbook_auto(path).map_err(|e| format!("Failed to open workbook: {}", e))
}

pub fn list_sheets(path: &Path) -> Result<Vec<String>, String> {
    let workbook = open(path)?;
    let names = workbook.sheet_names().to_vec();
    if names.is_empty() {
        return Err("Workbook contains no sheets".to_string());
    }
    Ok(names)
}

/// Read one sheet into a frame. The first row of the used range is the
/// header; fully empty data rows are dropped.
pub fn import_sheet(path: &Path, sheet_name: &str) -> Result<Frame, String> {
    let mut workbook = open(path)?;
    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;
    Ok(range_to_frame(&range))
}

fn range_to_frame(range: &Range<Data>) -> Frame {
    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(cell_text).collect(),
        None => return Frame::default(),
    };

    let data: Vec<Vec<Option<CellValue>>> = rows
        .map(|row| row.iter().map(cell_value).collect::<Vec<_>>())
        .filter(|row| row.iter().any(Option::is_some))
        .collect();

    Frame::from_rows(header, data)
}

fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.trim().is_empty() || is_na_token(s) => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Float(n) => Some(CellValue::number(*n)),
        Data::Int(n) => Some(CellValue::Int(*n)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if datetime.time() == chrono::NaiveTime::MIN => {
                Some(CellValue::Text(datetime.format("%Y-%m-%d").to_string()))
            }
            Some(datetime) => Some(CellValue::Text(datetime.format("%Y-%m-%d %H:%M:%S").to_string())),
            None => Some(CellValue::number(dt.as_f64())),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
    }
}

/// Headers and catalog cells: strings verbatim, so a column named "NA" keeps its name.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) if !s.trim().is_empty() => s.clone(),
        other => cell_value(other).map(|v| v.to_string()).unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Catalog export
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct ExportResult {
    pub sheets_exported: usize,
    pub rows_exported: usize,
    pub validations_exported: usize,
}

pub fn write_catalog(export: &CatalogExport, path: &Path) -> Result<ExportResult, String> {
    let (mut workbook, result) = build_workbook(export)?;
    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    Ok(result)
}

/// Same workbook as [`write_catalog`], in memory.
pub fn catalog_to_buffer(export: &CatalogExport) -> Result<Vec<u8>, String> {
    let (mut workbook, _) = build_workbook(export)?;
    workbook
        .save_to_buffer()
        .map_err(|e| format!("Failed to build XLSX buffer: {}", e))
}

fn build_workbook(export: &CatalogExport) -> Result<(XlsxWorkbook, ExportResult), String> {
    let mut workbook = XlsxWorkbook::new();
    let mut result = ExportResult::default();
    let header_format = Format::new().set_bold();

    for sheet in &export.sheets {
        let worksheet = workbook
            .add_worksheet()
            .set_name(&sheet.name)
            .map_err(|e| format!("Failed to create sheet '{}': {}", sheet.name, e))?;

        write_sheet(worksheet, sheet, &header_format)?;
        result.validations_exported += xlsx_validation::add_catalog_validations(worksheet, sheet)?;
        result.rows_exported += sheet.rows.len();
        result.sheets_exported += 1;
    }

    Ok((workbook, result))
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &ExportSheet, header_format: &Format) -> Result<(), String> {
    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, header_format)
            .map_err(|e| format!("Failed to write header '{}': {}", header, e))?;
    }

    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let row_num = row_idx as u32 + 1;
        for (col, value) in row.iter().enumerate() {
            let written = match value {
                ExportValue::Text(s) if s.is_empty() => continue,
                ExportValue::Text(s) => worksheet.write_string(row_num, col as u16, s).map(|_| ()),
                ExportValue::Number(n) => worksheet.write_number(row_num, col as u16, *n).map(|_| ()),
            };
            written.map_err(|e| format!("Failed to write {}!R{}C{}: {}", sheet.name, row_num + 1, col + 1, e))?;
        }
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("Failed to set freeze panes: {}", e))?;
    worksheet.autofit();
    Ok(())
}

// ---------------------------------------------------------------------------
// Catalog import
// ---------------------------------------------------------------------------

/// Records read back from an exported catalog workbook.
#[derive(Debug, Default)]
pub struct CatalogImport {
    pub tables: Vec<TableRecord>,
    pub columns: Vec<ColumnRecord>,
    pub warnings: Vec<String>,
}

/// Read a catalog written by [`write_catalog`] (or edited by hand in a
/// spreadsheet program). Unknown columns and out-of-vocabulary values are
/// skipped with a warning; a missing `METADATOS` sheet is an error.
pub fn read_catalog(path: &Path) -> Result<CatalogImport, String> {
    let mut workbook = open(path)?;
    let names = workbook.sheet_names().to_vec();
    let find = |wanted: &str| names.iter().find(|n| n.trim().eq_ignore_ascii_case(wanted)).cloned();

    let meta_name = find(METADATA_SHEET).ok_or_else(|| format!("Workbook has no '{}' sheet", METADATA_SHEET))?;
    let mut import = CatalogImport::default();

    let range = workbook
        .worksheet_range(&meta_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", meta_name, e))?;
    let (headers, rows) = split_header(&range);
    let fields: Vec<Option<TableField>> = headers.iter().map(|h| TableField::from_name(h)).collect();

    for (i, row) in rows.iter().enumerate() {
        let mut record = TableRecord::new("");
        for (field, value) in fields.iter().zip(row) {
            let Some(field) = field else { continue };
            if value.trim().is_empty() {
                continue;
            }
            if let Err(e) = record.assign(*field, value) {
                import.warnings.push(format!("{} row {}: {}", meta_name, i + 2, e));
            }
        }
        if record.table_id.is_empty() {
            import.warnings.push(format!("{} row {}: missing table_id, row skipped", meta_name, i + 2));
            continue;
        }
        import.tables.push(record);
    }

    let Some(dict_name) = find(DICTIONARY_SHEET) else {
        import.warnings.push(format!("Workbook has no '{}' sheet", DICTIONARY_SHEET));
        return Ok(import);
    };
    let range = workbook
        .worksheet_range(&dict_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", dict_name, e))?;
    let (headers, rows) = split_header(&range);
    let fields: Vec<Option<ColumnField>> = headers.iter().map(|h| ColumnField::from_name(h)).collect();

    for (i, row) in rows.iter().enumerate() {
        let mut column = ColumnRecord::default();
        for (field, value) in fields.iter().zip(row) {
            let Some(field) = field else { continue };
            if let Err(e) = column.assign(*field, value) {
                import.warnings.push(format!("{} row {}: {}", dict_name, i + 2, e));
            }
        }
        import.columns.push(column);
    }

    Ok(import)
}

fn split_header(range: &Range<Data>) -> (Vec<String>, Vec<Vec<String>>) {
    let mut rows = range.rows().map(|row| row.iter().map(cell_text).collect::<Vec<String>>());
    let headers = rows.next().unwrap_or_default();
    let data = rows.filter(|r| r.iter().any(|c| !c.trim().is_empty())).collect();
    (headers, data)
}

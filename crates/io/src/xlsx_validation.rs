//! Dropdown validations on the exported catalog.
//!
//! Closed-vocabulary columns get an inline list so the workbook can be
//! edited by hand and read back. Excel caps an inline list at 255
//! characters including separators; longer vocabularies get no dropdown.

use rust_xlsxwriter::{DataValidation, DataValidationErrorStyle, Worksheet};

use datacat_core::vocab::labels;
use datacat_core::{ColumnField, ColumnType, DataPrivacy, OwnerArea, Periodicity, TableField, TableStatus};
use datacat_engine::consolidate::{ExportSheet, DICTIONARY_SHEET, METADATA_SHEET};

/// Rows covered below the header, so appended rows are validated too.
pub const VALIDATED_ROWS: u32 = 1000;

const MAX_INLINE_LIST_CHARS: usize = 255;

/// Vocabulary for a column header of one of the catalog sheets.
pub fn vocabulary_for(sheet: &str, header: &str) -> Option<Vec<&'static str>> {
    if sheet == METADATA_SHEET {
        match TableField::from_name(header)? {
            TableField::DataPrivacy => Some(labels(DataPrivacy::ALL, DataPrivacy::label)),
            TableField::DataOwnerArea => Some(labels(OwnerArea::ALL, OwnerArea::label)),
            TableField::Periodicity => Some(labels(Periodicity::ALL, Periodicity::label)),
            TableField::TableStatus => Some(labels(TableStatus::ALL, TableStatus::label)),
            _ => None,
        }
    } else if sheet == DICTIONARY_SHEET {
        match ColumnField::from_name(header)? {
            ColumnField::DataType => Some(labels(ColumnType::ALL, ColumnType::label)),
            _ => None,
        }
    } else {
        None
    }
}

/// Whether a list fits in an inline Excel validation.
pub fn fits_inline(items: &[&str]) -> bool {
    let chars: usize = items.iter().map(|s| s.chars().count()).sum::<usize>() + items.len().saturating_sub(1);
    chars <= MAX_INLINE_LIST_CHARS
}

/// Inline list validation with a stop alert.
pub fn list_validation(items: &[&str]) -> Option<DataValidation> {
    if items.is_empty() || !fits_inline(items) {
        return None;
    }
    let dv = DataValidation::new().allow_list_strings(items).ok()?;
    Some(dv.ignore_blank(true).set_error_style(DataValidationErrorStyle::Stop))
}

/// Add a dropdown to every vocabulary column of `sheet`. Returns how many
/// were added.
pub fn add_catalog_validations(worksheet: &mut Worksheet, sheet: &ExportSheet) -> Result<usize, String> {
    let last_row = (sheet.rows.len() as u32).max(VALIDATED_ROWS);
    let mut added = 0;

    for (col, header) in sheet.headers.iter().enumerate() {
        let Some(items) = vocabulary_for(&sheet.name, header) else { continue };
        let Some(dv) = list_validation(&items) else {
            log::debug!("{}: '{}' vocabulary too long for an inline list", sheet.name, header);
            continue;
        };
        worksheet
            .add_data_validation(1, col as u16, last_row, col as u16, &dv)
            .map_err(|e| format!("Failed to add validation: {}", e))?;
        added += 1;
    }

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_columns() {
        assert_eq!(vocabulary_for(METADATA_SHEET, "data_privacy"), Some(vec!["Abierto", "Personales", "Cerrado"]));
        assert_eq!(vocabulary_for(METADATA_SHEET, "table_status"), Some(vec!["Activa", "Desactivada"]));
        assert_eq!(vocabulary_for(DICTIONARY_SHEET, "Tipo de dato"), Some(vec!["texto", "numero", "fecha"]));
        assert_eq!(vocabulary_for(METADATA_SHEET, "domain"), None);
        assert_eq!(vocabulary_for(DICTIONARY_SHEET, "data_privacy"), None);
        assert_eq!(vocabulary_for("Hoja1", "data_privacy"), None);
    }

    #[test]
    fn short_lists_get_a_dropdown() {
        assert!(list_validation(&["Activa", "Desactivada"]).is_some());
        assert!(list_validation(&[]).is_none());
    }

    #[test]
    fn owner_areas_exceed_the_inline_limit() {
        let areas = labels(OwnerArea::ALL, OwnerArea::label);
        assert!(!fits_inline(&areas));
        assert!(list_validation(&areas).is_none());
        assert!(fits_inline(&labels(Periodicity::ALL, Periodicity::label)));
    }

    #[test]
    fn metadata_sheet_gets_three_dropdowns() {
        let sheet = ExportSheet {
            name: METADATA_SHEET.into(),
            headers: TableField::ALL.iter().map(|f| f.name().to_string()).collect(),
            rows: vec![],
        };
        let mut worksheet = Worksheet::new();
        assert_eq!(add_catalog_validations(&mut worksheet, &sheet).unwrap(), 3);
    }
}

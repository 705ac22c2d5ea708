// Unique-identifier detection

use std::collections::HashSet;

use datacat_core::{Frame, NO_UNIQUE_IDENTIFIER};

/// First column, left to right, with no empty cells and no repeated values.
/// A frame without data rows has no identifier.
pub fn detect_unique_identifier(frame: &Frame) -> Option<&str> {
    if frame.row_count() == 0 {
        return None;
    }

    frame
        .columns
        .iter()
        .find(|column| {
            let mut seen = HashSet::with_capacity(column.values.len());
            column
                .values
                .iter()
                .all(|value| matches!(value, Some(v) if seen.insert(v)))
        })
        .map(|column| column.name.as_str())
}

/// Detected identifier name, or the "No tiene" annotation.
pub fn unique_identifier_label(frame: &Frame) -> String {
    detect_unique_identifier(frame)
        .unwrap_or(NO_UNIQUE_IDENTIFIER)
        .to_string()
}

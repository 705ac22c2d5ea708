// Column-oriented tables read from source files

use std::collections::{HashMap, HashSet};

use ordered_float::OrderedFloat;

/// Field values a CSV or workbook reader treats as missing rather than text.
pub const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>", "N/A", "NA",
    "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a field (after trimming) is one of the [`NA_TOKENS`]. Matching is case-sensitive.
pub fn is_na_token(raw: &str) -> bool {
    NA_TOKENS.contains(&raw.trim())
}

/// A typed, non-empty cell. Empty cells are `None` in a [`Column`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellValue {
    Int(i64),
    Number(OrderedFloat<f64>),
    Bool(bool),
    Text(String),
}

impl CellValue {
    /// Interpret a raw text field the way a CSV reader would: integers,
    /// then floats, then booleans, otherwise text. Blank input and the
    /// [`NA_TOKENS`] are empty.
    pub fn infer(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || is_na_token(trimmed) {
            return None;
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return Some(Self::Int(n));
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return Some(Self::number(n));
            }
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "true" => Some(Self::Bool(true)),
            "false" => Some(Self::Bool(false)),
            _ => Some(Self::Text(raw.to_string())),
        }
    }

    /// Floats with no fractional part collapse to integers so that 3 and 3.0
    /// compare equal.
    pub fn number(n: f64) -> Self {
        if n.fract() == 0.0 && n.abs() < 1e15 {
            Self::Int(n as i64)
        } else {
            Self::Number(OrderedFloat(n))
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Number(_))
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Number(n) => write!(f, "{}", n.0),
            Self::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<CellValue>>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), values: Vec::new() }
    }
}

/// A table with a header row, stored column by column in declared order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub columns: Vec<Column>,
}

impl Frame {
    /// Build a frame from a header row and data rows. Short rows are padded
    /// with empty cells; blank header names become `Unnamed: N`. A repeated
    /// name gets a `.1`, `.2`, ... suffix so every column stays addressable.
    pub fn from_rows(header: Vec<String>, rows: Vec<Vec<Option<CellValue>>>) -> Self {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0).max(header.len());
        let names: Vec<String> = (0..width)
            .map(|i| {
                let name = header.get(i).map(|h| h.trim()).unwrap_or("");
                if name.is_empty() {
                    format!("Unnamed: {}", i)
                } else {
                    name.to_string()
                }
            })
            .collect();
        let mut columns: Vec<Column> = dedupe_names(names).into_iter().map(Column::new).collect();

        for row in rows {
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.values.push(cells.next().flatten());
            }
        }

        Self { columns }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Rename repeats in place: the first `monto` keeps its name, later ones
/// become `monto.1`, `monto.2`, skipping any name already taken.
fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = names.iter().cloned().collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();

    names
        .into_iter()
        .map(|name| {
            if seen.insert(name.clone()) {
                return name;
            }
            let counter = next_suffix.entry(name.clone()).or_insert(1);
            loop {
                let candidate = format!("{}.{}", name, counter);
                *counter += 1;
                if taken.insert(candidate.clone()) {
                    seen.insert(candidate.clone());
                    return candidate;
                }
            }
        })
        .collect()
}

/// One table handed to the catalog builder, together with where it came from.
#[derive(Debug, Clone)]
pub struct SourceTable {
    /// Original file name, e.g. "ventas.xlsx"
    pub file_name: String,
    /// Sheet name for workbooks, file stem for delimited text
    pub table_name: String,
    /// Lower-case file extension, e.g. "csv"
    pub format: String,
    /// Content hash of the source file ("blake3:...")
    pub fingerprint: String,
    pub frame: Frame,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_types() {
        assert_eq!(CellValue::infer("42"), Some(CellValue::Int(42)));
        assert_eq!(CellValue::infer("3.0"), Some(CellValue::Int(3)));
        assert_eq!(CellValue::infer("2.5"), Some(CellValue::Number(OrderedFloat(2.5))));
        assert_eq!(CellValue::infer("TRUE"), Some(CellValue::Bool(true)));
        assert_eq!(CellValue::infer("Lima"), Some(CellValue::Text("Lima".into())));
        assert_eq!(CellValue::infer("   "), None);
        assert_eq!(CellValue::infer("No tiene"), Some(CellValue::Text("No tiene".into())));
    }

    #[test]
    fn na_tokens_are_empty() {
        for token in ["NA", "N/A", "NaN", "null", "#N/A", " NULL ", "<NA>", "None"] {
            assert_eq!(CellValue::infer(token), None, "{token:?}");
        }
        // Case-sensitive, like the readers this mirrors
        assert_eq!(CellValue::infer("Na"), Some(CellValue::Text("Na".into())));
        assert_eq!(CellValue::infer("NONE"), Some(CellValue::Text("NONE".into())));
    }

    #[test]
    fn duplicate_headers_get_numeric_suffixes() {
        let frame = Frame::from_rows(
            vec!["monto".into(), "monto".into(), "monto.1".into(), "monto".into()],
            vec![vec![Some(CellValue::Int(1)), Some(CellValue::Int(2)), Some(CellValue::Int(3)), Some(CellValue::Int(4))]],
        );
        assert_eq!(frame.column_names(), vec!["monto", "monto.2", "monto.1", "monto.3"]);
        assert_eq!(frame.columns[1].values, vec![Some(CellValue::Int(2))]);
    }

    #[test]
    fn from_rows_pads_and_names_columns() {
        let frame = Frame::from_rows(
            vec!["id".into(), "".into()],
            vec![
                vec![Some(CellValue::Int(1)), Some(CellValue::Text("a".into())), Some(CellValue::Int(9))],
                vec![Some(CellValue::Int(2))],
            ],
        );
        assert_eq!(frame.column_names(), vec!["id", "Unnamed: 1", "Unnamed: 2"]);
        assert_eq!(frame.row_count(), 2);
        assert_eq!(frame.columns[1].values, vec![Some(CellValue::Text("a".into())), None]);
        assert_eq!(frame.columns[2].values, vec![Some(CellValue::Int(9)), None]);
    }
}

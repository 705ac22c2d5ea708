//! `datacat-core`: record types shared by every catalog crate.
//!
//! No I/O, no classification. Just the shapes of tables, columns and the
//! governance vocabularies they are tagged with.

pub mod frame;
pub mod record;
pub mod vocab;

pub use frame::{is_na_token, CellValue, Column, Frame, SourceTable, NA_TOKENS};
pub use record::{
    attribute_id, id_index, table_id, ColumnField, ColumnRecord, FieldError, TableField, TableRecord,
    NO_UNIQUE_IDENTIFIER,
};
pub use vocab::{ColumnType, DataPrivacy, OwnerArea, Periodicity, TableStatus};

// File I/O operations

pub mod csv;
pub mod source;
pub mod xlsx;
pub mod xlsx_validation;

pub use source::{load_sources, LoadResult};
pub use xlsx::{read_catalog, write_catalog, CatalogImport};

pub mod catalog;
pub mod classify;
pub mod completeness;
pub mod consolidate;
pub mod edit;
pub mod error;
pub mod heuristic;
pub mod identifier;
pub mod sample;
pub mod session;
pub mod steward;

pub use catalog::{build_catalog, Catalog, CatalogOptions, Notice};
pub use classify::{
    parse_metadata, ClassificationRequest, Classifier, ClassifyError, ColumnSuggestion, Memoized, TableMetadata,
};
pub use completeness::{report, score, Completeness};
pub use consolidate::{consolidate, merged_dictionary, CatalogExport, ExportSheet, ExportValue};
pub use edit::{apply_delta, EditDelta, EditValue, SessionEdits};
pub use error::EngineError;
pub use heuristic::HeuristicClassifier;
pub use session::{BatchKey, CatalogSession};
pub use steward::{append_domain, strip_domain, validate_stewards, StewardIssue, StewardValidator};

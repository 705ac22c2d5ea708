//! Catalog session: the generated batch plus the user's edit buffers.

use std::collections::{BTreeMap, HashMap};

use datacat_core::{attribute_id, id_index, table_id, ColumnRecord, SourceTable, TableField, TableRecord};

use crate::catalog::{build_catalog, Catalog, CatalogOptions, Notice};
use crate::classify::Classifier;
use crate::completeness::{report, Completeness};
use crate::consolidate::{consolidate, CatalogExport};
use crate::edit::{apply_delta, EditDelta, SessionEdits};
use crate::error::EngineError;
use crate::steward::{self, strip_domain, StewardIssue};

/// Identity of a processing batch: the selected tables, in order, and the
/// context note.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchKey {
    pub sources: Vec<(String, String, String)>,
    pub context: Option<String>,
}

impl BatchKey {
    pub fn new(sources: &[SourceTable], context: Option<&str>) -> Self {
        Self {
            sources: sources
                .iter()
                .map(|s| (s.file_name.clone(), s.table_name.clone(), s.fingerprint.clone()))
                .collect(),
            context: context.map(str::trim).filter(|c| !c.is_empty()).map(String::from),
        }
    }
}

pub struct CatalogSession {
    domain: String,
    options: CatalogOptions,
    generated: Catalog,
    metadata: Vec<TableRecord>,
    /// Absent key: that table's dictionary was never edited
    dictionaries: BTreeMap<String, Vec<ColumnRecord>>,
    batches: HashMap<BatchKey, Catalog>,
}

impl CatalogSession {
    pub fn new(domain: impl Into<String>, options: CatalogOptions) -> Self {
        Self {
            domain: domain.into(),
            options,
            generated: Catalog::default(),
            metadata: Vec::new(),
            dictionaries: BTreeMap::new(),
            batches: HashMap::new(),
        }
    }

    /// Resume from previously exported records. Steward addresses are
    /// reduced to their local part.
    pub fn from_records(
        domain: impl Into<String>,
        options: CatalogOptions,
        tables: Vec<TableRecord>,
        columns: Vec<ColumnRecord>,
    ) -> Self {
        let mut session = Self::new(domain, options);
        session.generated = Catalog { tables, columns, notices: Vec::new() };
        session.strip_generated_stewards();
        session.metadata = session.generated.tables.clone();
        session
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Catalog a batch of source tables. A batch identical to one already
    /// processed in this session reuses its result without classifying
    /// again. Edit buffers start over from the generated records.
    pub fn process<C: Classifier + ?Sized>(
        &mut self,
        sources: &[SourceTable],
        context: Option<&str>,
        classifier: &C,
    ) -> &[Notice] {
        let key = BatchKey::new(sources, context);
        let catalog = match self.batches.get(&key) {
            Some(cached) => {
                log::debug!("batch of {} table(s) already processed", sources.len());
                cached.clone()
            }
            None => {
                let built = build_catalog(sources, context, classifier, &self.options);
                self.batches.insert(key, built.clone());
                built
            }
        };

        self.generated = catalog;
        self.metadata = self.generated.tables.clone();
        self.dictionaries.clear();
        &self.generated.notices
    }

    /// Current metadata, with edits applied.
    pub fn tables(&self) -> &[TableRecord] {
        &self.metadata
    }

    /// Current dictionary of one table: the edited rows when the table's
    /// dictionary was edited, otherwise the generated ones.
    pub fn dictionary(&self, table_id: &str) -> Result<Vec<ColumnRecord>, EngineError> {
        if !self.has_table(table_id) {
            return Err(EngineError::UnknownTable(table_id.to_string()));
        }
        Ok(match self.dictionaries.get(table_id) {
            Some(rows) => rows.clone(),
            None => self.generated.columns_for(table_id).cloned().collect(),
        })
    }

    pub fn apply_metadata_edit(&mut self, delta: &EditDelta) -> Vec<Notice> {
        let floor = max_index(self.generated.tables.iter().map(|t| t.table_id.as_str()), 'T');
        let notices = apply_delta(&mut self.metadata, delta, "metadata", |rows| {
            let used = max_index(rows.iter().map(|t| t.table_id.as_str()), 'T');
            TableRecord::new(table_id(floor.max(used) + 1))
        });

        let domain = self.domain.clone();
        for record in &mut self.metadata {
            strip_stewards(record, &domain);
        }
        notices
    }

    pub fn apply_dictionary_edit(&mut self, table: &str, delta: &EditDelta) -> Result<Vec<Notice>, EngineError> {
        if !self.has_table(table) {
            return Err(EngineError::UnknownTable(table.to_string()));
        }

        let floor = max_index(self.generated.columns_for(table).map(|c| c.attribute_id.as_str()), 'a');
        if !self.dictionaries.contains_key(table) {
            let seed = self.generated.columns_for(table).cloned().collect();
            self.dictionaries.insert(table.to_string(), seed);
        }
        let rows = self
            .dictionaries
            .get_mut(table)
            .ok_or_else(|| EngineError::UnknownTable(table.to_string()))?;

        Ok(apply_delta(rows, delta, table, |rows| {
            let used = max_index(rows.iter().map(|c| c.attribute_id.as_str()), 'a');
            ColumnRecord::new(table, attribute_id(floor.max(used) + 1))
        }))
    }

    /// Apply a whole edits file: metadata first, so tables added there can
    /// receive dictionary rows, then each dictionary in table-id order.
    pub fn apply_edits(&mut self, edits: &SessionEdits) -> Vec<Notice> {
        let mut notices = self.apply_metadata_edit(&edits.metadata);
        for (table, delta) in &edits.dictionaries {
            match self.apply_dictionary_edit(table, delta) {
                Ok(more) => notices.extend(more),
                Err(e) => notices.push(Notice::new(table, e.to_string())),
            }
        }
        notices
    }

    pub fn completeness(&self) -> Vec<Completeness> {
        report(&self.metadata)
    }

    pub fn validate_stewards(&self) -> Vec<StewardIssue> {
        steward::validate_stewards(&self.metadata, &self.domain)
    }

    /// Consolidated export. Blocked while any steward contact is invalid.
    pub fn export(&self) -> Result<CatalogExport, EngineError> {
        let issues = self.validate_stewards();
        if !issues.is_empty() {
            return Err(EngineError::InvalidStewards(issues));
        }
        Ok(consolidate(&self.metadata, &self.generated.columns, &self.dictionaries, &self.domain))
    }

    fn has_table(&self, table_id: &str) -> bool {
        self.metadata.iter().any(|t| t.table_id == table_id)
    }

    fn strip_generated_stewards(&mut self) {
        for record in &mut self.generated.tables {
            strip_stewards(record, &self.domain);
        }
    }
}

fn strip_stewards(record: &mut TableRecord, domain: &str) {
    for field in TableField::STEWARDS {
        if let Some(contact) = record.steward_mut(field) {
            *contact = strip_domain(contact, domain).to_string();
        }
    }
}

fn max_index<'a>(ids: impl Iterator<Item = &'a str>, prefix: char) -> usize {
    ids.filter_map(|id| id_index(id, prefix)).max().unwrap_or(0)
}

//! Metadata completeness scoring.
//!
//! A table's score is the share of its required fields that hold a
//! non-blank value, as a percentage rounded to one decimal.

use serde::Serialize;

use datacat_core::{TableField, TableRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completeness {
    pub table_id: String,
    pub table_name: String,
    pub filled: usize,
    pub total: usize,
    pub percent: f64,
    /// Names of the required fields that are blank, in field order.
    pub missing: Vec<&'static str>,
}

/// Score a record against the fourteen required metadata fields.
pub fn score(record: &TableRecord) -> Completeness {
    score_fields(record, &TableField::REQUIRED)
}

/// Score a record against an arbitrary field list. Whitespace-only values
/// count as blank.
pub fn score_fields(record: &TableRecord, fields: &[TableField]) -> Completeness {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|f| record.get(**f).trim().is_empty())
        .map(|f| f.name())
        .collect();
    let total = fields.len();
    let filled = total - missing.len();

    Completeness {
        table_id: record.table_id.clone(),
        table_name: record.table_name.clone(),
        filled,
        total,
        percent: percentage(filled, total),
        missing,
    }
}

/// `round(100 * filled / total, 1)`; an empty field list scores 0.
pub fn percentage(filled: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (1000.0 * filled as f64 / total as f64).round() / 10.0
}

/// Scores for every record, least complete first. Ties keep input order.
pub fn report(records: &[TableRecord]) -> Vec<Completeness> {
    let mut scores: Vec<Completeness> = records.iter().map(score).collect();
    scores.sort_by(|a, b| a.percent.total_cmp(&b.percent));
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use datacat_core::{DataPrivacy, TableStatus};

    fn filled_record() -> TableRecord {
        let mut r = TableRecord::new("T001");
        for field in TableField::REQUIRED {
            if !field.is_read_only() {
                r.set(field, sample_value(field)).unwrap();
            }
        }
        r
    }

    fn sample_value(field: TableField) -> &'static str {
        match field {
            TableField::DataPrivacy => "Abierto",
            TableField::DataOwnerArea => "Comercial",
            TableField::Periodicity => "Mensual",
            TableField::TableStatus => "Activa",
            _ => "x",
        }
    }

    #[test]
    fn fully_filled_is_one_hundred() {
        let c = score(&filled_record());
        assert_eq!(c.percent, 100.0);
        assert!(c.missing.is_empty());
        assert_eq!(c.total, 14);
    }

    #[test]
    fn five_of_fourteen_empty_scores_64_3() {
        let mut r = filled_record();
        r.domain.clear();
        r.location_path.clear();
        r.data_privacy = None;
        r.table_status = None;
        r.data_steward_ejecutivo_contact.clear();

        let c = score(&r);
        assert_eq!(c.filled, 9);
        assert_eq!(c.percent, 64.3);
        assert_eq!(
            c.missing,
            vec!["data_privacy", "data_steward_ejecutivo_contact", "domain", "location_path", "table_status"]
        );
    }

    #[test]
    fn whitespace_counts_as_empty() {
        let mut r = filled_record();
        r.domain = "   \t".into();
        let c = score(&r);
        assert_eq!(c.missing, vec!["domain"]);
        assert_eq!(c.percent, 92.9);
    }

    #[test]
    fn fresh_record_only_has_identifier() {
        let c = score(&TableRecord::new("T001"));
        assert_eq!(c.filled, 1);
        assert_eq!(c.percent, 7.1);
    }

    #[test]
    fn report_sorts_ascending() {
        let mut low = TableRecord::new("T001");
        low.table_name = "low".into();
        let mut high = filled_record();
        high.table_id = "T002".into();
        high.data_privacy = Some(DataPrivacy::Cerrado);
        high.table_status = Some(TableStatus::Activa);

        let scores = report(&[high, low]);
        assert_eq!(scores[0].table_id, "T001");
        assert_eq!(scores[1].table_id, "T002");
    }

    #[test]
    fn percentage_of_empty_list_is_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn filling_a_field_never_lowers_the_score(mask in proptest::collection::vec(any::<bool>(), 13), pick in 0usize..13) {
                // Every required field except table_id, which is always set
                let editable: Vec<TableField> = TableField::REQUIRED.iter().copied().filter(|f| !f.is_read_only()).collect();
                let mut record = TableRecord::new("T001");
                for (field, keep) in editable.iter().zip(&mask) {
                    if *keep {
                        record.set(*field, sample_value(*field)).unwrap();
                    }
                }
                let before = score(&record);

                let target = editable[pick];
                let was_empty = record.get(target).trim().is_empty();
                record.set(target, sample_value(target)).unwrap();
                let after = score(&record);

                prop_assert!(after.percent >= before.percent);
                if was_empty {
                    prop_assert!(after.percent > before.percent);
                    prop_assert_eq!(after.filled, before.filled + 1);
                }
            }
        }
    }
}

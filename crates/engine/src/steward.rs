//! Data steward contacts.
//!
//! Stewards are stored in the edit buffer as the local part of their
//! corporate address; the domain suffix is appended again on export.

use std::fmt;

use regex::Regex;
use serde::Serialize;

use datacat_core::{TableField, TableRecord};

pub const DEFAULT_DOMAIN: &str = "asbanc.com.pe";

/// Local part of a steward address. Input without the `@domain` suffix is
/// returned trimmed and otherwise unchanged.
pub fn strip_domain<'a>(contact: &'a str, domain: &str) -> &'a str {
    let trimmed = contact.trim();
    trimmed
        .strip_suffix(domain)
        .and_then(|rest| rest.strip_suffix('@'))
        .unwrap_or(trimmed)
}

/// Full steward address for a local part. Blank stays blank, and a value
/// that already carries the suffix is not suffixed twice.
pub fn append_domain(local: &str, domain: &str) -> String {
    let local = strip_domain(local, domain);
    if local.is_empty() {
        String::new()
    } else {
        format!("{}@{}", local, domain)
    }
}

/// Checks full addresses against `^[\w.-]+@<domain>$`.
#[derive(Debug, Clone)]
pub struct StewardValidator {
    domain: String,
    pattern: Regex,
}

impl StewardValidator {
    pub fn new(domain: &str) -> Self {
        let pattern = Regex::new(&format!(r"^[\w.-]+@{}$", regex::escape(domain)))
            .expect("escaped domain always forms a valid pattern");
        Self { domain: domain.to_string(), pattern }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn is_valid(&self, address: &str) -> bool {
        self.pattern.is_match(address)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StewardIssue {
    pub table_id: String,
    pub field: &'static str,
    /// The address as it would be exported
    pub address: String,
}

impl fmt::Display for StewardIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: '{}' is not a valid address", self.table_id, self.field, self.address)
    }
}

/// Every non-blank steward contact whose rebuilt address fails validation.
pub fn validate_stewards(tables: &[TableRecord], domain: &str) -> Vec<StewardIssue> {
    let validator = StewardValidator::new(domain);
    let mut issues = Vec::new();

    for table in tables {
        for field in TableField::STEWARDS {
            let local = table.get(field);
            if local.trim().is_empty() {
                continue;
            }
            let address = append_domain(&local, domain);
            if !validator.is_valid(&address) {
                issues.push(StewardIssue {
                    table_id: table.table_id.clone(),
                    field: field.name(),
                    address,
                });
            }
        }
    }

    issues
}

use std::fmt;

use crate::steward::StewardIssue;

#[derive(Debug)]
pub enum EngineError {
    /// A dictionary edit referenced a table that is not in the session.
    UnknownTable(String),
    /// One or more steward contacts failed validation; export is blocked.
    InvalidStewards(Vec<StewardIssue>),
    /// The edits file could not be parsed.
    EditsParse(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTable(id) => write!(f, "unknown table '{id}'"),
            Self::InvalidStewards(issues) => {
                write!(f, "{} invalid steward contact(s)", issues.len())?;
                for issue in issues {
                    write!(f, "\n  {issue}")?;
                }
                Ok(())
            }
            Self::EditsParse(msg) => write!(f, "edits parse error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

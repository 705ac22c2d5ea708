//! Terminal rendering of completeness scores and steward issues.

use std::io::{self, Write};

use datacat_engine::{Completeness, StewardIssue};

const BAR_WIDTH: usize = 20;

/// Horizontal bar for a percentage, `BAR_WIDTH` cells wide.
pub fn bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Blank required fields, or "Ninguno" when the record is complete.
pub fn missing_label(score: &Completeness) -> String {
    if score.missing.is_empty() {
        "Ninguno".to_string()
    } else {
        score.missing.join(", ")
    }
}

/// One line per table, least complete first (the order of `scores`).
pub fn write_completeness(out: &mut impl Write, scores: &[Completeness]) -> io::Result<()> {
    let name_width = scores.iter().map(|s| s.table_name.chars().count()).max().unwrap_or(0).max(5);

    writeln!(out, "{:<6} {:<name_width$} {:>7}  {:<BAR_WIDTH$}  Vacíos", "ID", "Tabla", "%", "")?;
    for score in scores {
        writeln!(
            out,
            "{:<6} {:<name_width$} {:>6.1}%  {}  {}",
            score.table_id,
            score.table_name,
            score.percent,
            bar(score.percent),
            missing_label(score),
        )?;
    }
    Ok(())
}

pub fn write_steward_issues(out: &mut impl Write, issues: &[StewardIssue], domain: &str) -> io::Result<()> {
    writeln!(out, "{} steward contact(s) are not valid @{} addresses:", issues.len(), domain)?;
    for issue in issues {
        writeln!(out, "  {}", issue)?;
    }
    Ok(())
}

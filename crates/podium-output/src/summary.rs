//! Console summary of a category report.
//!
//! Renders the ranked rows as a fixed-width table together with how much of
//! the upstream data could actually be read, so partial reports are visible
//! at a glance.

use crate::export::ReportRow;
use podium_data::EnrichedResult;
use std::fmt;

/// Summary of one category's report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    /// Table title, e.g. "Road - 2024 Q2 week 2".
    pub title: String,

    /// Rows in report order.
    pub rows: Vec<ReportRow>,

    /// Drivers whose results were requested.
    pub drivers_total: usize,

    /// Drivers whose results could not be fetched.
    pub drivers_failed: usize,

    /// Rows whose subsession could not be fetched.
    pub rows_unenriched: usize,
}

impl ReportSummary {
    /// Create a summary from enriched results.
    pub fn new(title: impl Into<String>, results: &[EnrichedResult]) -> Self {
        Self {
            title: title.into(),
            rows: results.iter().map(ReportRow::from).collect(),
            drivers_total: 0,
            drivers_failed: 0,
            rows_unenriched: results.iter().filter(|r| r.series_name.is_none()).count(),
        }
    }

    /// Record driver coverage.
    pub fn with_driver_coverage(mut self, total: usize, failed: usize) -> Self {
        self.drivers_total = total;
        self.drivers_failed = failed;
        self
    }

    /// Whether any upstream call behind this report failed.
    pub const fn is_partial(&self) -> bool {
        self.drivers_failed > 0 || self.rows_unenriched > 0
    }

    /// Render as an ASCII table.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n{}\n", self.title));
        output.push_str(&"=".repeat(96));
        output.push('\n');

        output.push_str(&format!(
            "{:>3} {:<24} {:<10} {:>6} {:>5} {:>5} {:>6} {:<24} {:>6}\n",
            "#", "Name", "Date", "Champ", "Start", "Fin", "SoF", "Series", "iR +/-"
        ));
        output.push_str(&"-".repeat(96));
        output.push('\n');

        for (i, row) in self.rows.iter().enumerate() {
            output.push_str(&format!(
                "{:>3} {:<24} {:<10} {:>6} {:>5} {:>5} {:>6} {:<24} {:>6}\n",
                i + 1,
                truncate(&row.name, 24),
                row.start_date,
                row.champ_points,
                row.start_position,
                row.finish_position,
                row.strength_of_field,
                truncate(row.series.as_deref().unwrap_or("-"), 24),
                row.irating_gain
                    .map_or_else(|| "-".to_string(), |g| format!("{:+}", g)),
            ));
        }

        if self.rows.is_empty() {
            output.push_str("    (no results)\n");
        }

        output.push_str(&"=".repeat(96));
        output.push('\n');
        output.push_str(&format!(
            "Drivers: {} queried, {} failed | Rows without session data: {}\n",
            self.drivers_total, self.drivers_failed, self.rows_unenriched
        ));

        output
    }
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii_table())
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

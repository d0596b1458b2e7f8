//! Export of enriched results as CSV or JSON reports.
//!
//! Column names and their order are part of the report format; existing
//! consumers of the CSV files rely on both.

use chrono::NaiveDate;
use podium_data::{Category, EnrichedResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Report header, in output order.
pub const REPORT_COLUMNS: [&str; 9] = [
    "Name",
    "Start Date",
    "Champ Points",
    "Club Points",
    "Start Position",
    "Finish Position",
    "Strength of Field",
    "Series",
    "iRating Gain",
];

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output was not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "prettyjson" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// One line of the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportRow {
    /// Driver display name.
    #[serde(rename = "Name")]
    pub name: String,

    /// Race start date.
    #[serde(rename = "Start Date")]
    pub start_date: NaiveDate,

    /// Championship points.
    #[serde(rename = "Champ Points")]
    pub champ_points: i32,

    /// Club points.
    #[serde(rename = "Club Points")]
    pub club_points: i32,

    /// Starting position.
    #[serde(rename = "Start Position")]
    pub start_position: u32,

    /// Finishing position.
    #[serde(rename = "Finish Position")]
    pub finish_position: u32,

    /// Strength of field.
    #[serde(rename = "Strength of Field")]
    pub strength_of_field: u32,

    /// Series name, empty when the subsession could not be fetched.
    #[serde(rename = "Series")]
    pub series: Option<String>,

    /// iRating change, empty when unknown.
    #[serde(rename = "iRating Gain")]
    pub irating_gain: Option<i32>,
}

impl From<&EnrichedResult> for ReportRow {
    fn from(enriched: &EnrichedResult) -> Self {
        let result = &enriched.event_result;
        Self {
            name: result.display_name.clone(),
            start_date: result.date_start,
            champ_points: result.points_champ,
            club_points: result.points_club,
            start_position: result.pos_start,
            finish_position: result.pos_finish,
            strength_of_field: result.strength_of_field,
            series: enriched.series_name.clone(),
            irating_gain: enriched.irating_gain,
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for [ReportRow] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                // Header is written by hand so an empty report still has one.
                let mut wtr = csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(vec![]);
                wtr.write_record(REPORT_COLUMNS)?;
                for row in self {
                    wtr.serialize(row)?;
                }
                let data = String::from_utf8(wtr.into_inner().map_err(|e| e.into_error())?)?;
                Ok(data)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// Default report file name for a category and week, e.g. `road_q2_w2.csv`.
pub fn report_file_name(
    category: Category,
    quarter: u8,
    race_week: i32,
    format: ExportFormat,
) -> String {
    format!(
        "{}_q{}_w{}.{}",
        category.name(),
        quarter,
        race_week,
        format.extension()
    )
}

/// Write enriched results to `path`, one row each, in the given order.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns an error if serialization or file writing fails.
pub fn write_report(
    results: &[EnrichedResult],
    path: &Path,
    format: ExportFormat,
) -> Result<usize, ExportError> {
    let rows: Vec<ReportRow> = results.iter().map(ReportRow::from).collect();
    rows.export_to_file(path, format)?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use podium_data::{DriverId, EventResult};
    use rstest::rstest;

    fn enriched(name: &str, series: Option<&str>, gain: Option<i32>) -> EnrichedResult {
        EnrichedResult {
            event_result: EventResult {
                cust_id: DriverId(7),
                subsession_id: 555,
                display_name: name.to_string(),
                date_start: NaiveDate::from_ymd_opt(2024, 4, 9).unwrap(),
                points_champ: 120,
                points_club: 12,
                pos_start: 3,
                pos_finish: 1,
                strength_of_field: 2150,
            },
            series_name: series.map(str::to_string),
            irating_gain: gain,
        }
    }

    #[test]
    fn test_csv_header_order() {
        let rows = vec![ReportRow::from(&enriched("Sam Driver", Some("GT3 Sprint"), Some(45)))];
        let csv = rows.export_to_string(ExportFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Name,Start Date,Champ Points,Club Points,Start Position,Finish Position,\
             Strength of Field,Series,iRating Gain"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Sam Driver,2024-04-09,120,12,3,1,2150,GT3 Sprint,45"
        );
    }

    #[test]
    fn test_csv_empty_cells_for_missing_enrichment() {
        let rows = vec![ReportRow::from(&enriched("Sam Driver", None, None))];
        let csv = rows.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.lines().nth(1).unwrap().ends_with("2150,,"));
    }

    #[test]
    fn test_csv_empty_report_keeps_header() {
        let rows: Vec<ReportRow> = Vec::new();
        let csv = rows.export_to_string(ExportFormat::Csv).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("Name,"));
    }

    #[test]
    fn test_json_uses_report_column_names() {
        let rows = vec![ReportRow::from(&enriched("Sam Driver", Some("GT3 Sprint"), None))];
        let json = rows.export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"Name\":\"Sam Driver\""));
        assert!(json.contains("\"iRating Gain\":null"));

        let pretty = rows.export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(pretty.contains("  ")); // Indentation indicates pretty format
    }

    #[test]
    fn test_names_with_commas_are_quoted() {
        let rows = vec![ReportRow::from(&enriched("Driver, Jr.", None, None))];
        let csv = rows.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.contains("\"Driver, Jr.\""));
    }

    #[rstest]
    #[case(Category::Road, 2, 2, ExportFormat::Csv, "road_q2_w2.csv")]
    #[case(Category::Oval, 3, 11, ExportFormat::Json, "oval_q3_w11.json")]
    #[case(Category::DirtRoad, 1, 0, ExportFormat::PrettyJson, "dirt_road_q1_w0.json")]
    fn test_report_file_name(
        #[case] category: Category,
        #[case] quarter: u8,
        #[case] race_week: i32,
        #[case] format: ExportFormat,
        #[case] expected: &str,
    ) {
        assert_eq!(report_file_name(category, quarter, race_week, format), expected);
    }

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!(
            "pretty-json".parse::<ExportFormat>().unwrap(),
            ExportFormat::PrettyJson
        );
        assert!(matches!(
            "xlsx".parse::<ExportFormat>(),
            Err(ExportError::InvalidFormat(_))
        ));
    }
}

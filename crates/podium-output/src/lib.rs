#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/podium-rs/podium/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod summary;

pub use export::{
    ExportError, ExportFormat, Exporter, REPORT_COLUMNS, ReportRow, report_file_name, write_report,
};
pub use summary::ReportSummary;

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/podium-rs/podium/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod config;
pub mod discovery;
pub mod enrich;
pub mod error;
pub mod pipeline;
pub mod rank;

// Re-export main types from sub-crates
pub use podium_data as data;
pub use podium_output as output;

pub use aggregate::{Aggregate, RaceWindow, aggregate_results};
pub use config::PipelineConfig;
pub use discovery::{Discovery, discover_drivers, seasons_to_scan};
pub use enrich::{Enrichment, enrich_results};
pub use error::{ConfigError, PipelineError};
pub use pipeline::{CategoryReport, Pipeline, PipelineReport};
pub use rank::top_n;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

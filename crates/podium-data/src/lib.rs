#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/podium-rs/podium/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod iracing;
pub mod memory;
pub mod source;
pub mod types;

pub use error::{DataError, Result};
pub use iracing::{Credentials, IracingClient};
pub use memory::MemorySource;
pub use source::{
    ALL_RACE_WEEKS, DataSource, EventQuery, SortField, SortOrder, StandingsQuery,
    sort_event_results,
};
pub use types::{
    Category, DriverId, EnrichedResult, EventResult, RosterEntry, Season, SeasonId, Standing,
    SubsessionDetail, SubsessionId,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

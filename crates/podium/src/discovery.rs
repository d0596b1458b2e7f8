//! Driver discovery.
//!
//! Walks the club-scoped standings of every season and collects the distinct
//! drivers found there.

use podium_data::{DataSource, DriverId, Season, SeasonId, StandingsQuery};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Drivers found across a set of seasons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Distinct drivers, ordered by id
    pub drivers: BTreeSet<DriverId>,
    /// Seasons that were scanned
    pub seasons: Vec<Season>,
    /// Seasons whose standings could not be read
    pub failed_seasons: Vec<SeasonId>,
}

impl Discovery {
    /// Whether every scanned season answered.
    pub const fn is_complete(&self) -> bool {
        self.failed_seasons.is_empty()
    }
}

/// Seasons to scan: the active ones, or exactly `pinned` when given.
///
/// Pinned ids take their series name from the active listing; ids that are
/// not active keep an empty name.
pub fn seasons_to_scan(active: Vec<Season>, pinned: Option<&[SeasonId]>) -> Vec<Season> {
    let Some(ids) = pinned else {
        return active;
    };

    ids.iter()
        .map(|&id| {
            active
                .iter()
                .find(|s| s.season_id == id)
                .cloned()
                .unwrap_or_else(|| Season::new(id, String::new()))
        })
        .collect()
}

/// Collect the club's drivers from each season's standings.
///
/// A season whose standings fail contributes nothing and is recorded in
/// [`Discovery::failed_seasons`]. At most `standings_cap` drivers are read
/// per season.
pub async fn discover_drivers<S: DataSource>(
    source: &S,
    seasons: Vec<Season>,
    club_id: u32,
    standings_cap: usize,
) -> Discovery {
    let mut drivers = BTreeSet::new();
    let mut failed_seasons = Vec::new();

    for season in &seasons {
        let query = StandingsQuery::all_weeks(season.season_id, club_id, standings_cap);
        match source.standings(query).await {
            Ok(standings) => {
                debug!(
                    season_id = season.season_id,
                    count = standings.len(),
                    "Read season standings"
                );
                drivers.extend(standings.into_iter().map(|s| s.cust_id));
            }
            Err(e) => {
                warn!(
                    season_id = season.season_id,
                    series = %season.series_name,
                    error = %e,
                    "Skipping season without standings"
                );
                failed_seasons.push(season.season_id);
            }
        }
    }

    info!(
        seasons = seasons.len(),
        failed = failed_seasons.len(),
        drivers = drivers.len(),
        "Driver discovery finished"
    );

    Discovery {
        drivers,
        seasons,
        failed_seasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podium_data::MemorySource;

    fn active() -> Vec<Season> {
        vec![
            Season::new(10, "Skip Barber Race Series"),
            Season::new(11, "Global Mazda MX-5 Cup"),
        ]
    }

    #[test]
    fn test_seasons_to_scan_defaults_to_active() {
        assert_eq!(seasons_to_scan(active(), None), active());
    }

    #[test]
    fn test_seasons_to_scan_pinned() {
        let seasons = seasons_to_scan(active(), Some(&[11, 99]));
        assert_eq!(seasons.len(), 2);
        assert_eq!(seasons[0].series_name, "Global Mazda MX-5 Cup");
        assert_eq!(seasons[1], Season::new(99, ""));
    }

    #[tokio::test]
    async fn test_discovery_caps_each_season() {
        let source = MemorySource::new()
            .with_standings(10, vec![DriverId(1), DriverId(2), DriverId(3)])
            .with_standings(11, vec![DriverId(3), DriverId(4)]);

        let discovery = discover_drivers(&source, active(), 45, 2).await;

        let ids: Vec<u64> = discovery.drivers.iter().map(|d| d.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(discovery.is_complete());
    }

    #[tokio::test]
    async fn test_discovery_records_missing_standings() {
        let source = MemorySource::new().with_standings(10, vec![DriverId(5)]);

        let discovery = discover_drivers(&source, active(), 45, 100).await;

        assert_eq!(discovery.drivers.len(), 1);
        assert_eq!(discovery.failed_seasons, vec![11]);
    }

    #[tokio::test]
    async fn test_discovery_without_seasons() {
        let discovery = discover_drivers(&MemorySource::new(), vec![], 45, 100).await;
        assert!(discovery.drivers.is_empty());
        assert!(discovery.is_complete());
    }
}

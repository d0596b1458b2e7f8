//! In-memory data source.
//!
//! Holds seasons, standings, event results and subsessions in plain maps and
//! answers [`DataSource`] calls from them with the same filtering, ordering
//! and truncation the remote API applies. Any season, driver or subsession can
//! be marked as failing, and driver lookups can be delayed to exercise
//! out-of-order completion.
//!
//! A source can be loaded from a JSON fixture:
//!
//! ```json
//! {
//!   "seasons": [{ "season_id": 649, "series_name": "GT3 Sprint" }],
//!   "standings": { "649": [7, 9] },
//!   "event_results": [
//!     { "category": "road", "quarter": 2, "race_week": 2, "results": [ ... ] }
//!   ],
//!   "subsessions": { "555": { "series_name": "GT3 Sprint", "drivers": [] } },
//!   "failures": { "seasons": [228], "drivers": [], "subsessions": [] }
//! }
//! ```

use crate::error::{DataError, Result};
use crate::source::{ALL_RACE_WEEKS, DataSource, EventQuery, StandingsQuery, sort_event_results};
use crate::types::{
    Category, DriverId, EventResult, Season, SeasonId, Standing, SubsessionDetail, SubsessionId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;

/// Event results of one week and category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekResults {
    /// License category
    pub category: Category,
    /// Season quarter
    pub quarter: u8,
    /// Race week
    pub race_week: i32,
    /// Results of every driver in that week
    pub results: Vec<EventResult>,
}

/// Calls that should fail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FailurePlan {
    /// Fail the active seasons listing
    #[serde(default)]
    pub active_seasons: bool,
    /// Seasons whose standings fail
    #[serde(default)]
    pub seasons: BTreeSet<SeasonId>,
    /// Drivers whose event results fail
    #[serde(default)]
    pub drivers: BTreeSet<DriverId>,
    /// Subsessions whose detail lookup fails
    #[serde(default)]
    pub subsessions: BTreeSet<SubsessionId>,
}

/// Data source backed by in-memory records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemorySource {
    #[serde(default)]
    seasons: Vec<Season>,
    /// Club-scoped leaderboards, best first
    #[serde(default)]
    standings: BTreeMap<SeasonId, Vec<DriverId>>,
    #[serde(default)]
    event_results: Vec<WeekResults>,
    #[serde(default)]
    subsessions: BTreeMap<SubsessionId, SubsessionDetail>,
    #[serde(default)]
    failures: FailurePlan,
    #[serde(skip)]
    delays: BTreeMap<DriverId, Duration>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON fixture.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON fixture from disk.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Add an active season.
    pub fn with_season(mut self, season: Season) -> Self {
        self.seasons.push(season);
        self
    }

    /// Set a season's club leaderboard, best first.
    pub fn with_standings(mut self, season_id: SeasonId, drivers: Vec<DriverId>) -> Self {
        self.standings.insert(season_id, drivers);
        self
    }

    /// Add a result to the given week and category.
    pub fn with_event_result(
        mut self,
        category: Category,
        quarter: u8,
        race_week: i32,
        result: EventResult,
    ) -> Self {
        if let Some(week) = self
            .event_results
            .iter_mut()
            .find(|w| w.category == category && w.quarter == quarter && w.race_week == race_week)
        {
            week.results.push(result);
        } else {
            self.event_results.push(WeekResults {
                category,
                quarter,
                race_week,
                results: vec![result],
            });
        }
        self
    }

    /// Add a subsession.
    pub fn with_subsession(
        mut self,
        subsession_id: SubsessionId,
        detail: SubsessionDetail,
    ) -> Self {
        self.subsessions.insert(subsession_id, detail);
        self
    }

    /// Make the active seasons listing fail.
    pub fn fail_active_seasons(mut self) -> Self {
        self.failures.active_seasons = true;
        self
    }

    /// Make a season's standings request fail.
    pub fn fail_standings(mut self, season_id: SeasonId) -> Self {
        self.failures.seasons.insert(season_id);
        self
    }

    /// Make a driver's event results request fail.
    pub fn fail_driver(mut self, cust_id: DriverId) -> Self {
        self.failures.drivers.insert(cust_id);
        self
    }

    /// Make a subsession lookup fail.
    pub fn fail_subsession(mut self, subsession_id: SubsessionId) -> Self {
        self.failures.subsessions.insert(subsession_id);
        self
    }

    /// Delay a driver's event results response.
    pub fn delay_driver(mut self, cust_id: DriverId, delay: Duration) -> Self {
        self.delays.insert(cust_id, delay);
        self
    }

    fn lookup_standings(&self, query: StandingsQuery) -> Result<Vec<Standing>> {
        if self.failures.seasons.contains(&query.season_id) {
            return Err(DataError::Unavailable(format!(
                "standings for season {}",
                query.season_id
            )));
        }

        let drivers = self.standings.get(&query.season_id).ok_or_else(|| {
            DataError::NotFound(format!(
                "club {} has no standings in season {}",
                query.club_id, query.season_id
            ))
        })?;

        Ok(drivers
            .iter()
            .take(query.result_cap)
            .map(|&cust_id| Standing {
                cust_id,
                season_id: query.season_id,
            })
            .collect())
    }

    fn lookup_event_results(&self, query: EventQuery) -> Result<Vec<EventResult>> {
        if query.race_week == ALL_RACE_WEEKS {
            return Err(DataError::InvalidQuery(
                "event results need a single race week".to_string(),
            ));
        }
        if self.failures.drivers.contains(&query.cust_id) {
            return Err(DataError::Unavailable(format!(
                "event results for driver {}",
                query.cust_id
            )));
        }

        let mut results: Vec<EventResult> = self
            .event_results
            .iter()
            .filter(|w| {
                w.category == query.category
                    && w.quarter == query.quarter
                    && w.race_week == query.race_week
            })
            .flat_map(|w| w.results.iter())
            .filter(|r| r.cust_id == query.cust_id)
            .cloned()
            .collect();

        sort_event_results(&mut results, query.sort, query.order);
        results.truncate(query.result_cap);
        Ok(results)
    }

    fn lookup_subsession(&self, subsession_id: SubsessionId) -> Result<SubsessionDetail> {
        if self.failures.subsessions.contains(&subsession_id) {
            return Err(DataError::Unavailable(format!("subsession {}", subsession_id)));
        }
        self.subsessions
            .get(&subsession_id)
            .cloned()
            .ok_or_else(|| DataError::NotFound(format!("subsession {}", subsession_id)))
    }
}

impl DataSource for MemorySource {
    async fn active_seasons(&self) -> Result<Vec<Season>> {
        if self.failures.active_seasons {
            return Err(DataError::Unavailable("active seasons".to_string()));
        }
        Ok(self.seasons.clone())
    }

    async fn standings(&self, query: StandingsQuery) -> Result<Vec<Standing>> {
        self.lookup_standings(query)
    }

    async fn event_results(&self, query: EventQuery) -> Result<Vec<EventResult>> {
        if let Some(delay) = self.delays.get(&query.cust_id) {
            sleep(*delay).await;
        }
        self.lookup_event_results(query)
    }

    async fn subsession_detail(&self, subsession_id: SubsessionId) -> Result<SubsessionDetail> {
        self.lookup_subsession(subsession_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn result(cust_id: u64, subsession_id: SubsessionId, points_champ: i32) -> EventResult {
        EventResult {
            cust_id: DriverId(cust_id),
            subsession_id,
            display_name: format!("Driver {}", cust_id),
            date_start: NaiveDate::from_ymd_opt(2024, 4, 9).unwrap(),
            points_champ,
            points_club: 2,
            pos_start: 4,
            pos_finish: 2,
            strength_of_field: 1800,
        }
    }

    #[tokio::test]
    async fn test_standings_truncated_to_cap() {
        let source =
            MemorySource::new().with_standings(649, vec![DriverId(1), DriverId(2), DriverId(3)]);
        let standings = source
            .standings(StandingsQuery::all_weeks(649, 45, 2))
            .await
            .unwrap();
        assert_eq!(standings.len(), 2);
        assert_eq!(standings[0].cust_id, DriverId(1));
        assert_eq!(standings[1].season_id, 649);
    }

    #[tokio::test]
    async fn test_standings_missing_season_is_not_found() {
        let source = MemorySource::new();
        let result = source.standings(StandingsQuery::all_weeks(1, 45, 100)).await;
        assert!(matches!(result, Err(DataError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_event_results_filtered_and_sorted() {
        let source = MemorySource::new()
            .with_event_result(Category::Road, 2, 2, result(7, 100, 40))
            .with_event_result(Category::Road, 2, 2, result(7, 101, 90))
            .with_event_result(Category::Road, 2, 2, result(9, 102, 70))
            .with_event_result(Category::Oval, 2, 2, result(7, 103, 200))
            .with_event_result(Category::Road, 2, 3, result(7, 104, 300));

        let query = EventQuery::new(DriverId(7), None, 2, 2, Category::Road, 100);
        let results = source.event_results(query).await.unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.subsession_id).collect();
        assert_eq!(ids, vec![101, 100]);
    }

    #[tokio::test]
    async fn test_event_results_respect_cap() {
        let source = MemorySource::new()
            .with_event_result(Category::Road, 2, 2, result(7, 100, 40))
            .with_event_result(Category::Road, 2, 2, result(7, 101, 90));
        let query = EventQuery::new(DriverId(7), None, 2, 2, Category::Road, 1);
        let results = source.event_results(query).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].points_champ, 90);
    }

    #[tokio::test]
    async fn test_event_results_reject_all_weeks() {
        let source = MemorySource::new();
        let query = EventQuery::new(DriverId(7), None, 2, ALL_RACE_WEEKS, Category::Road, 10);
        let result = source.event_results(query).await;
        assert!(matches!(result, Err(DataError::InvalidQuery(_))));
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let source = MemorySource::new()
            .with_standings(649, vec![DriverId(1)])
            .fail_active_seasons()
            .fail_standings(649)
            .fail_driver(DriverId(1))
            .fail_subsession(555);

        assert!(source.active_seasons().await.is_err());
        assert!(
            source
                .standings(StandingsQuery::all_weeks(649, 45, 10))
                .await
                .is_err()
        );
        let query = EventQuery::new(DriverId(1), None, 2, 2, Category::Road, 10);
        assert!(source.event_results(query).await.is_err());
        assert!(matches!(
            source.subsession_detail(555).await,
            Err(DataError::Unavailable(_))
        ));
    }
}

//! Result aggregation across drivers.

use futures::stream::{self, StreamExt};
use podium_data::{Category, DataSource, DriverId, EventQuery, EventResult};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Season, quarter and race week whose results are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceWindow {
    /// Season year; `None` means the current one
    pub season_year: Option<i32>,
    /// Season quarter
    pub quarter: u8,
    /// Race week within the quarter
    pub race_week: i32,
}

/// Results of every driver for one category and week.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    /// Drivers that were asked, in request order
    pub drivers: Vec<DriverId>,
    /// Results in driver order, best first within a driver
    pub results: Vec<EventResult>,
    /// Drivers whose lookup failed
    pub failed_drivers: Vec<DriverId>,
}

impl Aggregate {
    /// Results grouped by driver.
    ///
    /// Every requested driver has an entry, empty when it had no results or
    /// its lookup failed.
    pub fn by_driver(&self) -> BTreeMap<DriverId, Vec<EventResult>> {
        let mut grouped: BTreeMap<DriverId, Vec<EventResult>> =
            self.drivers.iter().map(|&id| (id, Vec::new())).collect();
        for result in &self.results {
            grouped.entry(result.cust_id).or_default().push(result.clone());
        }
        grouped
    }

    /// Take the flat result list.
    pub fn into_results(self) -> Vec<EventResult> {
        self.results
    }
}

/// Collect every driver's results for `category` within `window`.
///
/// Up to `concurrency` lookups run at once; the output keeps driver order no
/// matter which lookup finishes first. A failed driver contributes nothing
/// and is listed in [`Aggregate::failed_drivers`].
pub async fn aggregate_results<S, I>(
    source: &S,
    drivers: I,
    category: Category,
    window: RaceWindow,
    result_cap: usize,
    concurrency: usize,
) -> Aggregate
where
    S: DataSource,
    I: IntoIterator<Item = DriverId>,
{
    let drivers: Vec<DriverId> = drivers.into_iter().collect();

    let outcomes: Vec<_> = stream::iter(drivers.iter().copied())
        .map(|cust_id| async move {
            let query = EventQuery::new(
                cust_id,
                window.season_year,
                window.quarter,
                window.race_week,
                category,
                result_cap,
            );
            (cust_id, source.event_results(query).await)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut results = Vec::new();
    let mut failed_drivers = Vec::new();
    for (cust_id, outcome) in outcomes {
        match outcome {
            Ok(found) => {
                debug!(%cust_id, count = found.len(), "Read driver results");
                results.extend(found);
            }
            Err(e) => {
                warn!(%cust_id, %category, error = %e, "Skipping driver without results");
                failed_drivers.push(cust_id);
            }
        }
    }

    info!(
        %category,
        drivers = drivers.len(),
        failed = failed_drivers.len(),
        results = results.len(),
        "Aggregated driver results"
    );

    Aggregate {
        drivers,
        results,
        failed_drivers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use podium_data::MemorySource;

    const WINDOW: RaceWindow = RaceWindow {
        season_year: None,
        quarter: 2,
        race_week: 2,
    };

    fn result(cust_id: u64, subsession_id: u64, points_champ: i32) -> EventResult {
        EventResult {
            cust_id: DriverId(cust_id),
            subsession_id,
            display_name: format!("Driver {}", cust_id),
            date_start: NaiveDate::from_ymd_opt(2024, 4, 9).unwrap(),
            points_champ,
            points_club: 1,
            pos_start: 3,
            pos_finish: 2,
            strength_of_field: 1800,
        }
    }

    #[tokio::test]
    async fn test_results_follow_driver_order() {
        let source = MemorySource::new()
            .with_event_result(Category::Road, 2, 2, result(2, 20, 40))
            .with_event_result(Category::Road, 2, 2, result(1, 10, 30))
            .with_event_result(Category::Road, 2, 2, result(1, 11, 90));

        let aggregate =
            aggregate_results(&source, [DriverId(1), DriverId(2)], Category::Road, WINDOW, 100, 1)
                .await;

        let ids: Vec<u64> = aggregate.results.iter().map(|r| r.subsession_id).collect();
        assert_eq!(ids, vec![11, 10, 20]);
        assert!(aggregate.failed_drivers.is_empty());
    }

    #[tokio::test]
    async fn test_other_category_and_week_ignored() {
        let source = MemorySource::new()
            .with_event_result(Category::Oval, 2, 2, result(1, 10, 30))
            .with_event_result(Category::Road, 2, 3, result(1, 11, 30));

        let aggregate =
            aggregate_results(&source, [DriverId(1)], Category::Road, WINDOW, 100, 4).await;

        assert!(aggregate.results.is_empty());
    }

    #[tokio::test]
    async fn test_result_cap_per_driver() {
        let source = MemorySource::new()
            .with_event_result(Category::Road, 2, 2, result(1, 10, 30))
            .with_event_result(Category::Road, 2, 2, result(1, 11, 60))
            .with_event_result(Category::Road, 2, 2, result(1, 12, 45));

        let aggregate =
            aggregate_results(&source, [DriverId(1)], Category::Road, WINDOW, 2, 1).await;

        let points: Vec<i32> = aggregate.results.iter().map(|r| r.points_champ).collect();
        assert_eq!(points, vec![60, 45]);
    }

    #[tokio::test]
    async fn test_by_driver_seeds_every_driver() {
        let source = MemorySource::new()
            .with_event_result(Category::Road, 2, 2, result(1, 10, 30))
            .fail_driver(DriverId(3));

        let aggregate = aggregate_results(
            &source,
            [DriverId(1), DriverId(2), DriverId(3)],
            Category::Road,
            WINDOW,
            100,
            2,
        )
        .await;

        let grouped = aggregate.by_driver();
        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[&DriverId(1)].len(), 1);
        assert!(grouped[&DriverId(2)].is_empty());
        assert!(grouped[&DriverId(3)].is_empty());
        assert_eq!(aggregate.failed_drivers, vec![DriverId(3)]);
    }
}

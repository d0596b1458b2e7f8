//! Joining ranked results with their race details.

use futures::stream::{self, StreamExt};
use podium_data::{DataSource, EnrichedResult, EventResult, SubsessionDetail, SubsessionId};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Enriched results plus the races whose details were unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    /// One entry per ranked result, in ranked order
    pub results: Vec<EnrichedResult>,
    /// Subsessions whose detail lookup failed
    pub failed_subsessions: Vec<SubsessionId>,
}

impl Enrichment {
    /// Number of results left without series name or iRating change.
    pub fn unenriched(&self) -> usize {
        self.results.iter().filter(|r| r.series_name.is_none()).count()
    }
}

/// Join each result with the series name and iRating change of its race.
///
/// Each distinct subsession is fetched once, with up to `concurrency` lookups
/// in flight. A failed lookup leaves both fields empty for every result of
/// that race; a driver missing from the roster leaves only the iRating change
/// empty.
pub async fn enrich_results<S: DataSource>(
    source: &S,
    ranked: Vec<EventResult>,
    concurrency: usize,
) -> Enrichment {
    let mut seen = HashSet::new();
    let distinct: Vec<SubsessionId> = ranked
        .iter()
        .map(|r| r.subsession_id)
        .filter(|id| seen.insert(*id))
        .collect();

    let fetched: Vec<(SubsessionId, Option<SubsessionDetail>)> = stream::iter(distinct)
        .map(|subsession_id| async move {
            match source.subsession_detail(subsession_id).await {
                Ok(detail) => {
                    debug!(subsession_id, series = %detail.series_name, "Read race detail");
                    (subsession_id, Some(detail))
                }
                Err(e) => {
                    warn!(subsession_id, error = %e, "Race detail unavailable");
                    (subsession_id, None)
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let failed_subsessions = fetched
        .iter()
        .filter(|(_, detail)| detail.is_none())
        .map(|(id, _)| *id)
        .collect();
    let details: HashMap<SubsessionId, Option<SubsessionDetail>> = fetched.into_iter().collect();

    let results = ranked
        .into_iter()
        .map(|er| match details.get(&er.subsession_id) {
            Some(Some(detail)) => EnrichedResult::joined(er, detail),
            _ => EnrichedResult::bare(er),
        })
        .collect();

    Enrichment {
        results,
        failed_subsessions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use podium_data::{DriverId, MemorySource, RosterEntry};

    fn result(cust_id: u64, subsession_id: u64) -> EventResult {
        EventResult {
            cust_id: DriverId(cust_id),
            subsession_id,
            display_name: format!("Driver {}", cust_id),
            date_start: NaiveDate::from_ymd_opt(2024, 4, 9).unwrap(),
            points_champ: 100,
            points_club: 4,
            pos_start: 5,
            pos_finish: 1,
            strength_of_field: 2100,
        }
    }

    fn detail(series: &str, drivers: Vec<RosterEntry>) -> SubsessionDetail {
        SubsessionDetail {
            series_name: series.to_string(),
            drivers,
        }
    }

    #[tokio::test]
    async fn test_gain_from_roster() {
        let source = MemorySource::new().with_subsession(
            555,
            detail(
                "GT3 Sprint",
                vec![RosterEntry {
                    cust_id: DriverId(7),
                    irating_old: 2000,
                    irating_new: 1968,
                }],
            ),
        );

        let enrichment = enrich_results(&source, vec![result(7, 555)], 2).await;

        assert_eq!(enrichment.results[0].series_name.as_deref(), Some("GT3 Sprint"));
        assert_eq!(enrichment.results[0].irating_gain, Some(-32));
        assert_eq!(enrichment.unenriched(), 0);
    }

    #[tokio::test]
    async fn test_failed_lookup_keeps_result() {
        let source = MemorySource::new().fail_subsession(555);

        let enrichment = enrich_results(&source, vec![result(7, 555)], 1).await;

        let enriched = &enrichment.results[0];
        assert_eq!(enriched.event_result, result(7, 555));
        assert_eq!(enriched.series_name, None);
        assert_eq!(enriched.irating_gain, None);
        assert_eq!(enrichment.failed_subsessions, vec![555]);
        assert_eq!(enrichment.unenriched(), 1);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let enrichment = enrich_results(&MemorySource::new(), vec![], 4).await;
        assert_eq!(enrichment, Enrichment::default());
    }
}

//! The data source boundary used by the report pipeline.

use crate::error::Result;
use crate::types::{
    Category, DriverId, EventResult, Season, SeasonId, Standing, SubsessionDetail, SubsessionId,
};
use std::future::Future;

/// Race week value meaning "every week of the season".
pub const ALL_RACE_WEEKS: i32 = -1;

/// Field event results are ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    /// Championship points
    #[default]
    ChampPoints,
    /// Club points
    ClubPoints,
    /// Race start time
    StartTime,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Largest first
    #[default]
    Descending,
    /// Smallest first
    Ascending,
}

/// Parameters of a club-scoped standings request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandingsQuery {
    /// Season to read the leaderboard of
    pub season_id: SeasonId,
    /// Club to filter the leaderboard to
    pub club_id: u32,
    /// 0-based race week, or [`ALL_RACE_WEEKS`]
    pub race_week: i32,
    /// Maximum number of standings returned; the source truncates beyond it
    pub result_cap: usize,
}

impl StandingsQuery {
    /// Standings across all race weeks of a season.
    pub const fn all_weeks(season_id: SeasonId, club_id: u32, result_cap: usize) -> Self {
        Self {
            season_id,
            club_id,
            race_week: ALL_RACE_WEEKS,
            result_cap,
        }
    }
}

/// Parameters of a per-driver event results request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventQuery {
    /// Driver
    pub cust_id: DriverId,
    /// Season year; `None` lets the source pick the current one
    pub season_year: Option<i32>,
    /// Season quarter, 1 to 4
    pub quarter: u8,
    /// Race week within the quarter, 0-based (0 is the first week)
    pub race_week: i32,
    /// License category
    pub category: Category,
    /// Maximum number of results returned
    pub result_cap: usize,
    /// Ordering field
    pub sort: SortField,
    /// Ordering direction
    pub order: SortOrder,
}

impl EventQuery {
    /// Results for one driver and week, best championship score first.
    pub const fn new(
        cust_id: DriverId,
        season_year: Option<i32>,
        quarter: u8,
        race_week: i32,
        category: Category,
        result_cap: usize,
    ) -> Self {
        Self {
            cust_id,
            season_year,
            quarter,
            race_week,
            category,
            result_cap,
            sort: SortField::ChampPoints,
            order: SortOrder::Descending,
        }
    }
}

/// A remote source of racing data.
///
/// Every call may fail independently; callers decide how to recover.
pub trait DataSource {
    /// Seasons that are currently running.
    fn active_seasons(&self) -> impl Future<Output = Result<Vec<Season>>> + Send;

    /// Club-scoped leaderboard of one season, ordered by championship points.
    fn standings(&self, query: StandingsQuery)
    -> impl Future<Output = Result<Vec<Standing>>> + Send;

    /// A driver's official race results within a week.
    fn event_results(&self, query: EventQuery)
    -> impl Future<Output = Result<Vec<EventResult>>> + Send;

    /// Series name and roster of one race.
    fn subsession_detail(
        &self,
        subsession_id: SubsessionId,
    ) -> impl Future<Output = Result<SubsessionDetail>> + Send;
}

/// Stable in-place sort of event results as requested by a query.
pub fn sort_event_results(results: &mut [EventResult], sort: SortField, order: SortOrder) {
    results.sort_by(|a, b| {
        let ord = match sort {
            SortField::ChampPoints => a.points_champ.cmp(&b.points_champ),
            SortField::ClubPoints => a.points_club.cmp(&b.points_club),
            SortField::StartTime => a.date_start.cmp(&b.date_start),
        };
        match order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });
}

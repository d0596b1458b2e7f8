//! Racing records shared by every data source.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Season identifier.
pub type SeasonId = u32;

/// Subsession identifier.
pub type SubsessionId = u64;

/// Opaque customer (driver) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(pub u64);

impl DriverId {
    /// Raw numeric id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for DriverId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// License category a race counts towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Oval
    Oval,
    /// Road
    Road,
    /// Dirt oval
    DirtOval,
    /// Dirt road
    DirtRoad,
}

impl Category {
    /// All categories in upstream id order.
    pub const ALL: [Self; 4] = [Self::Oval, Self::Road, Self::DirtOval, Self::DirtRoad];

    /// Numeric category id used by the iRacing API.
    pub const fn id(&self) -> u8 {
        match self {
            Self::Oval => 1,
            Self::Road => 2,
            Self::DirtOval => 3,
            Self::DirtRoad => 4,
        }
    }

    /// Short lowercase name, also used in report file names.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Oval => "oval",
            Self::Road => "road",
            Self::DirtOval => "dirt_oval",
            Self::DirtRoad => "dirt_road",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|c| c.name() == normalized)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// A running instance of a racing series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    /// Season id
    pub season_id: SeasonId,
    /// Display name of the series
    pub series_name: String,
}

impl Season {
    /// Create a new season.
    pub fn new(season_id: SeasonId, series_name: impl Into<String>) -> Self {
        Self {
            season_id,
            series_name: series_name.into(),
        }
    }
}

/// A driver's entry on a season's club-scoped leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// Driver on the leaderboard
    pub cust_id: DriverId,
    /// Season the leaderboard belongs to
    pub season_id: SeasonId,
}

/// One driver's result in one official race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResult {
    /// Driver
    pub cust_id: DriverId,
    /// Race the result comes from
    pub subsession_id: SubsessionId,
    /// Driver display name
    pub display_name: String,
    /// Race start date
    pub date_start: NaiveDate,
    /// Championship points scored
    pub points_champ: i32,
    /// Club points scored
    pub points_club: i32,
    /// Starting position, 1-based
    pub pos_start: u32,
    /// Finishing position, 1-based
    pub pos_finish: u32,
    /// Strength of field
    pub strength_of_field: u32,
}

/// A driver line in a subsession's race results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Driver
    pub cust_id: DriverId,
    /// iRating before the race
    pub irating_old: i32,
    /// iRating after the race
    pub irating_new: i32,
}

impl RosterEntry {
    /// Rating change caused by the race.
    pub const fn irating_gain(&self) -> i32 {
        self.irating_new - self.irating_old
    }
}

/// Details of a single completed race session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsessionDetail {
    /// Series the session ran in
    pub series_name: String,
    /// Drivers classified in the race
    pub drivers: Vec<RosterEntry>,
}

impl SubsessionDetail {
    /// Find a driver's roster line.
    pub fn driver(&self, cust_id: DriverId) -> Option<&RosterEntry> {
        self.drivers.iter().find(|d| d.cust_id == cust_id)
    }
}

/// An event result joined with its subsession's series and rating change.
///
/// `series_name` is `None` when the subsession lookup failed; `irating_gain` is
/// also `None` when the driver is missing from the subsession's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedResult {
    /// The ranked result, unchanged
    pub event_result: EventResult,
    /// Series the race belonged to
    pub series_name: Option<String>,
    /// iRating change from the race
    pub irating_gain: Option<i32>,
}

impl EnrichedResult {
    /// Result without any enrichment.
    pub const fn bare(event_result: EventResult) -> Self {
        Self {
            event_result,
            series_name: None,
            irating_gain: None,
        }
    }

    /// Join a result with a successfully fetched subsession.
    pub fn joined(event_result: EventResult, detail: &SubsessionDetail) -> Self {
        let irating_gain = detail
            .driver(event_result.cust_id)
            .map(RosterEntry::irating_gain);
        Self {
            event_result,
            series_name: Some(detail.series_name.clone()),
            irating_gain,
        }
    }
}

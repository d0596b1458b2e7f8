//! Response shapes of the iRacing members data API.
//!
//! Only the fields the report needs are deserialized.

use crate::types::{DriverId, EventResult, RosterEntry, SeasonId, SubsessionDetail, SubsessionId};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Answer to the login request.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    /// 0 when the login was rejected
    #[serde(default)]
    pub(crate) authcode: serde_json::Value,
    #[serde(default)]
    pub(crate) message: Option<String>,
}

impl AuthResponse {
    pub(crate) fn is_authenticated(&self) -> bool {
        match &self.authcode {
            serde_json::Value::Null => false,
            serde_json::Value::Number(n) => n.as_i64() != Some(0),
            serde_json::Value::String(s) => !s.is_empty() && s != "0",
            _ => true,
        }
    }
}

/// Every data endpoint answers with a short-lived link to the payload.
#[derive(Debug, Deserialize)]
pub(crate) struct LinkResponse {
    pub(crate) link: String,
}

/// Pointer to a result set split into several files.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChunkInfo {
    #[serde(default)]
    pub(crate) base_download_url: String,
    #[serde(default)]
    pub(crate) chunk_file_names: Vec<String>,
}

impl ChunkInfo {
    pub(crate) fn urls(&self) -> impl Iterator<Item = String> + '_ {
        self.chunk_file_names
            .iter()
            .map(|name| format!("{}{}", self.base_download_url, name))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireSeason {
    pub(crate) season_id: SeasonId,
    #[serde(default)]
    pub(crate) season_name: String,
    #[serde(default)]
    pub(crate) series_name: Option<String>,
    #[serde(default)]
    pub(crate) car_class_ids: Vec<u32>,
    #[serde(default = "default_true")]
    pub(crate) active: bool,
}

const fn default_true() -> bool {
    true
}

impl WireSeason {
    pub(crate) fn display_name(&self) -> String {
        self.series_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.season_name.clone())
    }
}

/// Envelope of the standings payload.
#[derive(Debug, Deserialize)]
pub(crate) struct StandingsEnvelope {
    pub(crate) chunk_info: Option<ChunkInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireStanding {
    pub(crate) cust_id: u64,
    #[serde(default)]
    pub(crate) points: i32,
}

/// Envelope of the search results payload.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchEnvelope {
    pub(crate) data: SearchData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchData {
    #[serde(default)]
    pub(crate) success: bool,
    pub(crate) chunk_info: Option<ChunkInfo>,
}

/// One driver's line in a series search.
#[derive(Debug, Deserialize)]
pub(crate) struct WireSearchResult {
    pub(crate) subsession_id: SubsessionId,
    pub(crate) cust_id: u64,
    #[serde(default)]
    pub(crate) display_name: String,
    pub(crate) start_time: DateTime<Utc>,
    #[serde(default)]
    pub(crate) champ_points: i32,
    #[serde(default)]
    pub(crate) club_points: i32,
    /// Zero-based
    #[serde(default)]
    pub(crate) starting_position: u32,
    /// Zero-based
    #[serde(default)]
    pub(crate) finish_position: u32,
    #[serde(default)]
    pub(crate) event_strength_of_field: u32,
}

impl From<WireSearchResult> for EventResult {
    fn from(row: WireSearchResult) -> Self {
        Self {
            cust_id: DriverId(row.cust_id),
            subsession_id: row.subsession_id,
            display_name: row.display_name,
            date_start: row.start_time.date_naive(),
            points_champ: row.champ_points,
            points_club: row.club_points,
            pos_start: row.starting_position + 1,
            pos_finish: row.finish_position + 1,
            strength_of_field: row.event_strength_of_field,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireSubsession {
    #[serde(default)]
    pub(crate) series_name: String,
    #[serde(default)]
    pub(crate) session_results: Vec<WireSession>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireSession {
    /// 0 is the main event; practice and qualifying are negative
    pub(crate) simsession_number: i32,
    #[serde(default)]
    pub(crate) results: Vec<WireDriverResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireDriverResult {
    /// Missing on team rows
    pub(crate) cust_id: Option<u64>,
    #[serde(default)]
    pub(crate) oldi_rating: i32,
    #[serde(default)]
    pub(crate) newi_rating: i32,
    #[serde(default)]
    pub(crate) driver_results: Vec<WireDriverResult>,
}

impl WireDriverResult {
    fn collect_into(&self, roster: &mut Vec<RosterEntry>) {
        if let Some(cust_id) = self.cust_id {
            roster.push(RosterEntry {
                cust_id: DriverId(cust_id),
                irating_old: self.oldi_rating,
                irating_new: self.newi_rating,
            });
        }
        for driver in &self.driver_results {
            driver.collect_into(roster);
        }
    }
}

impl From<WireSubsession> for SubsessionDetail {
    fn from(wire: WireSubsession) -> Self {
        let race = wire
            .session_results
            .iter()
            .find(|s| s.simsession_number == 0)
            .or_else(|| wire.session_results.last());

        let mut drivers = Vec::new();
        if let Some(race) = race {
            for row in &race.results {
                row.collect_into(&mut drivers);
            }
        }

        Self {
            series_name: wire.series_name,
            drivers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_codes() {
        let ok: AuthResponse = serde_json::from_str(r#"{"authcode": "abc123"}"#).unwrap();
        assert!(ok.is_authenticated());

        let rejected: AuthResponse =
            serde_json::from_str(r#"{"authcode": 0, "message": "Invalid email"}"#).unwrap();
        assert!(!rejected.is_authenticated());
        assert_eq!(rejected.message.as_deref(), Some("Invalid email"));
    }

    #[test]
    fn test_chunk_urls() {
        let info: ChunkInfo = serde_json::from_str(
            r#"{"base_download_url": "https://s3/abc/", "chunk_file_names": ["a.json", "b.json"]}"#,
        )
        .unwrap();
        let urls: Vec<_> = info.urls().collect();
        assert_eq!(urls, vec!["https://s3/abc/a.json", "https://s3/abc/b.json"]);
    }

    #[test]
    fn test_search_result_positions_become_one_based() {
        let row: WireSearchResult = serde_json::from_str(
            r#"{
                "subsession_id": 555,
                "cust_id": 7,
                "display_name": "Sam Driver",
                "start_time": "2024-04-09T18:00:00Z",
                "champ_points": 120,
                "club_points": 12,
                "starting_position": 3,
                "finish_position": 0,
                "event_strength_of_field": 2150
            }"#,
        )
        .unwrap();

        let result = EventResult::from(row);
        assert_eq!(result.cust_id, DriverId(7));
        assert_eq!(result.pos_start, 4);
        assert_eq!(result.pos_finish, 1);
        assert_eq!(result.date_start.to_string(), "2024-04-09");
    }

    #[test]
    fn test_subsession_uses_main_event_and_team_drivers() {
        let wire: WireSubsession = serde_json::from_str(
            r#"{
                "series_name": "GT3 Sprint",
                "session_results": [
                    {"simsession_number": -1, "results": [
                        {"cust_id": 7, "oldi_rating": 1, "newi_rating": 1}
                    ]},
                    {"simsession_number": 0, "results": [
                        {"cust_id": 7, "oldi_rating": 2000, "newi_rating": 2040},
                        {"cust_id": null, "driver_results": [
                            {"cust_id": 9, "oldi_rating": 1500, "newi_rating": 1490}
                        ]}
                    ]}
                ]
            }"#,
        )
        .unwrap();

        let detail = SubsessionDetail::from(wire);
        assert_eq!(detail.series_name, "GT3 Sprint");
        assert_eq!(detail.drivers.len(), 2);
        assert_eq!(detail.driver(DriverId(7)).unwrap().irating_gain(), 40);
        assert_eq!(detail.driver(DriverId(9)).unwrap().irating_gain(), -10);
    }
}

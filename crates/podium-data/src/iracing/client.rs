//! iRacing members data API client with rate limiting.

use super::wire::{
    AuthResponse, ChunkInfo, LinkResponse, SearchEnvelope, StandingsEnvelope, WireSearchResult,
    WireSeason, WireStanding, WireSubsession,
};
use crate::error::{DataError, Result};
use crate::source::{ALL_RACE_WEEKS, DataSource, EventQuery, StandingsQuery, sort_event_results};
use crate::types::{
    DriverId, EventResult, Season, SeasonId, Standing, SubsessionDetail, SubsessionId,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{Datelike, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// iRacing members data API base URL
const IRACING_BASE_URL: &str = "https://members-ng.iracing.com";

/// Default spacing between requests
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(250);

/// User agent sent with every request
const USER_AGENT: &str = concat!("podium/", env!("CARGO_PKG_VERSION"));

/// Official race event type in series searches
const EVENT_TYPE_RACE: &str = "5";

/// Account used to log in to the members API.
#[derive(Clone)]
pub struct Credentials {
    /// Account email
    pub username: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Create credentials from an email and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Password as the login endpoint expects it: base64 of
    /// SHA-256(password + lowercase email).
    pub fn encoded_password(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.password.as_bytes());
        hasher.update(self.username.to_lowercase().as_bytes());
        BASE64.encode(hasher.finalize())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Rate limiter to keep request bursts within the API's limits
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now()
                .checked_sub(min_interval)
                .unwrap_or_else(Instant::now),
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// iRacing members data API client
pub struct IracingClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    base_url: String,
    credentials: Credentials,
    /// Car classes per season, learned from the season listing
    car_classes: Mutex<HashMap<SeasonId, Vec<u32>>>,
}

impl IracingClient {
    /// Create a client with the default request spacing.
    ///
    /// The client is not logged in yet; call [`IracingClient::login`] first.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_rate_limit(credentials, DEFAULT_RATE_LIMIT)
    }

    /// Create a client with custom request spacing.
    ///
    /// # Arguments
    /// * `credentials` - Account to log in with
    /// * `min_interval` - Minimum duration between requests
    pub fn with_rate_limit(credentials: Credentials, min_interval: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(min_interval))),
            base_url: IRACING_BASE_URL.to_string(),
            credentials,
            car_classes: Mutex::new(HashMap::new()),
        })
    }

    /// Point the client at another host, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Log in and keep the session cookie for later calls.
    ///
    /// # Errors
    /// Returns `DataError::Auth` if the account is rejected.
    pub async fn login(&self) -> Result<()> {
        if self.credentials.username.is_empty() || self.credentials.password.is_empty() {
            return Err(DataError::Auth("missing username or password".to_string()));
        }

        self.rate_limiter.lock().await.wait().await;

        let url = format!("{}/auth", self.base_url);
        let body = serde_json::json!({
            "email": self.credentials.username,
            "password": self.credentials.encoded_password(),
        });
        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(DataError::Auth(format!(
                "login rejected: HTTP {}",
                response.status()
            )));
        }

        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| DataError::Parse(format!("Failed to parse login response: {}", e)))?;

        if !auth.is_authenticated() {
            return Err(DataError::Auth(
                auth.message.unwrap_or_else(|| "login rejected".to_string()),
            ));
        }

        debug!(username = %self.credentials.username, "logged in");
        Ok(())
    }

    /// Fetch a data endpoint and follow the link it returns.
    async fn get_data<T: DeserializeOwned + Send>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        self.rate_limiter.lock().await.wait().await;

        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?params, "GET");
        let response = self.client.get(&url).query(params).send().await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => {
                return Err(DataError::Auth(format!("not logged in for {}", path)));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_ms = response
                    .headers()
                    .get("x-ratelimit-reset")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<i64>().ok())
                    .map_or(0, |reset| {
                        u64::try_from((reset - Utc::now().timestamp()) * 1000).unwrap_or(0)
                    });
                return Err(DataError::RateLimit { retry_after_ms });
            }
            status if !status.is_success() => {
                return Err(DataError::Http {
                    status: status.as_u16(),
                    url,
                });
            }
            _ => {}
        }

        let link: LinkResponse = response
            .json()
            .await
            .map_err(|e| DataError::Parse(format!("Expected a data link from {}: {}", path, e)))?;

        self.fetch_json(&link.link).await
    }

    /// Download a JSON document from a pre-signed link.
    ///
    /// Link and chunk downloads are spaced like API calls.
    async fn fetch_json<T: DeserializeOwned + Send>(&self, url: &str) -> Result<T> {
        self.rate_limiter.lock().await.wait().await;

        debug!(url = url.split('?').next().unwrap_or(url), "GET link");
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(DataError::Http {
                status: response.status().as_u16(),
                url: url.split('?').next().unwrap_or(url).to_string(),
            });
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Download and concatenate every chunk of a result set.
    async fn fetch_chunks<T: DeserializeOwned + Send>(&self, info: &ChunkInfo) -> Result<Vec<T>> {
        let mut rows = Vec::new();
        for url in info.urls() {
            let mut chunk: Vec<T> = self.fetch_json(&url).await?;
            rows.append(&mut chunk);
        }
        Ok(rows)
    }

    async fn fetch_seasons(&self) -> Result<Vec<WireSeason>> {
        let seasons: Vec<WireSeason> = self
            .get_data(
                "/data/series/seasons",
                &[("include_series", "false".to_string())],
            )
            .await?;

        let mut car_classes = self.car_classes.lock().await;
        for season in &seasons {
            car_classes.insert(season.season_id, season.car_class_ids.clone());
        }
        Ok(seasons)
    }

    async fn season_car_classes(&self, season_id: SeasonId) -> Result<Vec<u32>> {
        if let Some(classes) = self.car_classes.lock().await.get(&season_id) {
            return Ok(classes.clone());
        }
        self.fetch_seasons()
            .await?
            .into_iter()
            .find(|s| s.season_id == season_id)
            .map(|s| s.car_class_ids)
            .ok_or_else(|| DataError::NotFound(format!("season {}", season_id)))
    }
}

impl DataSource for IracingClient {
    async fn active_seasons(&self) -> Result<Vec<Season>> {
        let seasons = self.fetch_seasons().await?;
        Ok(seasons
            .into_iter()
            .filter(|s| s.active)
            .map(|s| Season::new(s.season_id, s.display_name()))
            .collect())
    }

    async fn standings(&self, query: StandingsQuery) -> Result<Vec<Standing>> {
        let car_classes = self.season_car_classes(query.season_id).await?;
        if car_classes.is_empty() {
            return Err(DataError::NotFound(format!(
                "season {} has no car classes",
                query.season_id
            )));
        }

        // A driver racing several classes keeps their best points total.
        let mut best: HashMap<u64, i32> = HashMap::new();
        for car_class_id in car_classes {
            let mut params = vec![
                ("season_id", query.season_id.to_string()),
                ("car_class_id", car_class_id.to_string()),
                ("club_id", query.club_id.to_string()),
            ];
            if query.race_week != ALL_RACE_WEEKS {
                params.push(("race_week_num", query.race_week.to_string()));
            }

            let envelope: StandingsEnvelope = self
                .get_data("/data/stats/season_driver_standings", &params)
                .await?;
            let Some(info) = envelope.chunk_info else {
                continue;
            };
            let rows: Vec<WireStanding> = self.fetch_chunks(&info).await?;
            for row in rows {
                let points = best.entry(row.cust_id).or_insert(row.points);
                *points = (*points).max(row.points);
            }
        }

        if best.is_empty() {
            return Err(DataError::NotFound(format!(
                "club {} has no standings in season {}",
                query.club_id, query.season_id
            )));
        }

        let mut ranked: Vec<(u64, i32)> = best.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        Ok(ranked
            .into_iter()
            .take(query.result_cap)
            .map(|(cust_id, _)| Standing {
                cust_id: DriverId(cust_id),
                season_id: query.season_id,
            })
            .collect())
    }

    async fn event_results(&self, query: EventQuery) -> Result<Vec<EventResult>> {
        if query.race_week == ALL_RACE_WEEKS {
            return Err(DataError::InvalidQuery(
                "event results need a single race week".to_string(),
            ));
        }
        if !(1..=4).contains(&query.quarter) {
            return Err(DataError::InvalidQuery(format!(
                "quarter {} is outside 1..=4",
                query.quarter
            )));
        }

        let params = search_params(&query);
        let envelope: SearchEnvelope = self
            .get_data("/data/results/search_series", &params)
            .await?;
        if !envelope.data.success {
            return Err(DataError::Unavailable(format!(
                "series search for driver {}",
                query.cust_id
            )));
        }

        let rows: Vec<WireSearchResult> = match envelope.data.chunk_info {
            Some(info) => self.fetch_chunks(&info).await?,
            None => Vec::new(),
        };

        let mut results: Vec<EventResult> = rows
            .into_iter()
            .filter(|row| row.cust_id == query.cust_id.get())
            .map(EventResult::from)
            .collect();
        sort_event_results(&mut results, query.sort, query.order);
        results.truncate(query.result_cap);
        Ok(results)
    }

    async fn subsession_detail(&self, subsession_id: SubsessionId) -> Result<SubsessionDetail> {
        let wire: WireSubsession = self
            .get_data(
                "/data/results/get",
                &[
                    ("subsession_id", subsession_id.to_string()),
                    ("include_licenses", "false".to_string()),
                ],
            )
            .await?;
        Ok(SubsessionDetail::from(wire))
    }
}

/// Query string of a series search. `race_week_num` is 0-based upstream,
/// like [`EventQuery::race_week`], so the week passes through unchanged.
fn search_params(query: &EventQuery) -> [(&'static str, String); 7] {
    let season_year = query.season_year.unwrap_or_else(|| Utc::now().year());
    [
        ("season_year", season_year.to_string()),
        ("season_quarter", query.quarter.to_string()),
        ("cust_id", query.cust_id.to_string()),
        ("race_week_num", query.race_week.to_string()),
        ("category_ids", query.category.id().to_string()),
        ("official_only", "true".to_string()),
        ("event_types", EVENT_TYPE_RACE.to_string()),
    ]
}

impl fmt::Debug for IracingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IracingClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

//! Pipeline configuration.
//!
//! One immutable value carries every parameter of a run. It can be read from
//! a TOML file in which every field is optional:
//!
//! ```toml
//! club_id = 45
//! quarter = 2
//! race_week = 2
//! top_n = 10
//! categories = ["road", "oval"]
//! ```

use crate::aggregate::RaceWindow;
use crate::error::ConfigError;
use podium_data::{Category, SeasonId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default club.
pub const DEFAULT_CLUB_ID: u32 = 45;

/// Default number of results kept per category.
pub const DEFAULT_TOP_N: usize = 10;

/// Default cap on standings read per season.
pub const DEFAULT_STANDINGS_CAP: usize = 100;

/// Default cap on results read per driver.
pub const DEFAULT_RESULT_CAP: usize = 100;

/// Default number of lookups in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Highest race week of a season; weeks count from 0.
pub const MAX_RACE_WEEK: i32 = 12;

/// Parameters of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Club whose drivers are reported
    pub club_id: u32,
    /// Season year; `None` means the current one
    pub season_year: Option<i32>,
    /// Season quarter, 1 to 4
    pub quarter: u8,
    /// Race week, 0 to 12. Weeks are 0-based as upstream: 0 is the first
    /// week of the season, so the default 2 is the third.
    pub race_week: i32,
    /// Results kept per category
    pub top_n: usize,
    /// Categories, each producing its own report
    pub categories: Vec<Category>,
    /// Standings read per season; drivers ranked lower are not discovered
    pub standings_cap: usize,
    /// Results read per driver
    pub result_cap: usize,
    /// Lookups in flight at once; 1 runs strictly one after another
    pub concurrency: usize,
    /// Scan only these seasons instead of every active one
    pub season_ids: Option<Vec<SeasonId>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            club_id: DEFAULT_CLUB_ID,
            season_year: None,
            quarter: 2,
            race_week: 2,
            top_n: DEFAULT_TOP_N,
            categories: vec![Category::Road, Category::Oval],
            standings_cap: DEFAULT_STANDINGS_CAP,
            result_cap: DEFAULT_RESULT_CAP,
            concurrency: DEFAULT_CONCURRENCY,
            season_ids: None,
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document; missing fields keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// The week whose results are collected.
    pub const fn window(&self) -> RaceWindow {
        RaceWindow {
            season_year: self.season_year,
            quarter: self.quarter,
            race_week: self.race_week,
        }
    }

    /// Check every field is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=4).contains(&self.quarter) {
            return Err(invalid("quarter", format!("{} is outside 1..=4", self.quarter)));
        }
        if !(0..=MAX_RACE_WEEK).contains(&self.race_week) {
            return Err(invalid(
                "race_week",
                format!("{} is outside 0..={}", self.race_week, MAX_RACE_WEEK),
            ));
        }
        if self.top_n == 0 {
            return Err(invalid("top_n", "must be at least 1".to_string()));
        }
        if self.categories.is_empty() {
            return Err(invalid("categories", "at least one is required".to_string()));
        }
        for (i, category) in self.categories.iter().enumerate() {
            if self.categories[..i].contains(category) {
                return Err(invalid("categories", format!("{} is listed twice", category)));
            }
        }
        if self.standings_cap == 0 {
            return Err(invalid("standings_cap", "must be at least 1".to_string()));
        }
        if self.result_cap == 0 {
            return Err(invalid("result_cap", "must be at least 1".to_string()));
        }
        if self.concurrency == 0 {
            return Err(invalid("concurrency", "must be at least 1".to_string()));
        }
        if matches!(&self.season_ids, Some(ids) if ids.is_empty()) {
            return Err(invalid("season_ids", "must not be empty when set".to_string()));
        }
        Ok(())
    }
}

const fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.categories, vec![Category::Road, Category::Oval]);
        assert_eq!(config.standings_cap, 100);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            club_id = 12
            race_week = 5
            categories = ["oval"]
            season_ids = [649, 228]
            "#,
        )
        .unwrap();

        assert_eq!(config.club_id, 12);
        assert_eq!(config.race_week, 5);
        assert_eq!(config.categories, vec![Category::Oval]);
        assert_eq!(config.season_ids, Some(vec![649, 228]));
        assert_eq!(config.quarter, 2);
        assert_eq!(config.top_n, DEFAULT_TOP_N);
    }

    #[test]
    fn test_unknown_toml_field_rejected() {
        let result = PipelineConfig::from_toml_str("club = 12");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = PipelineConfig::from_file(Path::new("/nonexistent/podium.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    fn with(update: impl FnOnce(&mut PipelineConfig)) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        update(&mut config);
        config
    }

    #[rstest]
    #[case::quarter_zero(with(|c| c.quarter = 0), "quarter")]
    #[case::quarter_five(with(|c| c.quarter = 5), "quarter")]
    #[case::all_weeks(with(|c| c.race_week = -1), "race_week")]
    #[case::week_thirteen(with(|c| c.race_week = 13), "race_week")]
    #[case::top_zero(with(|c| c.top_n = 0), "top_n")]
    #[case::no_categories(with(|c| c.categories.clear()), "categories")]
    #[case::duplicate_category(with(|c| c.categories.push(Category::Road)), "categories")]
    #[case::zero_standings_cap(with(|c| c.standings_cap = 0), "standings_cap")]
    #[case::zero_result_cap(with(|c| c.result_cap = 0), "result_cap")]
    #[case::zero_concurrency(with(|c| c.concurrency = 0), "concurrency")]
    #[case::empty_season_ids(with(|c| c.season_ids = Some(vec![])), "season_ids")]
    fn test_validate_rejects(#[case] config: PipelineConfig, #[case] expected_field: &str) {
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected invalid {}, got {:?}", expected_field, other),
        }
    }

    #[rstest]
    #[case::first_week(0)]
    #[case::last_week(MAX_RACE_WEEK)]
    fn test_race_week_bounds_are_zero_based(#[case] race_week: i32) {
        let config = PipelineConfig {
            race_week,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.window().race_week, race_week);
    }

    #[test]
    fn test_window() {
        let config = PipelineConfig {
            season_year: Some(2024),
            quarter: 3,
            race_week: 7,
            ..Default::default()
        };
        let window = config.window();
        assert_eq!(window.season_year, Some(2024));
        assert_eq!(window.quarter, 3);
        assert_eq!(window.race_week, 7);
    }
}

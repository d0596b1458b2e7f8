//! Run configuration: config file first, then command-line overrides.

use clap::Args;
use podium::config::PipelineConfig;
use podium::data::{Category, SeasonId};
use podium::error::ConfigError;
use std::path::{Path, PathBuf};

/// Config file looked up when `--config` is not given.
pub(crate) fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("podium").join("podium.toml"))
}

/// Read the config file, if any.
///
/// An explicit path must exist; the default location is skipped when absent.
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
    if let Some(path) = explicit {
        return PipelineConfig::from_file(path);
    }
    match default_config_path() {
        Some(path) if path.is_file() => PipelineConfig::from_file(&path),
        _ => Ok(PipelineConfig::default()),
    }
}

/// Pipeline options that override the config file.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct PipelineArgs {
    /// Club id
    #[arg(long)]
    pub(crate) club: Option<u32>,

    /// Season year (defaults to the current year)
    #[arg(long)]
    pub(crate) year: Option<i32>,

    /// Season quarter (1-4)
    #[arg(long)]
    pub(crate) quarter: Option<u8>,

    /// Race week, 0-based (0-12, 0 is the first week)
    #[arg(long)]
    pub(crate) week: Option<i32>,

    /// Results kept per category
    #[arg(long)]
    pub(crate) top: Option<usize>,

    /// Categories, comma separated (road, oval, dirt_road, dirt_oval)
    #[arg(long, value_delimiter = ',')]
    pub(crate) categories: Vec<Category>,

    /// Scan only these season ids, comma separated
    #[arg(long = "season", value_delimiter = ',')]
    pub(crate) seasons: Vec<SeasonId>,

    /// Standings read per season
    #[arg(long)]
    pub(crate) standings_cap: Option<usize>,

    /// Results read per driver
    #[arg(long)]
    pub(crate) result_cap: Option<usize>,

    /// Lookups in flight at once
    #[arg(long)]
    pub(crate) concurrency: Option<usize>,
}

impl PipelineArgs {
    /// Apply every given option on top of `config`.
    pub(crate) fn apply(self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(club) = self.club {
            config.club_id = club;
        }
        if self.year.is_some() {
            config.season_year = self.year;
        }
        if let Some(quarter) = self.quarter {
            config.quarter = quarter;
        }
        if let Some(week) = self.week {
            config.race_week = week;
        }
        if let Some(top) = self.top {
            config.top_n = top;
        }
        if !self.categories.is_empty() {
            config.categories = self.categories;
        }
        if !self.seasons.is_empty() {
            config.season_ids = Some(self.seasons);
        }
        if let Some(cap) = self.standings_cap {
            config.standings_cap = cap;
        }
        if let Some(cap) = self.result_cap {
            config.result_cap = cap;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        config
    }
}

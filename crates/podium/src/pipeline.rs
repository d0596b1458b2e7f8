//! End-to-end report pipeline.

use crate::aggregate::aggregate_results;
use crate::config::PipelineConfig;
use crate::discovery::{Discovery, discover_drivers, seasons_to_scan};
use crate::enrich::enrich_results;
use crate::error::PipelineError;
use crate::rank::top_n;
use podium_data::{Category, DataSource, DriverId, EnrichedResult, SubsessionId};
use podium_output::ReportSummary;
use std::collections::BTreeSet;
use tracing::{info, instrument};

/// Top results of one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    /// Category the results belong to
    pub category: Category,
    /// Enriched results, best first
    pub results: Vec<EnrichedResult>,
    /// Drivers whose results were requested
    pub drivers_total: usize,
    /// Drivers whose lookup failed
    pub failed_drivers: Vec<DriverId>,
    /// Races whose details were unavailable
    pub failed_subsessions: Vec<SubsessionId>,
    /// Quarter of the report
    pub quarter: u8,
    /// Race week of the report
    pub race_week: i32,
}

impl CategoryReport {
    /// Console summary of this report.
    pub fn summary(&self) -> ReportSummary {
        let title = format!(
            "Top {} {} results, Q{} week {}",
            self.results.len(),
            self.category,
            self.quarter,
            self.race_week
        );
        ReportSummary::new(title, &self.results)
            .with_driver_coverage(self.drivers_total, self.failed_drivers.len())
    }
}

/// Outcome of a full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Drivers found and seasons scanned
    pub discovery: Discovery,
    /// One report per configured category, in configured order
    pub categories: Vec<CategoryReport>,
}

/// Discovery followed by aggregate, rank and enrich for each category.
#[derive(Debug)]
pub struct Pipeline<'a, S> {
    source: &'a S,
    config: PipelineConfig,
}

impl<'a, S: DataSource> Pipeline<'a, S> {
    /// Create a pipeline after validating `config`.
    pub fn new(source: &'a S, config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { source, config })
    }

    /// Configuration of this pipeline.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Find the club's drivers.
    ///
    /// Fails only when the active season listing fails.
    pub async fn discover(&self) -> Result<Discovery, PipelineError> {
        let active = self
            .source
            .active_seasons()
            .await
            .map_err(PipelineError::ActiveSeasons)?;
        info!(count = active.len(), "Listed active seasons");

        let seasons = seasons_to_scan(active, self.config.season_ids.as_deref());
        Ok(discover_drivers(
            self.source,
            seasons,
            self.config.club_id,
            self.config.standings_cap,
        )
        .await)
    }

    /// Build the report of one category for the given drivers.
    #[instrument(skip(self, drivers))]
    pub async fn run_category(
        &self,
        drivers: &BTreeSet<DriverId>,
        category: Category,
    ) -> CategoryReport {
        let config = &self.config;

        let aggregate = aggregate_results(
            self.source,
            drivers.iter().copied(),
            category,
            config.window(),
            config.result_cap,
            config.concurrency,
        )
        .await;
        let drivers_total = aggregate.drivers.len();
        let failed_drivers = aggregate.failed_drivers.clone();

        let ranked = top_n(aggregate.into_results(), config.top_n);
        info!(kept = ranked.len(), "Ranked results");

        let enrichment = enrich_results(self.source, ranked, config.concurrency).await;
        info!(
            rows = enrichment.results.len(),
            unenriched = enrichment.unenriched(),
            "Enriched results"
        );

        CategoryReport {
            category,
            results: enrichment.results,
            drivers_total,
            failed_drivers,
            failed_subsessions: enrichment.failed_subsessions,
            quarter: config.quarter,
            race_week: config.race_week,
        }
    }

    /// Run discovery once, then every configured category in turn.
    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        let discovery = self.discover().await?;

        let mut categories = Vec::with_capacity(self.config.categories.len());
        for &category in &self.config.categories {
            categories.push(self.run_category(&discovery.drivers, category).await);
        }

        Ok(PipelineReport {
            discovery,
            categories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use podium_data::MemorySource;

    #[test]
    fn test_new_rejects_invalid_config() {
        let source = MemorySource::new();
        let config = PipelineConfig {
            top_n: 0,
            ..Default::default()
        };

        let result = Pipeline::new(&source, config);

        assert!(matches!(
            result,
            Err(PipelineError::Config(ConfigError::Invalid { field: "top_n", .. }))
        ));
    }

    #[tokio::test]
    async fn test_active_season_failure_is_fatal() {
        let source = MemorySource::new().fail_active_seasons();
        let pipeline = Pipeline::new(&source, PipelineConfig::default()).unwrap();

        let result = pipeline.run().await;

        assert!(matches!(result, Err(PipelineError::ActiveSeasons(_))));
    }

    #[tokio::test]
    async fn test_empty_club_yields_empty_reports() {
        let source = MemorySource::new();
        let pipeline = Pipeline::new(&source, PipelineConfig::default()).unwrap();

        let report = pipeline.run().await.unwrap();

        assert!(report.discovery.drivers.is_empty());
        assert_eq!(report.categories.len(), 2);
        assert_eq!(report.categories[0].category, Category::Road);
        assert!(report.categories.iter().all(|c| c.results.is_empty()));
    }
}

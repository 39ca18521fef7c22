//! Orchestration: fetch once, then build and publish country by country.
//!
//! A failure for one country is logged and recorded; the loop carries on.

use rayon::prelude::*;
use serde::Serialize;

use crate::catalog::{CatalogDataset, CatalogPublisher};
use crate::config::Configuration;
use crate::data::builder::{generate_dataset, BuildContext};
use crate::data::dataset::BuildOutcome;
use crate::data::grouping::{get_data, CountryBoundarySet};
use crate::error::RunError;
use crate::fetch::Fetch;
use crate::parallel::WorkerPool;
use crate::progress::Progress;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryFailure {
    pub iso3: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub published: Vec<String>,
    pub skipped_redundant: Vec<String>,
    pub skipped_invalid_location: Vec<String>,
    pub failed: Vec<CountryFailure>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn fail(&mut self, iso3: &str, message: String) {
        tracing::error!(country = iso3, "{message}");
        self.failed.push(CountryFailure {
            iso3: iso3.to_string(),
            message,
        });
    }
}

pub fn run(
    config: &Configuration,
    ctx: &BuildContext<'_>,
    fetcher: &dyn Fetch,
    publisher: &dyn CatalogPublisher,
    progress: Progress,
) -> Result<RunSummary, RunError> {
    let boundaries = get_data(fetcher, &config.url, &config.excluded_income_groups)?;
    let countries: Vec<String> = boundaries.keys().cloned().collect();
    let remaining = progress.remaining(&countries)?;
    tracing::info!("Number of countries to upload: {}", remaining.len());

    let mut summary = RunSummary::default();
    for iso3 in remaining {
        progress.record(iso3)?;
        let records = boundaries.get(iso3).map(Vec::as_slice).unwrap_or_default();
        let published = match generate_dataset(ctx, iso3, records) {
            Ok(BuildOutcome::Published(published)) => published,
            Ok(BuildOutcome::SkippedRedundant) => {
                summary.skipped_redundant.push(iso3.clone());
                continue;
            }
            Ok(BuildOutcome::SkippedInvalidLocation) => {
                summary.skipped_invalid_location.push(iso3.clone());
                continue;
            }
            Err(err) => {
                summary.fail(iso3, err.to_string());
                continue;
            }
        };

        let payload = CatalogDataset::from_published(&published, &config.dataset, &config.tag_vocabulary);
        match publisher.publish(&payload, &published.resource_names, progress.batch()) {
            Ok(report) => {
                tracing::info!(
                    country = %iso3,
                    package = %report.package_id,
                    created = report.created,
                    reordered = report.reordered,
                    "dataset published"
                );
                summary.published.push(iso3.clone());
            }
            Err(err) => summary.fail(iso3, err.to_string()),
        }
    }

    progress.finish()?;
    tracing::info!(
        published = summary.published.len(),
        skipped_redundant = summary.skipped_redundant.len(),
        skipped_invalid_location = summary.skipped_invalid_location.len(),
        failed = summary.failed.len(),
        "run complete"
    );
    Ok(summary)
}

/// One line of a dry-run plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanRow {
    pub iso3: String,
    pub outcome: String,
    pub title: String,
    pub admin_levels: String,
    pub resources: usize,
    pub years: String,
    pub source: String,
    pub error: String,
}

impl PlanRow {
    fn new(iso3: &str, outcome: &str) -> Self {
        Self {
            iso3: iso3.to_string(),
            outcome: outcome.to_string(),
            title: String::new(),
            admin_levels: String::new(),
            resources: 0,
            years: String::new(),
            source: String::new(),
            error: String::new(),
        }
    }
}

/// Build every country without publishing, in parallel. Rows follow country order.
pub fn plan(ctx: &BuildContext<'_>, boundaries: &CountryBoundarySet, pool: &WorkerPool) -> Vec<PlanRow> {
    pool.install(|| {
        boundaries
            .par_iter()
            .map(|(iso3, records)| match generate_dataset(ctx, iso3, records) {
                Ok(outcome) => {
                    let mut row = PlanRow::new(iso3, outcome.label());
                    if let Some(published) = outcome.published() {
                        let dataset = &published.dataset;
                        row.title = dataset.title.clone();
                        row.admin_levels = published.admin_levels.join(" ");
                        row.resources = published.resource_names.len();
                        row.years = format!("{}-{}", dataset.year_range.first, dataset.year_range.last);
                        row.source = dataset.source.clone();
                    }
                    row
                }
                Err(err) => {
                    let mut row = PlanRow::new(iso3, "failed");
                    row.error = err.to_string();
                    row
                }
            })
            .collect()
    })
}

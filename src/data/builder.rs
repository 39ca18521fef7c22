//! Turns one country's boundary records into a catalog dataset descriptor.
//!
//! Resources are ordered by admin level, then by [ResourceVariant::ORDERED].
//! The function is pure: identical records in any order give identical output.

use std::collections::BTreeSet;

use crate::config::DatasetSettings;
use crate::data::boundary::{BoundaryRecord, ResourceVariant};
use crate::data::dataset::{
    BuildOutcome, DatasetDescriptor, PublishedDataset, ResourceDescriptor, YearRange,
};
use crate::error::BuildError;
use crate::location::{CountryLookup, Locations};
use crate::text::{filename_from_url, slugify};

/// Read-only inputs shared by every country in a run.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub settings: &'a DatasetSettings,
    pub catalog_domain: &'a str,
    pub countries: &'a dyn CountryLookup,
    pub locations: &'a Locations,
}

pub fn dataset_title(country_name: &str) -> String {
    format!("{country_name} - Subnational Administrative Boundaries")
}

pub fn dataset_name(country_name: &str) -> String {
    slugify(&format!("geoBoundaries admin boundaries for {country_name}")).to_lowercase()
}

pub fn generate_dataset(
    ctx: &BuildContext<'_>,
    country_iso3: &str,
    records: &[BoundaryRecord],
) -> Result<BuildOutcome, BuildError> {
    let country_name = ctx
        .countries
        .name_from_iso3(country_iso3)
        .ok_or_else(|| BuildError::UnknownCountry(country_iso3.to_string()))?;
    let title = dataset_title(&country_name);
    tracing::info!("Creating dataset: {title}");

    if !ctx.locations.contains(country_iso3) {
        tracing::error!("{title} has a problem! {country_iso3} is not a valid location");
        return Ok(BuildOutcome::SkippedInvalidLocation);
    }

    let mut sorted: Vec<&BoundaryRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.admin_level.cmp(&b.admin_level));

    let mut all_hosted = true;
    let mut years: BTreeSet<i32> = BTreeSet::new();
    let mut sources: BTreeSet<&str> = BTreeSet::new();
    let mut admin_levels = Vec::with_capacity(sorted.len());
    let mut resources = Vec::with_capacity(sorted.len() * ResourceVariant::ORDERED.len());

    for record in sorted {
        let admin_level = record.admin_level.as_str();
        if !record.is_hosted_on(ctx.catalog_domain) {
            all_hosted = false;
        }

        // A year that is empty or not an integer after stripping ".0" fails the country.
        let year = record.normalized_year();
        let parsed = year.parse::<i32>().map_err(|_| BuildError::InvalidYear {
            country: country_iso3.to_string(),
            admin_level: admin_level.to_string(),
            value: record.year_represented.clone(),
        })?;
        years.insert(parsed);

        if let Some(source) = record.source() {
            sources.insert(source);
        }

        for variant in ResourceVariant::ORDERED {
            let url = record.download_url(variant);
            let name = filename_from_url(url).ok_or_else(|| BuildError::InvalidResourceUrl {
                country: country_iso3.to_string(),
                admin_level: admin_level.to_string(),
                url: url.to_string(),
            })?;
            resources.push(ResourceDescriptor {
                name,
                url: url.to_string(),
                description: format!(
                    "{} {admin_level} boundaries for {country_name}",
                    variant.label()
                ),
                file_type: variant.file_type(),
            });
        }
        admin_levels.push(admin_level.to_string());
    }

    if all_hosted {
        tracing::info!("Ignoring {country_name} as data for all admin levels comes from HDX!");
        return Ok(BuildOutcome::SkippedRedundant);
    }

    // Non-empty: at least one record was seen, otherwise all_hosted held.
    let Some(year_range) = YearRange::covering(years) else {
        return Ok(BuildOutcome::SkippedRedundant);
    };
    let source: String = sources.into_iter().collect();
    tracing::debug!(country = country_iso3, %source, "aggregated dataset source");

    let resource_names = resources.iter().map(|r| r.name.clone()).collect();
    let dataset = DatasetDescriptor {
        name: dataset_name(&country_name),
        title,
        country_iso3: country_iso3.to_uppercase(),
        country_name,
        maintainer: ctx.settings.maintainer,
        organization: ctx.settings.organization,
        update_frequency: ctx.settings.update_frequency,
        subnational: true,
        tags: ctx.settings.tags.clone(),
        year_range,
        source,
        resources,
    };

    Ok(BuildOutcome::Published(PublishedDataset {
        admin_levels,
        dataset,
        resource_names,
    }))
}

impl<'a> BuildContext<'a> {
    pub fn from_config(
        config: &'a crate::config::Configuration,
        countries: &'a dyn CountryLookup,
        locations: &'a Locations,
    ) -> Self {
        Self {
            settings: &config.dataset,
            catalog_domain: &config.catalog_domain,
            countries,
            locations,
        }
    }
}

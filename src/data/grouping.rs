//! Download the boundary listing and bucket it by country.

use std::collections::{BTreeMap, BTreeSet};

use crate::data::boundary::BoundaryRecord;
use crate::error::FetchError;
use crate::fetch::Fetch;

/// Country code -> that country's admin-level records, in listing order.
pub type CountryBoundarySet = BTreeMap<String, Vec<BoundaryRecord>>;

/// Result of splitting a listing into eligible countries and excluded boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouping {
    pub countries: CountryBoundarySet,
    pub excluded_names: BTreeSet<String>,
}

/// Fetch the listing at `url` and group every eligible record by country.
pub fn get_data(
    fetcher: &dyn Fetch,
    url: &str,
    excluded_income_groups: &[String],
) -> Result<CountryBoundarySet, FetchError> {
    let raw = fetcher.get_json(url)?;
    let records: Vec<BoundaryRecord> = serde_json::from_value(raw)?;
    let total = records.len();
    let grouping = group_records(records, excluded_income_groups);
    tracing::info!(
        "Ignoring high income/no income available countries: {}",
        grouping
            .excluded_names
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );
    tracing::info!(
        records = total,
        countries = grouping.countries.len(),
        "grouped boundary listing"
    );
    Ok(grouping.countries)
}

/// Drop records in an excluded income group and bucket the rest by ISO3.
pub fn group_records(records: Vec<BoundaryRecord>, excluded_income_groups: &[String]) -> Grouping {
    let mut grouping = Grouping::default();
    for record in records {
        if excluded_income_groups
            .iter()
            .any(|group| group == &record.income_group)
        {
            grouping.excluded_names.insert(record.boundary_name.clone());
            continue;
        }
        grouping
            .countries
            .entry(record.country_iso3.clone())
            .or_default()
            .push(record);
    }
    grouping
}

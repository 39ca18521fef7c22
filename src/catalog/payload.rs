//! CKAN package payloads as HDX expects them.

use serde::{Deserialize, Serialize};

use crate::config::DatasetSettings;
use crate::data::dataset::{PublishedDataset, ResourceDescriptor};
use crate::data::tags::TagVocabulary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogGroup {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTag {
    pub name: String,
    pub vocabulary_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub format: String,
    #[serde(default = "api_type")]
    pub resource_type: String,
    #[serde(default = "api_type")]
    pub url_type: String,
}

fn api_type() -> String {
    "api".to_string()
}

impl From<&ResourceDescriptor> for CatalogResource {
    fn from(resource: &ResourceDescriptor) -> Self {
        Self {
            id: None,
            name: resource.name.clone(),
            url: resource.url.clone(),
            description: resource.description.clone(),
            format: resource.file_type.as_str().to_string(),
            resource_type: api_type(),
            url_type: api_type(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogDataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub title: String,
    pub groups: Vec<CatalogGroup>,
    pub maintainer: String,
    pub owner_org: String,
    pub data_update_frequency: String,
    pub subnational: String,
    pub tags: Vec<CatalogTag>,
    pub dataset_date: String,
    pub dataset_source: String,
    pub notes: String,
    pub methodology: String,
    pub caveats: String,
    pub license_id: String,
    pub resources: Vec<CatalogResource>,
}

impl CatalogDataset {
    pub fn from_published(
        published: &PublishedDataset,
        settings: &DatasetSettings,
        vocabulary: &TagVocabulary,
    ) -> Self {
        let dataset = &published.dataset;
        let tags = vocabulary
            .clean(&dataset.tags)
            .into_iter()
            .map(|name| CatalogTag {
                name,
                vocabulary_id: vocabulary.id.clone(),
            })
            .collect();
        Self {
            id: None,
            name: dataset.name.clone(),
            title: dataset.title.clone(),
            groups: vec![CatalogGroup {
                name: dataset.country_iso3.to_lowercase(),
            }],
            maintainer: dataset.maintainer.to_string(),
            owner_org: dataset.organization.to_string(),
            data_update_frequency: dataset.update_frequency.catalog_code().to_string(),
            subnational: if dataset.subnational { "1" } else { "0" }.to_string(),
            tags,
            dataset_date: dataset.year_range.to_reference_period(),
            dataset_source: dataset.source.clone(),
            notes: admin_level_notes(&published.admin_levels, &settings.notes),
            methodology: settings.methodology.clone(),
            caveats: settings.caveats.clone(),
            license_id: settings.license_id.clone(),
            resources: dataset.resources.iter().map(CatalogResource::from).collect(),
        }
    }
}

pub fn admin_level_notes(admin_levels: &[String], notes: &str) -> String {
    format!(
        "This dataset contains the following administrative boundaries: {}.  \n  \n{notes}",
        admin_levels.join(", ")
    )
}

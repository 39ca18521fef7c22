//! Project configuration: YAML file with built-in defaults for every field.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data::dataset::UpdateFrequency;
use crate::data::tags::TagVocabulary;
use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "config/project_configuration.yml";
pub const DEFAULT_LISTING_URL: &str = "https://www.geoboundaries.org/api/current/gbOpen/ALL/ALL/";
pub const DEFAULT_CATALOG_DOMAIN: &str = "data.humdata.org";
pub const DEFAULT_USER_AGENT: &str = "hdx-scraper-geoboundaries";
pub const DEFAULT_MAINTAINER: Uuid = Uuid::from_u128(0x0ec5ff66_dc01_4087_bb82_1d01f3b1c1ce);
pub const DEFAULT_ORGANIZATION: Uuid = Uuid::from_u128(0x8be95204_f453_4b66_a4f6_dbe84cb0bdee);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// geoBoundaries bulk listing.
    pub url: String,
    /// Marker in a source URL meaning the boundary already lives on the catalog.
    pub catalog_domain: String,
    pub excluded_income_groups: Vec<String>,
    pub user_agent: String,
    pub dataset: DatasetSettings,
    pub tag_vocabulary: TagVocabulary,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            url: DEFAULT_LISTING_URL.to_string(),
            catalog_domain: DEFAULT_CATALOG_DOMAIN.to_string(),
            excluded_income_groups: vec![
                "High-income Countries".to_string(),
                "No income group available".to_string(),
            ],
            user_agent: DEFAULT_USER_AGENT.to_string(),
            dataset: DatasetSettings::default(),
            tag_vocabulary: TagVocabulary::default(),
        }
    }
}

/// Fixed dataset metadata applied to every country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSettings {
    pub maintainer: Uuid,
    pub organization: Uuid,
    pub update_frequency: UpdateFrequency,
    pub tags: Vec<String>,
    pub notes: String,
    pub methodology: String,
    pub caveats: String,
    pub license_id: String,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            maintainer: DEFAULT_MAINTAINER,
            organization: DEFAULT_ORGANIZATION,
            update_frequency: UpdateFrequency::Live,
            tags: vec![
                "administrative boundaries-divisions".to_string(),
                "geodata".to_string(),
                "gazetteer".to_string(),
            ],
            notes: "Produced and maintained since 2017, the geoBoundaries Global Database of \
                    Political Administrative Boundaries Database is an online, open license \
                    (CC BY 4.0) resource of information on administrative boundaries (i.e., \
                    state, county) for every country in the world."
                .to_string(),
            methodology: "Other".to_string(),
            caveats: "Boundaries are provided as-is from geoBoundaries; see the source \
                      attribution of each admin level for licensing."
                .to_string(),
            license_id: "cc-by".to_string(),
        }
    }
}

impl Configuration {
    /// Load YAML from `path`; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// HDX deployment to publish to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSite {
    Prod,
    Stage,
    Feature,
    Demo,
    Dev,
}

impl CatalogSite {
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Prod => "https://data.humdata.org",
            Self::Stage => "https://stage.data-humdata-org.ahconu.org",
            Self::Feature => "https://feature.data-humdata-org.ahconu.org",
            Self::Demo => "https://demo.data-humdata-org.ahconu.org",
            Self::Dev => "https://dev.data-humdata-org.ahconu.org",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prod => "prod",
            Self::Stage => "stage",
            Self::Feature => "feature",
            Self::Demo => "demo",
            Self::Dev => "dev",
        }
    }
}

impl FromStr for CatalogSite {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" => Ok(Self::Prod),
            "stage" => Ok(Self::Stage),
            "feature" => Ok(Self::Feature),
            "demo" => Ok(Self::Demo),
            "dev" => Ok(Self::Dev),
            _ => Err(ConfigError::UnknownSite(value.to_string())),
        }
    }
}

impl fmt::Display for CatalogSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_hold_project_constants() {
        let config = Configuration::default();
        assert_eq!(
            config.dataset.maintainer.to_string(),
            "0ec5ff66-dc01-4087-bb82-1d01f3b1c1ce"
        );
        assert_eq!(
            config.dataset.organization.to_string(),
            "8be95204-f453-4b66-a4f6-dbe84cb0bdee"
        );
        assert_eq!(config.catalog_domain, "data.humdata.org");
        assert_eq!(config.dataset.update_frequency, UpdateFrequency::Live);
    }

    #[test]
    fn yaml_overrides_only_given_fields() {
        let yaml = "catalog_domain: example.org\ndataset:\n  update_frequency: Every year\n  tags: [geodata]\n";
        let config: Configuration = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.catalog_domain, "example.org");
        assert_eq!(config.dataset.update_frequency, UpdateFrequency::EveryYear);
        assert_eq!(config.dataset.tags, vec!["geodata"]);
        assert_eq!(config.dataset.maintainer, DEFAULT_MAINTAINER);
        assert_eq!(config.url, DEFAULT_LISTING_URL);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = Configuration::load("no/such/config.yml").unwrap();
        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn shipped_config_keeps_required_tags() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/project_configuration.yml");
        let config = Configuration::load(path).unwrap();
        assert_eq!(config.tag_vocabulary, TagVocabulary::default());
        assert_eq!(
            config.tag_vocabulary.clean(&config.dataset.tags),
            vec!["administrative boundaries-divisions", "geodata", "gazetteer"]
        );
    }

    #[test]
    fn rejects_bad_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "dataset:\n  update_frequency: sometimes\n").unwrap();
        assert!(matches!(Configuration::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn parses_sites() {
        assert_eq!("PROD".parse::<CatalogSite>().unwrap(), CatalogSite::Prod);
        assert_eq!("stage".parse::<CatalogSite>().unwrap().base_url(), CatalogSite::Stage.base_url());
        assert!("mars".parse::<CatalogSite>().is_err());
    }
}

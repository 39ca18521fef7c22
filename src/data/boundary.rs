//! Raw geoBoundaries listing records: one per country and admin level.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// One entry of the geoBoundaries `gbOpen/ALL/ALL` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryRecord {
    #[serde(rename = "boundaryISO")]
    pub country_iso3: String,
    #[serde(rename = "boundaryName", default)]
    pub boundary_name: String,
    #[serde(rename = "worldBankIncomeGroup", default)]
    pub income_group: String,
    #[serde(rename = "boundaryType")]
    pub admin_level: String,
    #[serde(
        rename = "boundaryYearRepresented",
        default,
        deserialize_with = "year_as_string"
    )]
    pub year_represented: String,
    #[serde(rename = "boundarySource", default)]
    pub source_name: Option<String>,
    #[serde(rename = "boundarySourceURL", default)]
    pub source_url: String,
    #[serde(rename = "simplifiedGeometryGeoJSON")]
    pub simplified_geojson_url: String,
    #[serde(rename = "gjDownloadURL")]
    pub geojson_url: String,
    #[serde(rename = "tjDownloadURL")]
    pub topojson_url: String,
    #[serde(rename = "staticDownloadLink")]
    pub archive_url: String,
}

impl BoundaryRecord {
    /// Year with the float formatting the API sometimes emits ("2014.0") removed.
    pub fn normalized_year(&self) -> &str {
        normalize_year(&self.year_represented)
    }

    /// Attribution exactly as listed; missing or empty values are absent.
    pub fn source(&self) -> Option<&str> {
        self.source_name.as_deref().filter(|source| !source.is_empty())
    }

    /// True when the boundary already originates from the target catalog.
    pub fn is_hosted_on(&self, catalog_domain: &str) -> bool {
        self.source_url.contains(catalog_domain)
    }

    pub fn download_url(&self, variant: ResourceVariant) -> &str {
        match variant {
            ResourceVariant::SimplifiedGeoJson => &self.simplified_geojson_url,
            ResourceVariant::GeoJson => &self.geojson_url,
            ResourceVariant::TopoJson => &self.topojson_url,
            ResourceVariant::Archive => &self.archive_url,
        }
    }
}

pub fn normalize_year(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_suffix(".0").unwrap_or(trimmed)
}

/// The four downloads published per admin level, in publication order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceVariant {
    SimplifiedGeoJson,
    GeoJson,
    TopoJson,
    Archive,
}

impl ResourceVariant {
    pub const ORDERED: [ResourceVariant; 4] = [
        ResourceVariant::SimplifiedGeoJson,
        ResourceVariant::GeoJson,
        ResourceVariant::TopoJson,
        ResourceVariant::Archive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::SimplifiedGeoJson => "Simplified GeoJSON",
            Self::GeoJson => "GeoJSON",
            Self::TopoJson => "TopoJSON",
            Self::Archive => "Other formats including shape file",
        }
    }

    pub fn file_type(&self) -> FileType {
        match self {
            Self::Archive => FileType::Shapefile,
            _ => FileType::GeoJson,
        }
    }
}

/// Declared resource format on the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    #[serde(rename = "geojson")]
    GeoJson,
    #[serde(rename = "shp")]
    Shapefile,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeoJson => "geojson",
            Self::Shapefile => "shp",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// The listing has shipped the year both as "2014.0" and as a bare number.
fn year_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct YearVisitor;

    impl<'de> Visitor<'de> for YearVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a year as a string or number")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<String, E> {
            Ok(format!("{value:.1}"))
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(YearVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_json(year: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "boundaryISO": "AFG",
            "boundaryName": "Afghanistan",
            "worldBankIncomeGroup": "Low-income Countries",
            "boundaryType": "ADM1",
            "boundaryYearRepresented": year,
            "boundarySource": null,
            "boundarySourceURL": "https://esoc.princeton.edu",
            "simplifiedGeometryGeoJSON": "https://example.org/a_simplified.geojson",
            "gjDownloadURL": "https://example.org/a.geojson",
            "tjDownloadURL": "https://example.org/a.topojson",
            "staticDownloadLink": "https://example.org/a-all.zip"
        })
    }

    #[test]
    fn strips_trailing_float_suffix() {
        assert_eq!(normalize_year("2014.0"), "2014");
        assert_eq!(normalize_year("2014"), "2014");
        assert_eq!(normalize_year(" 2020.0 "), "2020");
    }

    #[test]
    fn accepts_string_and_numeric_years() {
        let from_string: BoundaryRecord =
            serde_json::from_value(record_json(serde_json::json!("2014.0"))).unwrap();
        assert_eq!(from_string.normalized_year(), "2014");

        let from_float: BoundaryRecord =
            serde_json::from_value(record_json(serde_json::json!(2017.0))).unwrap();
        assert_eq!(from_float.normalized_year(), "2017");

        let from_int: BoundaryRecord =
            serde_json::from_value(record_json(serde_json::json!(2019))).unwrap();
        assert_eq!(from_int.normalized_year(), "2019");
    }

    #[test]
    fn null_source_is_absent() {
        let record: BoundaryRecord =
            serde_json::from_value(record_json(serde_json::json!("2014"))).unwrap();
        assert_eq!(record.source(), None);
    }

    #[test]
    fn source_is_kept_verbatim() {
        let mut json = record_json(serde_json::json!("2014"));
        json["boundarySource"] = " ArcGIS Hub ".into();
        let record: BoundaryRecord = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(record.source(), Some(" ArcGIS Hub "));

        json["boundarySource"] = "".into();
        let record: BoundaryRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.source(), None);
    }

    #[test]
    fn variants_follow_publication_order() {
        let file_types: Vec<_> = ResourceVariant::ORDERED
            .iter()
            .map(|variant| variant.file_type().as_str())
            .collect();
        assert_eq!(file_types, vec!["geojson", "geojson", "geojson", "shp"]);
    }
}

//! Blocking client for the CKAN action API behind HDX.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::catalog::payload::{CatalogDataset, CatalogResource};
use crate::catalog::{CatalogPublisher, PublishReport};
use crate::error::CatalogError;

const REQUEST_TIMEOUT_SECS: u64 = 60;
pub const SCRIPT_NAME: &str = "GeoBoundaries";

#[derive(Debug, Deserialize)]
struct ActionEnvelope<T> {
    #[serde(default)]
    success: bool,
    result: Option<T>,
    #[serde(default)]
    error: Option<ActionError>,
}

#[derive(Debug, Deserialize)]
struct ActionError {
    #[serde(default)]
    message: Option<String>,
    #[serde(rename = "__type", default)]
    kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Package {
    pub id: String,
    #[serde(default)]
    pub resources: Vec<CatalogResource>,
}

#[derive(Serialize)]
struct ShowRequest<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct ReorderRequest<'a> {
    id: &'a str,
    order: Vec<&'a str>,
}

#[derive(Serialize)]
struct WriteRequest<'a> {
    #[serde(flatten)]
    dataset: &'a CatalogDataset,
    batch: &'a str,
    updated_by_script: String,
}

pub struct CkanClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CkanClient {
    pub fn new(base_url: &str, api_key: &str, user_agent: &str) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|source| CatalogError::Http {
                action: "client_build",
                source,
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn call<B, T>(&self, action: &'static str, body: &B) -> Result<T, CatalogError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/api/3/action/{action}", self.base_url);
        tracing::debug!(%url, "catalog request");
        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(body)
            .send()
            .map_err(|source| CatalogError::Http { action, source })?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|source| CatalogError::Http { action, source })?;
        let envelope: ActionEnvelope<T> =
            serde_json::from_str(&text).map_err(|err| CatalogError::Rejected {
                action,
                status: status.as_u16(),
                message: format!("unreadable response: {err}"),
            })?;
        match envelope.result {
            Some(result) if envelope.success && status.is_success() => Ok(result),
            _ => {
                let message = envelope
                    .error
                    .map(|err| {
                        let kind = err.kind.unwrap_or_default();
                        let message = err.message.unwrap_or_default();
                        format!("{kind} {message}").trim().to_string()
                    })
                    .unwrap_or_else(|| text.chars().take(200).collect());
                Err(CatalogError::Rejected {
                    action,
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    /// Look up a package by name; `None` when the catalog has never seen it.
    pub fn show(&self, name: &str) -> Result<Option<Package>, CatalogError> {
        match self.call("package_show", &ShowRequest { id: name }) {
            Ok(package) => Ok(Some(package)),
            Err(CatalogError::Rejected { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn reorder(&self, package: &Package, resource_names: &[String]) -> Result<bool, CatalogError> {
        let existing: Vec<&str> = package.resources.iter().map(|r| r.name.as_str()).collect();
        if existing == resource_names {
            return Ok(false);
        }
        let order = reorder_ids(&package.resources, resource_names)?;
        let _: serde_json::Value = self.call(
            "package_resource_reorder",
            &ReorderRequest {
                id: &package.id,
                order,
            },
        )?;
        Ok(true)
    }
}

impl CatalogPublisher for CkanClient {
    fn publish(
        &self,
        dataset: &CatalogDataset,
        resource_names: &[String],
        batch: &str,
    ) -> Result<PublishReport, CatalogError> {
        let existing = self.show(&dataset.name)?;
        let created = existing.is_none();
        let updated_by_script = format!(
            "{SCRIPT_NAME} ({})",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S")
        );

        let package: Package = match existing {
            None => {
                tracing::info!(name = %dataset.name, "creating dataset");
                self.call(
                    "package_create",
                    &WriteRequest {
                        dataset,
                        batch,
                        updated_by_script,
                    },
                )?
            }
            Some(previous) => {
                tracing::info!(name = %dataset.name, id = %previous.id, "updating dataset");
                let merged = merge_existing(dataset, &previous);
                self.call(
                    "package_update",
                    &WriteRequest {
                        dataset: &merged,
                        batch,
                        updated_by_script,
                    },
                )?
            }
        };

        let reordered = self.reorder(&package, resource_names)?;
        Ok(PublishReport {
            package_id: package.id,
            created,
            reordered,
        })
    }
}

/// Carry over the package id and the ids of resources that keep their name.
/// Resources absent from `dataset` are dropped by the update.
pub fn merge_existing(dataset: &CatalogDataset, previous: &Package) -> CatalogDataset {
    let mut merged = dataset.clone();
    merged.id = Some(previous.id.clone());
    for resource in &mut merged.resources {
        resource.id = previous
            .resources
            .iter()
            .find(|old| old.name == resource.name)
            .and_then(|old| old.id.clone());
    }
    merged
}

/// Resource ids ordered by their name's position in `resource_names`.
pub fn reorder_ids<'a>(
    resources: &'a [CatalogResource],
    resource_names: &[String],
) -> Result<Vec<&'a str>, CatalogError> {
    let mut ranked = Vec::with_capacity(resources.len());
    for resource in resources {
        let rank = resource_names
            .iter()
            .position(|name| name == &resource.name)
            .ok_or_else(|| CatalogError::UnexpectedResource(resource.name.clone()))?;
        let id = resource
            .id
            .as_deref()
            .ok_or_else(|| CatalogError::UnexpectedResource(resource.name.clone()))?;
        ranked.push((rank, id));
    }
    ranked.sort_by_key(|(rank, _)| *rank);
    Ok(ranked.into_iter().map(|(_, id)| id).collect())
}

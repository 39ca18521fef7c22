//! Publishing datasets to the catalog.

pub mod ckan;
pub mod payload;

pub use ckan::CkanClient;
pub use payload::CatalogDataset;

use crate::error::CatalogError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub package_id: String,
    pub created: bool,
    pub reordered: bool,
}

/// Create-or-update of one dataset, leaving its resources in `resource_names` order.
pub trait CatalogPublisher {
    fn publish(
        &self,
        dataset: &CatalogDataset,
        resource_names: &[String],
        batch: &str,
    ) -> Result<PublishReport, CatalogError>;
}

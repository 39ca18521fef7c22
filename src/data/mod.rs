pub mod boundary;
pub mod builder;
pub mod dataset;
pub mod grouping;
pub mod tags;

pub use boundary::{BoundaryRecord, FileType, ResourceVariant};
pub use builder::{generate_dataset, BuildContext};
pub use dataset::{BuildOutcome, DatasetDescriptor, PublishedDataset, ResourceDescriptor, YearRange};
pub use grouping::{get_data, group_records, CountryBoundarySet};

pub mod catalog_service;
pub mod seed;

pub use catalog_service::{BulkCreateResult, BulkItemOutcome, CatalogService};
pub use seed::seed_if_empty;

use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::AppError;
use crate::services::CatalogService;

/// Loads class specifications from `path` when the catalog is still empty.
///
/// Returns the number of classes created. A missing file is not an error;
/// items that fail validation are skipped.
pub async fn seed_if_empty(catalog: &CatalogService, path: &Path) -> Result<usize, AppError> {
    let existing = catalog.store().count_classes().await?;
    if existing > 0 {
        info!("catalog already holds {} classes, skipping seed", existing);
        return Ok(0);
    }

    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("seed file {} not found, starting with an empty catalog", path.display());
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };

    let specs: Vec<Value> = serde_json::from_str(&contents)?;
    let total = specs.len();
    let result = catalog.bulk_create(specs).await;
    info!("seeded {} of {} classes from {}", result.count, total, path.display());

    Ok(result.count)
}

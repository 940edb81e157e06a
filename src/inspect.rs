//! Collection inspection.

use serde::Serialize;

use crate::error::Result;
use crate::models::StoredRecord;
use crate::store::Collection;

/// Name, size, and full contents of a collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    pub name: String,
    pub count: usize,
    pub items: Vec<StoredRecord>,
}

pub async fn see_collection(collection: &dyn Collection) -> Result<CollectionSummary> {
    let count = collection.count().await?;
    let items = collection.get().await?;
    tracing::info!(collection = collection.name(), count, "collection inspected");
    Ok(CollectionSummary {
        name: collection.name().to_string(),
        count,
        items,
    })
}

//! Loading listings into a collection.
//!
//! Each listing becomes one record: the two description fields joined by a
//! newline form the searchable document, and the seven structured fields
//! become metadata.

use crate::error::Result;
use crate::models::{Listing, StoredRecord};
use crate::store::Collection;

/// Split a listing into the record a collection stores.
pub fn listing_record(listing: &Listing) -> StoredRecord {
    StoredRecord {
        id: listing.listing_id.to_string(),
        document: listing.document(),
        metadata: listing.metadata().to_map(),
    }
}

/// Insert one listing. Returns `true` once the collection accepted it.
pub async fn load_listing_into_db(listing: &Listing, collection: &dyn Collection) -> Result<bool> {
    collection.add(&[listing_record(listing)]).await?;
    tracing::debug!(
        listing_id = listing.listing_id,
        collection = collection.name(),
        "listing loaded"
    );
    Ok(true)
}

/// Insert listings one at a time, stopping at the first failure.
pub async fn load_listings(listings: &[Listing], collection: &dyn Collection) -> Result<usize> {
    let mut loaded = 0;
    for listing in listings {
        load_listing_into_db(listing, collection).await?;
        loaded += 1;
    }
    tracing::info!(loaded, collection = collection.name(), "listings loaded");
    Ok(loaded)
}

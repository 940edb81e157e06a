//! Retrieval of listings by free-text similarity.

use crate::error::{HomeMatchError, Result};
use crate::models::ListingMatch;
use crate::store::{Collection, QueryResponse};

pub const DEFAULT_N_RESULTS: usize = 2;

/// Return up to `n_results` listings most similar to `user_query`, most
/// similar first.
///
/// The collection's parallel result arrays must agree in length; a
/// mismatch is reported rather than silently truncated.
pub async fn get_listings_from_query(
    user_query: &str,
    collection: &dyn Collection,
    n_results: usize,
) -> Result<Vec<ListingMatch>> {
    if n_results == 0 {
        return Err(HomeMatchError::InvalidArgument(
            "n_results must be >= 1".to_string(),
        ));
    }

    let response = collection
        .query(&[user_query.to_string()], n_results)
        .await?;
    let matches = assemble_matches(response)?;

    tracing::debug!(
        query = user_query,
        n_results,
        hits = matches.len(),
        "collection queried"
    );
    Ok(matches)
}

/// Zip the first result set of a query response into listing matches.
pub fn assemble_matches(response: QueryResponse) -> Result<Vec<ListingMatch>> {
    let QueryResponse {
        ids,
        documents,
        metadatas,
    } = response;

    let (Some(ids), Some(documents), Some(metadatas)) = (
        ids.into_iter().next(),
        documents.into_iter().next(),
        metadatas.into_iter().next(),
    ) else {
        return Err(HomeMatchError::MalformedQueryResult(
            "missing result set for query".to_string(),
        ));
    };

    if ids.len() != documents.len() || ids.len() != metadatas.len() {
        return Err(HomeMatchError::MalformedQueryResult(format!(
            "{} ids, {} documents, {} metadatas",
            ids.len(),
            documents.len(),
            metadatas.len()
        )));
    }

    Ok(ids
        .into_iter()
        .zip(documents)
        .zip(metadatas)
        .map(|((listing_id, description), metadata)| ListingMatch {
            listing_id,
            description,
            metadata,
        })
        .collect())
}

//! Catalog discovery: partition keys → collection descriptors

use crate::pipeline::WorkerPool;
use crate::remote::{CatalogClient, CollectionListing};
use std::collections::HashSet;

/// A collection found during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDescriptor {
    /// Unique slug, also the collection's directory name
    pub slug: String,

    pub title: String,

    /// Discovery bucket this collection came from
    pub partition_key: String,
}

impl CollectionDescriptor {
    fn from_listing(listing: CollectionListing, partition_key: &str) -> Self {
        let title = listing.title.unwrap_or_else(|| listing.slug.clone());
        Self {
            slug: listing.slug,
            title,
            partition_key: partition_key.to_string(),
        }
    }
}

/// Looks up every partition and merges the results
///
/// Partitions are disjoint on the server, so results are concatenated without
/// deduplication. A failed lookup is logged and contributes nothing; the order
/// of the returned descriptors follows lookup completion.
pub async fn discover(
    client: &CatalogClient,
    partition_keys: &[String],
    pool: &WorkerPool,
) -> Vec<CollectionDescriptor> {
    let mut seen = HashSet::new();
    let keys: Vec<String> = partition_keys
        .iter()
        .filter(|key| seen.insert(key.as_str()))
        .cloned()
        .collect();

    let lookups = pool
        .run(keys, |key| {
            let client = client.clone();
            async move {
                match client.list_collections(&key).await {
                    Ok(listings) => {
                        tracing::info!("  [{}] {} collections", key, listings.len());
                        listings
                            .into_iter()
                            .map(|listing| CollectionDescriptor::from_listing(listing, &key))
                            .collect::<Vec<_>>()
                    }
                    Err(e) => {
                        tracing::warn!("  [{}] partition lookup failed: {}", key, e);
                        Vec::new()
                    }
                }
            }
        })
        .await;

    lookups.into_iter().flatten().collect()
}

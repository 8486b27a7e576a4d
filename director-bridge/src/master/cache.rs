//! Lazily fetched cache of the master's live activity group listing

use std::future::Future;

use tokio::sync::Mutex;

use super::error::LookupError;
use super::listing::GroupListing;

/// Group listing cache.
///
/// Holds either nothing or the complete listing from the last successful
/// fetch. The lock is held across fetch-and-search so concurrent lookups
/// never issue duplicate fetches or see a half-populated listing.
#[derive(Debug, Default)]
pub struct GroupCache {
    listing: Mutex<Option<GroupListing>>,
}

impl GroupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `name` to an id, calling `fetch` first if nothing is cached.
    ///
    /// A failed fetch leaves the cache empty so the next lookup tries again.
    pub async fn resolve<F, Fut>(&self, name: &str, fetch: F) -> Result<i64, LookupError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<GroupListing, LookupError>>,
    {
        let mut slot = self.listing.lock().await;

        let listing = match slot.take() {
            Some(listing) => listing,
            None => {
                let listing = fetch().await?;
                tracing::info!(groups = listing.len(), "Cached live activity group listing");
                listing
            }
        };

        let found = listing.find_id(name);
        *slot = Some(listing);
        found.ok_or(LookupError::NotFound)
    }

    /// Drop the cached listing; the next lookup fetches again
    pub async fn invalidate(&self) {
        if self.listing.lock().await.take().is_some() {
            tracing::info!("Live activity group cache cleared");
        }
    }

    /// Copy of the cached listing, if one is held
    pub async fn snapshot(&self) -> Option<GroupListing> {
        self.listing.lock().await.clone()
    }
}

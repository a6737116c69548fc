//! Single-page fetcher
//!
//! `PagedFetcher` binds a list source to one query key. Each call to
//! `fetch` performs exactly one remote call with no retry; failures are
//! returned as tagged `LoadError`s and never swallowed.

use crate::entity::Entity;
use crate::errors::LoadError;
use crate::query::QueryKey;
use crate::source::{ListResponse, ListSource};
use std::sync::Arc;

/// Wraps one remote "list entities" call for a fixed filter set
pub struct PagedFetcher<E: Entity> {
    source: Arc<dyn ListSource<E>>,
    query: QueryKey,
}

impl<E: Entity> Clone for PagedFetcher<E> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            query: self.query.clone(),
        }
    }
}

impl<E: Entity> std::fmt::Debug for PagedFetcher<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedFetcher")
            .field("query", &self.query)
            .finish()
    }
}

impl<E: Entity> PagedFetcher<E> {
    pub fn new(source: Arc<dyn ListSource<E>>, query: QueryKey) -> Self {
        Self { source, query }
    }

    pub fn query(&self) -> &QueryKey {
        &self.query
    }

    /// Fetch one page
    ///
    /// `page_number` is 1-based; zero is rejected locally without a remote
    /// call. Filter validation is left to the remote API.
    pub async fn fetch(&self, page_number: u32) -> Result<ListResponse<E>, LoadError> {
        if page_number == 0 {
            return Err(LoadError::invariant("page number must be a positive integer"));
        }

        #[cfg(feature = "debug-logging")]
        tracing::debug!(query = %self.query, page = page_number, "fetching page");

        let response = self.source.list_entities(page_number, &self.query).await?;

        #[cfg(feature = "debug-logging")]
        tracing::debug!(
            query = %self.query,
            page = page_number,
            items = response.data.len(),
            total = ?response.total,
            "page fetched"
        );

        Ok(response)
    }
}

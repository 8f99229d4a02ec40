//! Bounded page-number pagination with client-side filtering.
//!
//! Every listing helper in this crate is a [`Paginator`] bound to one remote
//! endpoint. The collector requests pages of a fixed size, keeps the items
//! that satisfy an optional predicate and stops as soon as the provider
//! signals the end of data (an empty or short page) or enough items have been
//! kept. Any fetch failure aborts the whole collection.

use std::future::Future;

use anyhow::Result;
use tracing::debug;

/// Largest page size the provider accepts.
pub const MAX_PAGE_SIZE: u8 = 100;

/// One page of a listing, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u8,
}

impl PageRequest {
    pub const fn new(page: u32, per_page: u8) -> Self {
        Self { page, per_page }
    }

    /// The first page at the largest page size.
    pub const fn first() -> Self {
        Self::new(1, MAX_PAGE_SIZE)
    }
}

/// Collects up to `limit` items from a page-oriented listing.
///
/// The page size is `min(limit, MAX_PAGE_SIZE)` unless overridden with
/// [`Paginator::with_page_size`], and stays the same for every round, even
/// when fewer items are still needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    limit: usize,
    max_rounds: Option<u32>,
    page_size: Option<u8>,
}

impl Paginator {
    pub const fn new(limit: usize) -> Self {
        Self {
            limit,
            max_rounds: None,
            page_size: None,
        }
    }

    /// A collector that issues at most one request.
    pub const fn single_page(limit: usize) -> Self {
        Self {
            limit,
            max_rounds: Some(1),
            page_size: None,
        }
    }

    /// Requests pages of `per_page` items regardless of the limit, so a
    /// small limit over a sparse filter does not cost one request per item.
    pub fn with_page_size(mut self, per_page: u8) -> Self {
        self.page_size = Some(per_page.clamp(1, MAX_PAGE_SIZE));
        self
    }

    pub const fn limit(&self) -> usize {
        self.limit
    }

    pub fn per_page(&self) -> u8 {
        if let Some(per_page) = self.page_size {
            return per_page;
        }
        u8::try_from(self.limit).map_or(MAX_PAGE_SIZE, |limit| limit.min(MAX_PAGE_SIZE))
    }

    /// Collects items in retrieval order, truncated to the limit.
    pub async fn collect<T, F, Fut>(&self, fetch: F) -> Result<Vec<T>>
    where
        F: FnMut(PageRequest) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        self.collect_filtered(fetch, |_: &T| true).await
    }

    /// Collects the items for which `keep` returns true.
    ///
    /// The end-of-data check uses the unfiltered page length: a full page
    /// whose items are all discarded still advances to the next page.
    pub async fn collect_filtered<T, F, Fut, P>(&self, mut fetch: F, mut keep: P) -> Result<Vec<T>>
    where
        F: FnMut(PageRequest) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
        P: FnMut(&T) -> bool,
    {
        if self.limit == 0 {
            return Ok(Vec::new());
        }

        let per_page = self.per_page();
        let mut collected = Vec::new();
        let mut page = 1;

        loop {
            let items = fetch(PageRequest::new(page, per_page)).await?;
            let fetched = items.len();
            if fetched == 0 {
                debug!(page, per_page, "Empty page, stopping");
                break;
            }

            let before = collected.len();
            collected.extend(items.into_iter().filter(|item| keep(item)));
            debug!(
                page,
                per_page,
                fetched,
                kept = collected.len() - before,
                "Fetched page"
            );

            if fetched < usize::from(per_page) {
                break;
            }
            if collected.len() >= self.limit {
                break;
            }
            if self.max_rounds.is_some_and(|rounds| page >= rounds) {
                break;
            }
            page += 1;
        }

        collected.truncate(self.limit);
        Ok(collected)
    }
}

//! Branch filtering and the pagination aggregator.
//!
//! The presentation layer filters over the *complete* branch list, so branches
//! are always fully materialised before use. GitHub pages branch listings; a
//! page shorter than the requested size marks the end of the collection.

use tracing::{debug, instrument, warn};

use crate::{ApiError, WorkflowApi};

/// GitHub's maximum `per_page` for the branches endpoint.
pub const MAX_PER_PAGE: u32 = 100;

/// Default upper bound on the number of pages requested in one aggregation.
///
/// With the default page size this caps a listing at 10 000 branches, which
/// keeps a server that keeps returning full pages from looping forever.
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Page size and page cap used by [`collect_all_branches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchPagination {
    per_page: u32,
    max_pages: u32,
}

impl BranchPagination {
    /// Creates a pagination policy.
    ///
    /// `per_page` is clamped to `1..=100` and `max_pages` to at least 1.
    pub fn new(per_page: u32, max_pages: u32) -> Self {
        Self {
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            max_pages: max_pages.max(1),
        }
    }

    pub fn per_page(self) -> u32 {
        self.per_page
    }

    pub fn max_pages(self) -> u32 {
        self.max_pages
    }
}

impl Default for BranchPagination {
    fn default() -> Self {
        Self::new(MAX_PER_PAGE, DEFAULT_MAX_PAGES)
    }
}

/// Fetches every branch name, page by page, and concatenates them in page order.
///
/// Stops at the first page holding fewer than `per_page` names. When the page
/// cap is reached the names gathered so far are returned and a warning is
/// logged. Any page failure fails the whole aggregation.
#[instrument(skip(api), fields(per_page = pagination.per_page(), max_pages = pagination.max_pages()))]
pub async fn collect_all_branches<A>(
    api: &A,
    pagination: BranchPagination,
) -> Result<Vec<String>, ApiError>
where
    A: WorkflowApi + ?Sized,
{
    let mut branches = Vec::new();

    for page in 1..=pagination.max_pages() {
        let batch = api.list_branches(page, pagination.per_page()).await?;
        let count = batch.len();
        branches.extend(batch);
        debug!(page, count, total = branches.len(), "Fetched branch page");

        if count < pagination.per_page() as usize {
            return Ok(branches);
        }
    }

    warn!(
        pages = pagination.max_pages(),
        total = branches.len(),
        "Branch listing reached the page cap; returning a truncated list"
    );
    Ok(branches)
}

/// Case-insensitive substring filter over `branches`.
///
/// An empty (or whitespace-only) search returns the full list in its original
/// order. Any other search is matched literally, surrounding spaces included.
pub fn filter_branches(branches: &[String], search: &str) -> Vec<String> {
    if search.trim().is_empty() {
        return branches.to_vec();
    }
    let needle = search.to_lowercase();

    branches
        .iter()
        .filter(|branch| branch.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

//! Cursor-following collection of paginated listings.
//!
//! [`Paginator`] yields one page of items per fetch and stops when the
//! service reports the listing is exhausted. [`collect_all`] drains it into
//! a single ordered `Vec`.

use thiserror::Error;
use tracing::debug;

use crate::service::ServiceError;
use crate::types::ListPage;

/// Error collecting a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// A page fetch failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The service reported more results but gave no marker to fetch them.
    #[error("page {page} is truncated but carries no continuation marker")]
    MissingMarker { page: usize },
}

/// Iterator over the pages of a listing.
///
/// `fetch` is called with `None` for the first page and with the previous
/// page's marker afterwards. Iteration ends after the last page or after the
/// first error.
pub struct Paginator<F> {
    fetch: F,
    cursor: Option<String>,
    pages: usize,
    done: bool,
}

impl<F> Paginator<F> {
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            cursor: None,
            pages: 0,
            done: false,
        }
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }
}

impl<T, F> Iterator for Paginator<F>
where
    F: FnMut(Option<&str>) -> Result<ListPage<T>, ServiceError>,
{
    type Item = Result<Vec<T>, PaginationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let page = match (self.fetch)(self.cursor.as_deref()) {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };
        self.pages += 1;

        debug!(
            page = self.pages,
            items = page.items.len(),
            truncated = page.is_truncated,
            "Fetched listing page"
        );

        if page.is_truncated {
            match page.marker.filter(|m| !m.is_empty()) {
                Some(marker) => self.cursor = Some(marker),
                None => {
                    self.done = true;
                    return Some(Err(PaginationError::MissingMarker { page: self.pages }));
                }
            }
        } else {
            self.done = true;
        }

        Some(Ok(page.items))
    }
}

/// Fetches every page of a listing and concatenates the items in order.
pub fn collect_all<T, F>(fetch: F) -> Result<Vec<T>, PaginationError>
where
    F: FnMut(Option<&str>) -> Result<ListPage<T>, ServiceError>,
{
    let mut items = Vec::new();
    for page in Paginator::new(fetch) {
        items.extend(page?);
    }
    Ok(items)
}

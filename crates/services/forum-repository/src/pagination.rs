//! Paged reads over a sorted query.

use std::num::NonZeroU64;

use common::{AppError, AppResult};
use domain::{CollectionPage, PageWindow};

use crate::store::{Entity, EntityStore, Query};

/// Reject a zero page size
pub fn items_per_page(value: u64) -> AppResult<NonZeroU64> {
    NonZeroU64::new(value).ok_or_else(|| AppError::validation("Items per page must be at least 1"))
}

/// Fetch one page of an already sorted query.
///
/// The requested page is clamped into range first, so any `page` value
/// yields a valid page. When the whole set fits on one page the query is
/// run unwindowed. The materialized page is sorted again with the query's
/// own comparator, since a store is not required to keep order through
/// skip/take.
pub async fn fetch_page<S, T>(
    store: &S,
    query: Query<T>,
    page: i64,
    items_per_page: NonZeroU64,
    total_items: u64,
) -> AppResult<CollectionPage<T>>
where
    S: EntityStore,
    T: Entity,
{
    let window = PageWindow::resolve(page, items_per_page, total_items);
    if window.page as i64 != page {
        tracing::debug!("Clamped page {} to {} of {}", page, window.page, window.total_pages);
    }

    let query = match window.take {
        Some(take) => query.skip(window.skip).take(take),
        None => query,
    };

    let mut items = store.fetch(&query).await?;
    query.sort(&mut items);

    Ok(CollectionPage::new(items, total_items, window))
}

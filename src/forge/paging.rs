use log::*;
use std::future::Future;

use crate::{error::Result, forge::config::DEFAULT_PAGE_SIZE};

/// One page of a listing as returned by the forge.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Overall item count, for endpoints that report one.
    pub total: Option<u64>,
    /// Set when the forge flags the page as partial.
    pub incomplete: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            total: None,
            incomplete: false,
        }
    }
}

/// Items collected across pages.
#[derive(Debug)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: Option<u64>,
    /// A page was flagged partial, or the limit cut collection short.
    pub incomplete: bool,
}

/// Calls `fetch` for pages 1, 2, ... until a page comes back short, the
/// reported total has been collected, or `limit` items are held.
pub async fn collect_pages<T, F, Fut>(
    limit: Option<usize>,
    mut fetch: F,
) -> Result<Paged<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items: Vec<T> = vec![];
    let mut total = None;
    let mut incomplete = false;
    let mut page = 1;

    loop {
        let result = fetch(page).await?;
        let count = result.items.len();
        debug!("fetched {count} items from page {page}");

        total = result.total.or(total);
        incomplete |= result.incomplete;
        items.extend(result.items);

        if count < DEFAULT_PAGE_SIZE as usize {
            break;
        }

        if let Some(total) = total
            && items.len() as u64 >= total
        {
            break;
        }

        if let Some(limit) = limit
            && items.len() >= limit
        {
            let held = items.len().min(limit);
            if total.is_none_or(|t| t > held as u64) {
                warn!("stopped after {held} items: the forge serves no more");
                incomplete = true;
            }
            items.truncate(limit);
            break;
        }

        page += 1;
    }

    Ok(Paged {
        items,
        total,
        incomplete,
    })
}

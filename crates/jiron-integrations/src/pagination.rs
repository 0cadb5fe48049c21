//! Offset-based pagination shared by the search and agile endpoints.

use std::future::Future;

use crate::error::Result;

/// One page of results plus whether the server has more after it
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub is_last: bool,
}

/// Fetch pages until the server reports the last one, collecting every item.
///
/// `fetch_page` receives the offset (`startAt`) of the page to request. An empty
/// page also ends the loop.
///
/// # Errors
///
/// Returns the first page error; items gathered before it are discarded.
pub async fn collect_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut all_items = Vec::new();

    loop {
        let page = fetch_page(all_items.len()).await?;
        let fetched = page.items.len();
        all_items.extend(page.items);

        log::debug!("Fetched page of {fetched} items ({} total)", all_items.len());

        if page.is_last || fetched == 0 {
            break;
        }
    }

    Ok(all_items)
}

use std::future::Future;

use diffpost_core::DiffpostError;

/// Page size requested from list endpoints; a shorter page is the last one.
pub const PER_PAGE: usize = 100;

/// Fetch pages `1, 2, 3, ...` until one returns fewer than [`PER_PAGE`] items.
///
/// Items are returned in page order. A full page is always followed by
/// another request, so a listing whose size is an exact multiple of
/// [`PER_PAGE`] ends with one empty page. There is no page cap: termination
/// relies on the source running out of items.
///
/// # Errors
///
/// The first failing page aborts collection; no partial result is returned.
pub async fn collect_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, DiffpostError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, DiffpostError>>,
{
    let mut all = Vec::new();
    let mut page = 1u32;
    loop {
        let mut items = fetch_page(page).await?;
        let count = items.len();
        all.append(&mut items);
        if count < PER_PAGE {
            break;
        }
        page += 1;
    }
    tracing::debug!(pages = page, items = all.len(), "pagination finished");
    Ok(all)
}

/// Append `per_page` and `page` query parameters to `url`.
///
/// # Examples
///
/// ```
/// use diffpost_review::paginate::paged_url;
///
/// assert_eq!(paged_url("https://x/files", 2), "https://x/files?per_page=100&page=2");
/// assert_eq!(paged_url("https://x/files?a=1", 1), "https://x/files?a=1&per_page=100&page=1");
/// ```
pub fn paged_url(url: &str, page: u32) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}per_page={PER_PAGE}&page={page}")
}

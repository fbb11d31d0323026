//! Page-walking helper for list endpoints.

use crate::api::models::Paginated;
use crate::error::AppError;
use std::future::Future;

/// Page size used when the caller asks for everything or for a large cap.
pub const DEFAULT_PER_PAGE: u32 = 25;
/// Smallest page size the service accepts.
pub const MIN_PER_PAGE: u32 = 10;

/// One page of results as seen by [`fetch_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next: bool,
}

impl<T> From<Paginated<T>> for Page<T> {
    fn from(page: Paginated<T>) -> Self {
        let has_next = page.has_next();
        Page {
            items: page.data,
            has_next,
        }
    }
}

/// Page size for a given cap. `0` means no cap.
pub fn per_page_for(limit: usize) -> u32 {
    let per_page = if limit > 0 && limit < DEFAULT_PER_PAGE as usize {
        limit as u32
    } else {
        DEFAULT_PER_PAGE
    };
    per_page.max(MIN_PER_PAGE)
}

/// Call `fetcher(page, per_page)` from page 1 until the cap is reached or the
/// fetcher reports no further page. Items keep the order they were fetched
/// in, and the first error is returned immediately.
pub async fn fetch_all<T, F, Fut>(mut fetcher: F, limit: usize) -> Result<Vec<T>, AppError>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, AppError>>,
{
    let per_page = per_page_for(limit);
    let mut items = Vec::new();
    let mut page = 1u32;

    loop {
        let fetched = fetcher(page, per_page).await?;
        items.extend(fetched.items);

        if limit > 0 && items.len() >= limit {
            items.truncate(limit);
            break;
        }
        if !fetched.has_next {
            break;
        }

        log::debug!("fetching page {} ({} items so far)", page + 1, items.len());
        page += 1;
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use std::sync::Mutex;

    fn numbered_pages(pages: usize, per_page: usize) -> Vec<Page<usize>> {
        (0..pages)
            .map(|p| Page {
                items: (p * per_page..(p + 1) * per_page).collect(),
                has_next: p + 1 < pages,
            })
            .collect()
    }

    #[test]
    fn test_per_page_selection() {
        assert_eq!(per_page_for(0), 25);
        assert_eq!(per_page_for(7), 10);
        assert_eq!(per_page_for(10), 10);
        assert_eq!(per_page_for(24), 24);
        assert_eq!(per_page_for(25), 25);
        assert_eq!(per_page_for(500), 25);
    }

    #[tokio::test]
    async fn test_cap_stops_after_first_page() {
        let pages = numbered_pages(2, 10);
        let calls = Mutex::new(Vec::new());

        let items = fetch_all(
            |page, per_page| {
                calls.lock().unwrap().push((page, per_page));
                let result = pages[(page - 1) as usize].clone();
                async move { Ok(result) }
            },
            7,
        )
        .await
        .unwrap();

        assert_eq!(items, (0..7).collect::<Vec<_>>());
        assert_eq!(*calls.lock().unwrap(), vec![(1, 10)]);
    }

    #[tokio::test]
    async fn test_unlimited_walks_every_page_in_order() {
        let pages = numbered_pages(3, 25);
        let mut seen = Vec::new();

        let items = fetch_all(
            |page, _| {
                seen.push(page);
                let result = pages[(page - 1) as usize].clone();
                async move { Ok(result) }
            },
            0,
        )
        .await
        .unwrap();

        assert_eq!(items.len(), 75);
        assert!(items.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_cap_spanning_pages_is_truncated() {
        let pages = numbered_pages(3, 25);
        let items = fetch_all(
            |page, _| {
                let result = pages[(page - 1) as usize].clone();
                async move { Ok(result) }
            },
            30,
        )
        .await
        .unwrap();

        assert_eq!(items.len(), 30);
        assert_eq!(items[29], 29);
    }

    #[tokio::test]
    async fn test_error_is_propagated() {
        let mut calls = 0;
        let result: Result<Vec<usize>, AppError> = fetch_all(
            |page, _| {
                calls += 1;
                async move {
                    if page == 2 {
                        Err(ClientError::Parse("boom".to_string()).into())
                    } else {
                        Ok(Page {
                            items: vec![1],
                            has_next: true,
                        })
                    }
                }
            },
            0,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_count_never_exceeds_limit() {
        for limit in [1usize, 9, 10, 11, 24, 25, 26, 49] {
            let pages = numbered_pages(3, per_page_for(limit) as usize);
            let items = fetch_all(
                |page, _| {
                    let result = pages[(page - 1) as usize].clone();
                    async move { Ok(result) }
                },
                limit,
            )
            .await
            .unwrap();
            let available = pages.iter().map(|p| p.items.len()).sum::<usize>();
            assert_eq!(items.len(), limit.min(available));
        }
    }
}

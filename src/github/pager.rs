//! Best-effort pagination over a page-fetching closure.

use color_eyre::Result;
use std::future::Future;

/// Fixed page size requested from the upstream API.
pub const PAGE_SIZE: usize = 100;

/// Hard cap on pages fetched per collection, bounding total work against a
/// runaway upstream.
pub const MAX_PAGES: u32 = 10;

/// Fetch every page of a collection, starting at page 1, until a page comes
/// back short, the page cap is hit, or a fetch fails.
///
/// Failures truncate rather than propagate: statistics prefer partial counts
/// over hard errors, so whatever accumulated before the failure is returned.
/// Pages are fetched sequentially since a page is only requested once the
/// previous one proved full.
pub async fn fetch_all_pages<T, F, Fut>(what: &str, fetch_page: F) -> Vec<T>
where
  F: Fn(u32) -> Fut,
  Fut: Future<Output = Result<Vec<T>>>,
{
  let mut all = Vec::new();
  let mut page = 1u32;

  loop {
    let items = match fetch_page(page).await {
      Ok(items) => items,
      Err(e) => {
        tracing::warn!(what, page, "page fetch failed, returning partial results: {}", e);
        break;
      }
    };

    let count = items.len();
    all.extend(items);

    if count < PAGE_SIZE {
      break;
    }
    if page >= MAX_PAGES {
      tracing::warn!(what, "page cap of {} reached, results truncated", MAX_PAGES);
      break;
    }
    page += 1;
  }

  all
}

#[cfg(test)]
mod tests {
  use super::*;
  use color_eyre::eyre::eyre;
  use std::sync::atomic::{AtomicU32, Ordering};

  #[tokio::test]
  async fn stops_after_first_short_page() {
    let requests = AtomicU32::new(0);

    let items = fetch_all_pages("commits", |page| {
      requests.fetch_add(1, Ordering::SeqCst);
      async move {
        Ok(match page {
          1 | 2 => vec![0u8; PAGE_SIZE],
          3 => vec![0u8; 50],
          _ => panic!("requested page {} past the short page", page),
        })
      }
    })
    .await;

    assert_eq!(items.len(), 250);
    assert_eq!(requests.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn empty_first_page_yields_nothing() {
    let items: Vec<u8> = fetch_all_pages("commits", |_| async { Ok(vec![]) }).await;
    assert!(items.is_empty());
  }

  #[tokio::test]
  async fn caps_at_ten_pages_even_when_full() {
    let requests = AtomicU32::new(0);

    let items = fetch_all_pages("commits", |_| {
      requests.fetch_add(1, Ordering::SeqCst);
      async { Ok(vec![0u8; PAGE_SIZE]) }
    })
    .await;

    assert_eq!(items.len(), PAGE_SIZE * MAX_PAGES as usize);
    assert_eq!(requests.load(Ordering::SeqCst), MAX_PAGES);
  }

  #[tokio::test]
  async fn failure_returns_accumulated_pages() {
    let items = fetch_all_pages("commits", |page| async move {
      match page {
        1 => Ok(vec![0u8; PAGE_SIZE]),
        _ => Err(eyre!("rate limited")),
      }
    })
    .await;

    assert_eq!(items.len(), PAGE_SIZE);
  }

  #[tokio::test]
  async fn failure_on_first_page_returns_empty() {
    let items: Vec<u8> = fetch_all_pages("commits", |_| async { Err(eyre!("boom")) }).await;
    assert!(items.is_empty());
  }
}

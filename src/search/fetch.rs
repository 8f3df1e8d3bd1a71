//! Per-collection fetchers.
//!
//! A fetcher never fails the aggregated search: its result is folded into a
//! [`FetchOutcome`] which the merger turns into a (possibly empty) list.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use super::filter::TextFilter;
use super::query::NormalizedQuery;
use super::source::{Collection, ContentSource, FetchError, Visibility};
use crate::models::content::{Article, PortfolioItem, ServicePage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    Found(Vec<T>),
    /// Not requested by the type filter.
    Skipped,
    Failed {
        collection: Collection,
        reason: String,
    },
    TimedOut {
        collection: Collection,
        after: Duration,
    },
}

impl<T> FetchOutcome<T> {
    /// True when the collection should have been searched but was not.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::TimedOut { .. })
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Found(items) => items,
            Self::Skipped | Self::Failed { .. } | Self::TimedOut { .. } => Vec::new(),
        }
    }
}

/// Runs `fetch` under an optional deadline and records the outcome.
pub async fn guarded<T, F>(
    collection: Collection,
    timeout: Option<Duration>,
    fetch: F,
) -> FetchOutcome<T>
where
    F: Future<Output = Result<Vec<T>, FetchError>>,
{
    let result = match timeout {
        Some(after) => match tokio::time::timeout(after, fetch).await {
            Ok(result) => result,
            Err(_) => {
                warn!(collection = %collection, ?after, "Search fetch timed out");
                metrics::counter!("search_fetch_failures_total", "collection" => collection.as_str(), "reason" => "timeout")
                    .increment(1);
                return FetchOutcome::TimedOut { collection, after };
            }
        },
        None => fetch.await,
    };

    match result {
        Ok(items) => {
            debug!(collection = %collection, count = items.len(), "Search fetch finished");
            FetchOutcome::Found(items)
        }
        Err(e) => {
            warn!(collection = %collection, error = %e, "Search fetch failed");
            metrics::counter!("search_fetch_failures_total", "collection" => collection.as_str(), "reason" => "error")
                .increment(1);
            FetchOutcome::Failed {
                collection,
                reason: e.to_string(),
            }
        }
    }
}

pub async fn fetch_articles(
    source: &dyn ContentSource,
    query: &NormalizedQuery,
    visibility: Visibility,
    limit: u64,
) -> Result<Vec<Article>, FetchError> {
    let filter = TextFilter::from_query(query);
    let mut articles = source.find_articles(&filter, visibility, limit).await?;
    truncate(&mut articles, limit);
    Ok(articles)
}

/// Text match first, then tag membership; merged by id and cut to `limit`.
pub async fn fetch_portfolio_items(
    source: &dyn ContentSource,
    query: &NormalizedQuery,
    limit: u64,
) -> Result<Vec<PortfolioItem>, FetchError> {
    let filter = TextFilter::from_query(query);
    let mut items = source.find_portfolio_items(&filter, limit).await?;

    if !query.terms.is_empty() {
        let tagged = source
            .find_portfolio_items_by_tags(&query.terms, limit)
            .await?;
        merge_unique(&mut items, tagged, |item| item.id);
    }

    truncate(&mut items, limit);
    Ok(items)
}

/// Title/description match first, then body content for any slots left.
pub async fn fetch_service_pages(
    source: &dyn ContentSource,
    query: &NormalizedQuery,
    limit: u64,
) -> Result<Vec<ServicePage>, FetchError> {
    let filter = TextFilter::from_query(query);
    let mut pages = source.find_service_pages(&filter, limit).await?;
    truncate(&mut pages, limit);

    let found = pages.len() as u64;
    if found < limit {
        let exclude: Vec<i32> = pages.iter().map(|page| page.id).collect();
        let by_content = source
            .find_service_pages_by_content(&query.lowered, &exclude, limit - found)
            .await?;
        merge_unique(&mut pages, by_content, |page| page.id);
        truncate(&mut pages, limit);
    }

    Ok(pages)
}

/// Appends the items of `extra` whose id is not already present, keeping order.
fn merge_unique<T, F>(items: &mut Vec<T>, extra: Vec<T>, id: F)
where
    F: Fn(&T) -> i32,
{
    for item in extra {
        let item_id = id(&item);
        if !items.iter().any(|existing| id(existing) == item_id) {
            items.push(item);
        }
    }
}

fn truncate<T>(items: &mut Vec<T>, limit: u64) {
    items.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
}

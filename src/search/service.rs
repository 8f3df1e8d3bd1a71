//! The search aggregator: normalize, consult the cache, fan out to the three
//! collections, merge, encode and remember.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::cache::{CacheStatus, TtlCache};
use super::fetch::{FetchOutcome, fetch_articles, fetch_portfolio_items, fetch_service_pages, guarded};
use super::query::NormalizedQuery;
use super::source::{Collection, ContentSource, Visibility};
use crate::config::SearchConfig;
use crate::models::content::{Article, PortfolioItem, ServicePage};

/// Responses are cached pre-encoded so repeated lookups are byte-identical.
pub type SearchCache = TtlCache<CacheKey, Arc<str>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub query: String,
    pub kind: Option<Collection>,
    pub limit: u64,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    /// Restrict the search to one collection.
    pub kind: Option<Collection>,
    pub limit: Option<u64>,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub posts: Vec<Article>,
    pub projects: Vec<PortfolioItem>,
    pub services: Vec<ServicePage>,
    pub total_results: usize,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    #[must_use]
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            posts: Vec::new(),
            projects: Vec::new(),
            services: Vec::new(),
            total_results: 0,
            query: query.into(),
            error: None,
        }
    }

    /// Same shape as a normal response so the search box can keep rendering.
    #[must_use]
    pub fn degraded(query: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::empty(query)
        }
    }

    fn from_outcomes(
        query: String,
        posts: FetchOutcome<Article>,
        projects: FetchOutcome<PortfolioItem>,
        services: FetchOutcome<ServicePage>,
    ) -> Self {
        let posts = posts.into_items();
        let projects = projects.into_items();
        let services = services.into_items();

        Self {
            total_results: posts.len() + projects.len() + services.len(),
            posts,
            projects,
            services,
            query,
            error: None,
        }
    }
}

/// Encoded response plus how it was produced.
#[derive(Debug, Clone)]
pub struct SearchReply {
    pub body: Arc<str>,
    pub cache: CacheStatus,
    /// At least one collection failed or timed out; the body holds what was found.
    pub degraded: bool,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Failed to encode search response: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct SearchService {
    source: Arc<dyn ContentSource>,
    cache: Arc<SearchCache>,
    settings: SearchConfig,
}

impl SearchService {
    #[must_use]
    pub fn new(
        source: Arc<dyn ContentSource>,
        cache: Arc<SearchCache>,
        settings: SearchConfig,
    ) -> Self {
        Self {
            source,
            cache,
            settings,
        }
    }

    /// Builds the service together with a cache sized from `settings`.
    #[must_use]
    pub fn with_default_cache(source: Arc<dyn ContentSource>, settings: SearchConfig) -> Self {
        let cache = Arc::new(SearchCache::new(
            settings.cache_ttl(),
            settings.cache_capacity,
        ));
        Self::new(source, cache, settings)
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<SearchCache> {
        &self.cache
    }

    /// Clamps the requested limit into `1..=max_limit`; zero or absent means the default.
    #[must_use]
    pub fn resolve_limit(&self, requested: Option<u64>) -> u64 {
        match requested {
            None | Some(0) => self.settings.default_limit,
            Some(limit) => limit.min(self.settings.max_limit),
        }
    }

    pub async fn search(&self, request: SearchRequest) -> Result<SearchReply, SearchError> {
        let query = NormalizedQuery::new(&request.query, self.settings.max_query_length);

        if query.is_too_short(self.settings.min_query_length) {
            debug!(query = %query.original, "Query too short, skipping search");
            return Ok(SearchReply {
                body: encode(&SearchResponse::empty(query.original))?,
                cache: CacheStatus::Miss,
                degraded: false,
            });
        }

        let limit = self.resolve_limit(request.limit);
        let visibility = request.visibility;
        let key = CacheKey {
            query: query.lowered.clone(),
            kind: request.kind,
            limit,
            visibility,
        };

        if let Some(body) = self.cache.get(&key) {
            debug!(query = %query.lowered, "Search cache hit");
            return Ok(SearchReply {
                body,
                cache: CacheStatus::Hit,
                degraded: false,
            });
        }

        let wants = |collection: Collection| request.kind.is_none_or(|kind| kind == collection);
        let timeout = self.settings.fetch_timeout();
        let source = self.source.as_ref();

        let (posts, projects, services) = tokio::join!(
            async {
                if wants(Collection::Posts) {
                    guarded(
                        Collection::Posts,
                        timeout,
                        fetch_articles(source, &query, visibility, limit),
                    )
                    .await
                } else {
                    FetchOutcome::Skipped
                }
            },
            async {
                if wants(Collection::Projects) {
                    guarded(
                        Collection::Projects,
                        timeout,
                        fetch_portfolio_items(source, &query, limit),
                    )
                    .await
                } else {
                    FetchOutcome::Skipped
                }
            },
            async {
                if wants(Collection::Services) {
                    guarded(
                        Collection::Services,
                        timeout,
                        fetch_service_pages(source, &query, limit),
                    )
                    .await
                } else {
                    FetchOutcome::Skipped
                }
            },
        );

        let degraded = posts.is_degraded() || projects.is_degraded() || services.is_degraded();
        let response = SearchResponse::from_outcomes(query.original.clone(), posts, projects, services);
        let body = encode(&response)?;

        if degraded {
            warn!(query = %query.lowered, "Partial search result, not caching");
        } else {
            self.cache.put(key, body.clone());
        }

        info!(
            query = %query.lowered,
            total_results = response.total_results,
            degraded,
            "Search completed"
        );

        Ok(SearchReply {
            body,
            cache: CacheStatus::Miss,
            degraded,
        })
    }
}

fn encode(response: &SearchResponse) -> Result<Arc<str>, SearchError> {
    Ok(Arc::from(serde_json::to_string(response)?))
}

use axum::{
    Json,
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower_sessions::Session;
use tracing::{debug, error, info};

use super::auth::resolve_caller;
use super::{ApiResponse, AppState, CachePurgeResult};
use crate::search::{CacheStats, CacheStatus, Collection, SearchRequest, SearchResponse};

pub const CACHE_HEADER: &str = "x-cache";

/// Query string of `GET /search`. Every field is optional and parsed leniently:
/// the search box fires on each keystroke and must never see a 400.
#[derive(Debug, Default)]
pub struct SearchParams {
    pub q: String,
    pub kind: Option<String>,
    pub limit: Option<String>,
}

impl SearchParams {
    /// Reads `q`, `type` and `limit`, keeping the first occurrence of each.
    /// Unknown keys and undecodable input are ignored.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let mut params = Self::default();
        let mut seen_q = false;

        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "q" if !seen_q => {
                    params.q = value.into_owned();
                    seen_q = true;
                }
                "type" if params.kind.is_none() => params.kind = Some(value.into_owned()),
                "limit" if params.limit.is_none() => params.limit = Some(value.into_owned()),
                _ => {}
            }
        }

        params
    }

    fn kind(&self) -> Option<Collection> {
        let raw = self.kind.as_deref().filter(|k| !k.trim().is_empty())?;
        match raw.parse() {
            Ok(kind) => Some(kind),
            Err(_) => {
                debug!("Ignoring unknown search type '{raw}'");
                None
            }
        }
    }

    fn limit(&self) -> Option<u64> {
        self.limit.as_deref().and_then(|l| l.trim().parse().ok())
    }
}

/// GET /search?q=&type=&limit=
pub async fn search(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    RawQuery(raw): RawQuery,
) -> Response {
    let params = SearchParams::parse(raw.as_deref());
    let caller = resolve_caller(&state, &session, &headers).await;

    let request = SearchRequest {
        query: params.q.clone(),
        kind: params.kind(),
        limit: params.limit(),
        visibility: caller.visibility(),
    };

    match state.search_service().search(request).await {
        Ok(reply) => (
            StatusCode::OK,
            [
                ("content-type", "application/json"),
                (CACHE_HEADER, reply.cache.as_str()),
            ],
            reply.body.to_string(),
        )
            .into_response(),
        Err(e) => {
            error!("Search failed for '{}': {}", params.q, e);
            (
                StatusCode::OK,
                [(CACHE_HEADER, CacheStatus::Miss.as_str())],
                Json(SearchResponse::degraded(params.q.trim(), "Search failed")),
            )
                .into_response()
        }
    }
}

/// GET /search/cache
pub async fn get_cache_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<CacheStats>> {
    Json(ApiResponse::success(state.search_service().cache().stats()))
}

/// DELETE /search/cache
pub async fn purge_cache(State(state): State<Arc<AppState>>) -> Json<ApiResponse<CachePurgeResult>> {
    let removed = state.search_service().cache().clear();
    info!("Search cache purged ({removed} entries)");
    Json(ApiResponse::success(CachePurgeResult { removed }))
}

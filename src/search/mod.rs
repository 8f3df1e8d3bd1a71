//! Site search.
//!
//! A query runs through this pipeline:
//! - **`query`**: trim, lowercase and split into terms.
//! - **`cache`**: bounded TTL cache keyed by the normalized request.
//! - **`filter`**: typed text filters compiled to SeaORM conditions.
//! - **`fetch`**: one fetcher per collection, each failing independently.
//! - **`service`**: runs the fetchers concurrently and merges the response.

pub mod cache;
pub mod fetch;
pub mod filter;
pub mod query;
pub mod service;
pub mod source;

pub use cache::{CacheStats, CacheStatus, Clock, ManualClock, SystemClock, TtlCache};
pub use fetch::FetchOutcome;
pub use filter::TextFilter;
pub use query::NormalizedQuery;
pub use service::{CacheKey, SearchCache, SearchError, SearchReply, SearchRequest, SearchResponse, SearchService};
pub use source::{Collection, ContentSource, FetchError, Visibility};

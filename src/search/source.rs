//! Storage seam for the search fetchers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::filter::TextFilter;
use crate::models::content::{Article, PortfolioItem, ServicePage};

/// The record collections the aggregator searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Posts,
    Projects,
    Services,
}

impl Collection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Projects => "projects",
            Self::Services => "services",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "posts" => Ok(Self::Posts),
            "projects" => Ok(Self::Projects),
            "services" => Ok(Self::Services),
            other => anyhow::bail!("Unknown search type: {other}"),
        }
    }
}

/// Which records the caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    /// Also sees draft articles.
    Privileged,
}

impl Visibility {
    #[must_use]
    pub const fn includes_drafts(self) -> bool {
        matches!(self, Self::Privileged)
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("{0}")]
    Other(String),
}

impl From<sea_orm::DbErr> for FetchError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for FetchError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<sea_orm::DbErr>() {
            Ok(db) => Self::from(db),
            Err(other) => Self::Other(format!("{other:#}")),
        }
    }
}

/// Read-only queries the search fetchers need from storage.
///
/// Implementations apply visibility rules themselves: only published posts
/// (plus drafts when `visibility` allows), active/completed projects and
/// published service pages are ever returned.
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    async fn find_articles(
        &self,
        filter: &TextFilter,
        visibility: Visibility,
        limit: u64,
    ) -> Result<Vec<Article>, FetchError>;

    async fn find_portfolio_items(
        &self,
        filter: &TextFilter,
        limit: u64,
    ) -> Result<Vec<PortfolioItem>, FetchError>;

    /// Projects carrying any of `tags`. Comparison is case-insensitive.
    async fn find_portfolio_items_by_tags(
        &self,
        tags: &[String],
        limit: u64,
    ) -> Result<Vec<PortfolioItem>, FetchError>;

    async fn find_service_pages(
        &self,
        filter: &TextFilter,
        limit: u64,
    ) -> Result<Vec<ServicePage>, FetchError>;

    /// Service pages whose body contains `phrase`, skipping ids in `exclude`.
    async fn find_service_pages_by_content(
        &self,
        phrase: &str,
        exclude: &[i32],
        limit: u64,
    ) -> Result<Vec<ServicePage>, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_parse() {
        assert_eq!("posts".parse::<Collection>().unwrap(), Collection::Posts);
        assert_eq!(" Projects ".parse::<Collection>().unwrap(), Collection::Projects);
        assert_eq!("services".parse::<Collection>().unwrap(), Collection::Services);
        assert!("pages".parse::<Collection>().is_err());
    }

    #[test]
    fn test_fetch_error_keeps_db_variant() {
        let err = anyhow::Error::new(sea_orm::DbErr::Custom("gone".to_string()));
        assert!(matches!(FetchError::from(err), FetchError::Database(_)));

        let err = anyhow::anyhow!("boom");
        assert!(matches!(FetchError::from(err), FetchError::Other(_)));
    }
}

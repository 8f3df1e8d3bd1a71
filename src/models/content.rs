use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entities::{posts, projects, service_pages};

/// Publication state of a blog post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Published,
}

impl ArticleStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArticleStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            other => anyhow::bail!("Unknown article status: {other}"),
        }
    }
}

/// Lifecycle of a portfolio project. Only `Active` and `Completed` are searchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
    Archived,
}

impl ProjectStatus {
    pub const SEARCHABLE: [Self; 2] = [Self::Active, Self::Completed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "on_hold" => Ok(Self::OnHold),
            "archived" => Ok(Self::Archived),
            other => anyhow::bail!("Unknown project status: {other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub published_at: Option<String>,
    pub status: String,
    pub author_id: Option<i32>,
}

impl From<posts::Model> for Article {
    fn from(model: posts::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            excerpt: model.excerpt,
            cover_image: model.cover_image,
            published_at: model.published_at,
            status: model.status,
            author_id: model.author_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub status: String,
}

impl From<projects::Model> for PortfolioItem {
    fn from(model: projects::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            description: model.description,
            cover_image: model.cover_image,
            category: model.category,
            tags: serde_json::from_str(&model.tags).unwrap_or_default(),
            status: model.status,
        }
    }
}

/// Search hit for a service page. The body is matched against but never returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePage {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
}

impl From<service_pages::Model> for ServicePage {
    fn from(model: service_pages::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            description: model.description,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArticleInput {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub status: ArticleStatus,
    pub published_at: Option<String>,
    pub author_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct PortfolioItemInput {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub status: ProjectStatus,
}

#[derive(Debug, Clone)]
pub struct ServicePageInput {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub content: String,
    pub published: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_status_round_trips_through_str() {
        for status in [
            ProjectStatus::Active,
            ProjectStatus::Completed,
            ProjectStatus::OnHold,
            ProjectStatus::Archived,
        ] {
            assert_eq!(status.as_str().parse::<ProjectStatus>().unwrap(), status);
        }
        assert!("paused".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn test_portfolio_item_tolerates_malformed_tags() {
        let model = projects::Model {
            id: 7,
            title: "Bakery rebrand".to_string(),
            slug: "bakery-rebrand".to_string(),
            description: None,
            cover_image: None,
            category: "Branding".to_string(),
            tags: "not json".to_string(),
            status: "active".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            title_lc: "bakery rebrand".to_string(),
            description_lc: None,
            tags_lc: "not json".to_string(),
        };

        let item = PortfolioItem::from(model);
        assert!(item.tags.is_empty());
    }

    #[test]
    fn test_article_serializes_camel_case() {
        let article = Article {
            id: 1,
            title: "Web Design Trends 2024".to_string(),
            slug: "web-design-trends-2024".to_string(),
            excerpt: None,
            cover_image: Some("/img/trends.png".to_string()),
            published_at: None,
            status: "published".to_string(),
            author_id: None,
        };

        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["coverImage"], "/img/trends.png");
        assert!(json.get("cover_image").is_none());
    }
}

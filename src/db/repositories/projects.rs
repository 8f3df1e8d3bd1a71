use crate::entities::{prelude::*, projects};
use crate::models::content::{PortfolioItemInput, ProjectStatus};
use crate::search::TextFilter;
use crate::search::filter::tag_condition;
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

pub struct ProjectRepository {
    conn: DatabaseConnection,
}

impl ProjectRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, input: &PortfolioItemInput) -> Result<i32> {
        let active_model = projects::ActiveModel {
            title: Set(input.title.clone()),
            slug: Set(input.slug.clone()),
            description: Set(input.description.clone()),
            cover_image: Set(input.cover_image.clone()),
            category: Set(input.category.clone()),
            tags: Set(serde_json::to_string(&input.tags)?),
            status: Set(input.status.as_str().to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .with_context(|| format!("Failed to insert project '{}'", input.slug))?;

        Ok(model.id)
    }

    pub async fn search(&self, filter: &TextFilter, limit: u64) -> Result<Vec<projects::Model>> {
        self.find_searchable(
            filter.condition([projects::Column::TitleLc, projects::Column::DescriptionLc]),
            limit,
        )
        .await
    }

    pub async fn search_by_tags(&self, tags: &[String], limit: u64) -> Result<Vec<projects::Model>> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        self.find_searchable(tag_condition(projects::Column::TagsLc, tags), limit)
            .await
    }

    async fn find_searchable(&self, condition: Condition, limit: u64) -> Result<Vec<projects::Model>> {
        let statuses = ProjectStatus::SEARCHABLE.map(ProjectStatus::as_str);

        let rows = Projects::find()
            .filter(projects::Column::Status.is_in(statuses))
            .filter(condition)
            .order_by_desc(projects::Column::CreatedAt)
            .order_by_desc(projects::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }
}

use crate::entities::{posts, prelude::*};
use crate::models::content::{ArticleInput, ArticleStatus};
use crate::search::TextFilter;
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

pub struct PostRepository {
    conn: DatabaseConnection,
}

impl PostRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, input: &ArticleInput) -> Result<i32> {
        let active_model = posts::ActiveModel {
            title: Set(input.title.clone()),
            slug: Set(input.slug.clone()),
            excerpt: Set(input.excerpt.clone()),
            cover_image: Set(input.cover_image.clone()),
            published_at: Set(input.published_at.clone()),
            status: Set(input.status.as_str().to_string()),
            author_id: Set(input.author_id),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .with_context(|| format!("Failed to insert post '{}'", input.slug))?;

        Ok(model.id)
    }

    /// Newest first. Drafts are only included when `include_drafts` is set.
    pub async fn search(
        &self,
        filter: &TextFilter,
        include_drafts: bool,
        limit: u64,
    ) -> Result<Vec<posts::Model>> {
        let mut statuses = vec![ArticleStatus::Published.as_str()];
        if include_drafts {
            statuses.push(ArticleStatus::Draft.as_str());
        }

        let rows = Posts::find()
            .filter(posts::Column::Status.is_in(statuses))
            .filter(filter.condition([posts::Column::TitleLc, posts::Column::ExcerptLc]))
            .order_by_desc(posts::Column::PublishedAt)
            .order_by_desc(posts::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }
}

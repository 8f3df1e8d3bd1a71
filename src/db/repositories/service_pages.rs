use crate::entities::{prelude::*, service_pages};
use crate::models::content::ServicePageInput;
use crate::search::TextFilter;
use crate::search::filter::contains_folded;
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

pub struct ServicePageRepository {
    conn: DatabaseConnection,
}

impl ServicePageRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, input: &ServicePageInput) -> Result<i32> {
        let active_model = service_pages::ActiveModel {
            title: Set(input.title.clone()),
            slug: Set(input.slug.clone()),
            description: Set(input.description.clone()),
            content: Set(input.content.clone()),
            published: Set(input.published),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .with_context(|| format!("Failed to insert service page '{}'", input.slug))?;

        Ok(model.id)
    }

    pub async fn search(
        &self,
        filter: &TextFilter,
        limit: u64,
    ) -> Result<Vec<service_pages::Model>> {
        let rows = ServicePages::find()
            .filter(service_pages::Column::Published.eq(true))
            .filter(filter.condition([
                service_pages::Column::TitleLc,
                service_pages::Column::DescriptionLc,
            ]))
            .order_by_asc(service_pages::Column::Title)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    /// Body-content match for `phrase` (already folded), skipping `exclude`.
    pub async fn search_content(
        &self,
        phrase: &str,
        exclude: &[i32],
        limit: u64,
    ) -> Result<Vec<service_pages::Model>> {
        let mut query = ServicePages::find()
            .filter(service_pages::Column::Published.eq(true))
            .filter(contains_folded(service_pages::Column::ContentLc, phrase));

        if !exclude.is_empty() {
            query = query.filter(service_pages::Column::Id.is_not_in(exclude.to_vec()));
        }

        let rows = query
            .order_by_asc(service_pages::Column::Title)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }
}

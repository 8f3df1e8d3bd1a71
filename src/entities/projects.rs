use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, Set};

use crate::search::query::fold_case;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub category: String,
    /// JSON array of tag labels, in display order.
    /// Example: ["web", "branding"]
    #[sea_orm(column_type = "Text")]
    pub tags: String,
    /// `active`, `completed`, `on_hold` or `archived`
    pub status: String,
    pub created_at: String,
    /// Folded copies of the searchable text, maintained on save.
    pub title_lc: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description_lc: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub tags_lc: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let ActiveValue::Set(title) = &self.title {
            self.title_lc = Set(fold_case(title));
        }
        if let ActiveValue::Set(description) = &self.description {
            self.description_lc = Set(description.as_deref().map(fold_case));
        }
        // Folding the serialized array keeps it valid JSON: serde_json only
        // escapes quotes, backslashes and control characters.
        if let ActiveValue::Set(tags) = &self.tags {
            self.tags_lc = Set(fold_case(tags));
        }
        Ok(self)
    }
}

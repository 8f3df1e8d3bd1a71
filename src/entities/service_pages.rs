use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, Set};

use crate::search::query::fold_case;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "service_pages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub published: bool,
    pub created_at: String,
    /// Folded copies of the searchable text, maintained on save.
    pub title_lc: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description_lc: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub content_lc: String,
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
        if let ActiveValue::Set(content) = &self.content {
            self.content_lc = Set(fold_case(content));
        }
        Ok(self)
    }
}

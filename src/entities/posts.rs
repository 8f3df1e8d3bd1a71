use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, Set};

use crate::search::query::fold_case;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    /// RFC 3339; unset while the post is still a draft.
    pub published_at: Option<String>,
    /// `draft` or `published`
    pub status: String,
    pub author_id: Option<i32>,
    /// Folded copies of the searchable text, maintained on save.
    pub title_lc: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub excerpt_lc: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let ActiveValue::Set(title) = &self.title {
            self.title_lc = Set(fold_case(title));
        }
        if let ActiveValue::Set(excerpt) = &self.excerpt {
            self.excerpt_lc = Set(excerpt.as_deref().map(fold_case));
        }
        Ok(self)
    }
}

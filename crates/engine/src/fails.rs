//! The module contains the "coding fail" post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Author shown when a post is submitted without one.
pub const DEFAULT_AUTHOR: &str = "Anonymous";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "fails")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: String,
    pub author: String,
    pub created_by: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A coding-fail post.
///
/// `created_by_name` carries the creator's name when the enrichment read
/// succeeded; a `None` means the row exists but the join was skipped or
/// failed, not that the reference is dangling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fail {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub author: String,
    pub created_by: i32,
    pub created_by_name: Option<String>,
}

impl Fail {
    pub(crate) fn from_model(model: Model, created_by_name: Option<String>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            author: model.author,
            created_by: model.created_by,
            created_by_name,
        }
    }
}

/// Fields for a new post. A missing `author` falls back to
/// [`DEFAULT_AUTHOR`].
#[derive(Clone, Debug)]
pub struct FailDraft {
    pub name: String,
    pub description: String,
    pub author: Option<String>,
    pub created_by: i32,
}

/// Structured set of optional field updates; only supplied fields change.
///
/// `created_by` is immutable, so it has no slot here.
#[derive(Clone, Debug, Default)]
pub struct FailChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
}

impl FailChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.author.is_none()
    }
}

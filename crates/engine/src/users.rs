//! Users table entity and its domain representation.
//!
//! A user is created once via sign-up or seeding and then only read: by the
//! login lookup and by fail enrichment. There is no update or delete path.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::fails::Entity")]
    Fails,
}

impl Related<super::fails::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A user of the service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
        }
    }
}

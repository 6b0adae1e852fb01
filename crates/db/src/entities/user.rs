//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Unique, case-sensitive as stored
    #[sea_orm(unique)]
    pub username: String,

    /// Unique, case-sensitive as stored
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 PHC string; `None` until a password is set
    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    /// Free-text bio
    #[sea_orm(nullable)]
    pub about_me: Option<String>,

    #[sea_orm(nullable)]
    pub last_seen: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

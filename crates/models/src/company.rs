use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{product, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "company")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Set once at creation, immutable thereafter.
    pub date_created: DateTimeWithTimeZone,
    /// Durable pointer to the banner blob; `None` until a banner is written.
    pub banner_url: Option<String>,
    /// Durable pointer to the logo blob; `None` until a logo is written.
    pub logo_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Products,
    Owner,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Products => Entity::has_many(product::Entity).into(),
            Relation::Owner => Entity::has_many(user::Entity).into(),
        }
    }
}

impl Related<product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

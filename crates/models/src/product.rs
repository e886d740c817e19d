use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{company, genre, product_image, social_network, video};

/// Read-only from the company core's perspective; no mutation helpers here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub company_id: i32,
    pub genre_id: Option<i32>,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Company,
    Genre,
    Video,
    Images,
    SocialNetworks,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Company => Entity::belongs_to(company::Entity)
                .from(Column::CompanyId)
                .to(company::Column::Id)
                .into(),
            Relation::Genre => Entity::belongs_to(genre::Entity)
                .from(Column::GenreId)
                .to(genre::Column::Id)
                .into(),
            Relation::Video => Entity::has_one(video::Entity).into(),
            Relation::Images => Entity::has_many(product_image::Entity).into(),
            Relation::SocialNetworks => Entity::has_many(social_network::Entity).into(),
        }
    }
}

impl Related<company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<genre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Genre.def()
    }
}

impl Related<video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Video.def()
    }
}

impl Related<product_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<social_network::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SocialNetworks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Pure projections from domain records to transport-facing item lists.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{CompanyRecord, ProductRecord, SocialLink};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyItem {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub date_created: DateTime<Utc>,
    pub banner_url: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompanyList {
    pub items: Vec<CompanyItem>,
}

impl From<CompanyRecord> for CompanyItem {
    fn from(c: CompanyRecord) -> Self {
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            date_created: c.date_created,
            banner_url: c.banner_url,
            logo_url: c.logo_url,
        }
    }
}

impl From<Vec<CompanyRecord>> for CompanyList {
    fn from(records: Vec<CompanyRecord>) -> Self {
        Self { items: records.into_iter().map(CompanyItem::from).collect() }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinkItem {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductItem {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub genre: Option<String>,
    pub video: Option<String>,
    pub images: Vec<String>,
    pub social_networks: Vec<SocialLinkItem>,
}

#[derive(Debug, Serialize)]
pub struct ProductList {
    pub items: Vec<ProductItem>,
}

impl From<SocialLink> for SocialLinkItem {
    fn from(s: SocialLink) -> Self {
        Self { name: s.name, url: s.url }
    }
}

impl From<ProductRecord> for ProductItem {
    fn from(p: ProductRecord) -> Self {
        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            genre: p.genre,
            video: p.video_url,
            images: p.images,
            social_networks: p.social_networks.into_iter().map(SocialLinkItem::from).collect(),
        }
    }
}

impl From<Vec<ProductRecord>> for ProductList {
    fn from(records: Vec<ProductRecord>) -> Self {
        Self { items: records.into_iter().map(ProductItem::from).collect() }
    }
}

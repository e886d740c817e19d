use chrono::{DateTime, Utc};

/// Business view of a company row.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyRecord {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub date_created: DateTime<Utc>,
    pub banner_url: Option<String>,
    pub logo_url: Option<String>,
}

/// Caller identity resolved against the user table.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub role: String,
    pub company_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SocialLink {
    pub name: String,
    pub url: String,
}

/// A product with its media eagerly resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub genre: Option<String>,
    pub video_url: Option<String>,
    /// Gallery URLs in display order.
    pub images: Vec<String>,
    pub social_networks: Vec<SocialLink>,
}

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::domain::{CompanyRecord, ProductRecord, SocialLink, UserRecord};
use crate::assets::AssetKind;
use crate::errors::ServiceError;

/// Entity-store abstraction for the company aggregate.
///
/// Injected into the service instead of an ambient shared context; each
/// operation scopes its own connection/transaction internally.
#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn find_company(&self, id: i32) -> Result<Option<CompanyRecord>, ServiceError>;

    /// Resolve the caller's own company: the caller id must be the primary
    /// key of a user with the owner role and a linked company.
    async fn find_owned_company(&self, owner_id: i32) -> Result<Option<CompanyRecord>, ServiceError>;

    async fn find_user(&self, id: i32) -> Result<Option<UserRecord>, ServiceError>;

    /// Insert a new company and link the user to it as owner, atomically.
    /// The user's primary key is untouched.
    async fn promote_to_owner(
        &self,
        user_id: i32,
        title: &str,
        description: &str,
    ) -> Result<CompanyRecord, ServiceError>;

    /// Persist the derived URL pointer; the final step of a replace.
    async fn set_asset_url(
        &self,
        company_id: i32,
        kind: AssetKind,
        url: &str,
    ) -> Result<(), ServiceError>;

    async fn list_companies(&self) -> Result<Vec<CompanyRecord>, ServiceError>;

    /// `Ok(None)` when the company does not exist; products carry their
    /// media eagerly resolved.
    async fn list_products(&self, company_id: i32)
        -> Result<Option<Vec<ProductRecord>>, ServiceError>;
}

fn company_record(model: models::company::Model) -> CompanyRecord {
    CompanyRecord {
        id: model.id,
        title: model.title,
        description: model.description,
        date_created: model.date_created.with_timezone(&Utc),
        banner_url: model.banner_url,
        logo_url: model.logo_url,
    }
}

fn user_record(model: models::user::Model) -> UserRecord {
    UserRecord {
        id: model.id,
        username: model.username,
        role: model.role,
        company_id: model.company_id,
    }
}

/// SeaORM-backed store implementation.
pub struct SeaOrmCompanyStore {
    pub db: DatabaseConnection,
}

#[async_trait]
impl CompanyStore for SeaOrmCompanyStore {
    async fn find_company(&self, id: i32) -> Result<Option<CompanyRecord>, ServiceError> {
        let found = models::company::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(found.map(company_record))
    }

    async fn find_owned_company(
        &self,
        owner_id: i32,
    ) -> Result<Option<CompanyRecord>, ServiceError> {
        let user = models::user::Entity::find_by_id(owner_id)
            .filter(models::user::Column::Role.eq(models::user::ROLE_COMPANY_OWNER))
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        let company_id = match user.and_then(|u| u.company_id) {
            Some(id) => id,
            None => return Ok(None),
        };
        self.find_company(company_id).await
    }

    async fn find_user(&self, id: i32) -> Result<Option<UserRecord>, ServiceError> {
        let found = models::user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(found.map(user_record))
    }

    async fn promote_to_owner(
        &self,
        user_id: i32,
        title: &str,
        description: &str,
    ) -> Result<CompanyRecord, ServiceError> {
        let txn = self.db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;

        let user = models::user::Entity::find_by_id(user_id)
            .one(&txn)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("user"))?;

        let company = models::company::ActiveModel {
            title: Set(title.to_string()),
            description: Set(description.to_string()),
            date_created: Set(Utc::now().into()),
            banner_url: Set(None),
            logo_url: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

        let mut am: models::user::ActiveModel = user.into();
        am.role = Set(models::user::ROLE_COMPANY_OWNER.to_string());
        am.company_id = Set(Some(company.id));
        am.update(&txn).await.map_err(|e| ServiceError::Db(e.to_string()))?;

        txn.commit().await.map_err(|e| ServiceError::Persistence(e.to_string()))?;
        Ok(company_record(company))
    }

    async fn set_asset_url(
        &self,
        company_id: i32,
        kind: AssetKind,
        url: &str,
    ) -> Result<(), ServiceError> {
        let company = models::company::Entity::find_by_id(company_id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("company"))?;
        let mut am: models::company::ActiveModel = company.into();
        match kind {
            AssetKind::Banner => am.banner_url = Set(Some(url.to_string())),
            AssetKind::Logo => am.logo_url = Set(Some(url.to_string())),
        }
        am.update(&self.db)
            .await
            .map_err(|e| ServiceError::Persistence(e.to_string()))?;
        Ok(())
    }

    async fn list_companies(&self) -> Result<Vec<CompanyRecord>, ServiceError> {
        let companies = models::company::Entity::find()
            .order_by_asc(models::company::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(companies.into_iter().map(company_record).collect())
    }

    async fn list_products(
        &self,
        company_id: i32,
    ) -> Result<Option<Vec<ProductRecord>>, ServiceError> {
        if self.find_company(company_id).await?.is_none() {
            return Ok(None);
        }

        let products = models::product::Entity::find()
            .filter(models::product::Column::CompanyId.eq(company_id))
            .order_by_asc(models::product::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;

        let videos = products
            .load_one(models::video::Entity, &self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        let genres = products
            .load_one(models::genre::Entity, &self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        let images = products
            .load_many(models::product_image::Entity, &self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        let socials = products
            .load_many(models::social_network::Entity, &self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;

        let records = products
            .into_iter()
            .zip(videos)
            .zip(genres)
            .zip(images)
            .zip(socials)
            .map(|((((product, video), genre), mut images), socials)| {
                images.sort_by_key(|img| img.position);
                ProductRecord {
                    id: product.id,
                    title: product.title,
                    description: product.description,
                    genre: genre.map(|g| g.name),
                    video_url: video.map(|v| v.url),
                    images: images.into_iter().map(|img| img.url).collect(),
                    social_networks: socials
                        .into_iter()
                        .map(|s| SocialLink { name: s.name, url: s.url })
                        .collect(),
                }
            })
            .collect();
        Ok(Some(records))
    }
}

/// Seedable in-memory store for service tests.
pub mod mock {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MockCompanyStore {
        users: Mutex<HashMap<i32, UserRecord>>,
        companies: Mutex<BTreeMap<i32, CompanyRecord>>,
        products: Mutex<HashMap<i32, Vec<ProductRecord>>>,
        next_company_id: AtomicI32,
        /// While set, `set_asset_url` fails with `ServiceError::Persistence`.
        pub fail_set_url: AtomicBool,
    }

    impl MockCompanyStore {
        pub fn seed_user(&self, user: UserRecord) {
            self.users.lock().unwrap().insert(user.id, user);
        }

        pub fn seed_company(&self, company: CompanyRecord) {
            self.next_company_id.fetch_max(company.id, Ordering::SeqCst);
            self.companies.lock().unwrap().insert(company.id, company);
        }

        pub fn seed_products(&self, company_id: i32, products: Vec<ProductRecord>) {
            self.products.lock().unwrap().insert(company_id, products);
        }

        pub fn company(&self, id: i32) -> Option<CompanyRecord> {
            self.companies.lock().unwrap().get(&id).cloned()
        }

        pub fn user(&self, id: i32) -> Option<UserRecord> {
            self.users.lock().unwrap().get(&id).cloned()
        }
    }

    #[async_trait]
    impl CompanyStore for MockCompanyStore {
        async fn find_company(&self, id: i32) -> Result<Option<CompanyRecord>, ServiceError> {
            Ok(self.companies.lock().unwrap().get(&id).cloned())
        }

        async fn find_owned_company(
            &self,
            owner_id: i32,
        ) -> Result<Option<CompanyRecord>, ServiceError> {
            let company_id = {
                let users = self.users.lock().unwrap();
                match users.get(&owner_id) {
                    Some(u) if u.role == models::user::ROLE_COMPANY_OWNER => u.company_id,
                    _ => None,
                }
            };
            match company_id {
                Some(id) => self.find_company(id).await,
                None => Ok(None),
            }
        }

        async fn find_user(&self, id: i32) -> Result<Option<UserRecord>, ServiceError> {
            Ok(self.users.lock().unwrap().get(&id).cloned())
        }

        async fn promote_to_owner(
            &self,
            user_id: i32,
            title: &str,
            description: &str,
        ) -> Result<CompanyRecord, ServiceError> {
            let mut users = self.users.lock().unwrap();
            let user = users
                .get_mut(&user_id)
                .ok_or_else(|| ServiceError::not_found("user"))?;
            let id = self.next_company_id.fetch_add(1, Ordering::SeqCst) + 1;
            let company = CompanyRecord {
                id,
                title: title.to_string(),
                description: description.to_string(),
                date_created: Utc::now(),
                banner_url: None,
                logo_url: None,
            };
            user.role = models::user::ROLE_COMPANY_OWNER.to_string();
            user.company_id = Some(id);
            self.companies.lock().unwrap().insert(id, company.clone());
            Ok(company)
        }

        async fn set_asset_url(
            &self,
            company_id: i32,
            kind: AssetKind,
            url: &str,
        ) -> Result<(), ServiceError> {
            if self.fail_set_url.load(Ordering::SeqCst) {
                return Err(ServiceError::Persistence("commit failed".into()));
            }
            let mut companies = self.companies.lock().unwrap();
            let company = companies
                .get_mut(&company_id)
                .ok_or_else(|| ServiceError::not_found("company"))?;
            match kind {
                AssetKind::Banner => company.banner_url = Some(url.to_string()),
                AssetKind::Logo => company.logo_url = Some(url.to_string()),
            }
            Ok(())
        }

        async fn list_companies(&self) -> Result<Vec<CompanyRecord>, ServiceError> {
            Ok(self.companies.lock().unwrap().values().cloned().collect())
        }

        async fn list_products(
            &self,
            company_id: i32,
        ) -> Result<Option<Vec<ProductRecord>>, ServiceError> {
            if !self.companies.lock().unwrap().contains_key(&company_id) {
                return Ok(None);
            }
            Ok(Some(
                self.products.lock().unwrap().get(&company_id).cloned().unwrap_or_default(),
            ))
        }
    }
}

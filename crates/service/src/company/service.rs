use std::sync::Arc;

use tracing::{info, instrument};

use super::domain::{CompanyRecord, ProductRecord};
use super::store::CompanyStore;
use crate::assets::{AssetKind, AssetRepository};
use crate::errors::ServiceError;

/// Aggregate service for companies: the only component allowed to mutate a
/// company's asset pointers. Orchestrates ownership verification, blob
/// replacement and derived-URL persistence as one logical unit of work.
pub struct CompanyService<S: CompanyStore, A: AssetRepository> {
    store: Arc<S>,
    assets: Arc<A>,
    base_address: String,
}

impl<S, A> CompanyService<S, A>
where
    S: CompanyStore + 'static,
    A: AssetRepository + 'static,
{
    pub fn new(store: Arc<S>, assets: Arc<A>, base_address: impl Into<String>) -> Self {
        Self { store, assets, base_address: base_address.into() }
    }

    /// Deterministic, reconstructible URL for a company asset.
    pub fn asset_url(&self, company_id: i32, kind: AssetKind) -> String {
        format!("{}/api/Company/{}/{}", self.base_address, company_id, kind.file_name())
    }

    pub async fn replace_banner(&self, caller_id: i32, bytes: Vec<u8>) -> Result<String, ServiceError> {
        self.replace_asset(caller_id, AssetKind::Banner, bytes).await
    }

    pub async fn replace_logo(&self, caller_id: i32, bytes: Vec<u8>) -> Result<String, ServiceError> {
        self.replace_asset(caller_id, AssetKind::Logo, bytes).await
    }

    /// Replace one of the caller's company assets.
    ///
    /// Ownership is verified first; the caller can only ever act on their own
    /// company. The old blob is deleted unconditionally before the new one is
    /// written, and the URL pointer is persisted last: a failure anywhere
    /// before that final step leaves the stored URL unchanged. If the write
    /// fails after the delete, the old blob is already gone (accepted gap).
    ///
    /// Two concurrent replaces for the same company are not serialized; the
    /// last persisted URL wins.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn replace_asset(
        &self,
        caller_id: i32,
        kind: AssetKind,
        bytes: Vec<u8>,
    ) -> Result<String, ServiceError> {
        let company = self
            .store
            .find_owned_company(caller_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("caller owns no company".into()))?;

        let company_id = company.id;
        let url = self.asset_url(company_id, kind);
        info!(
            company_id,
            kind = kind.slug(),
            event = "asset_replace_started",
            "replacing company asset"
        );

        // Detached task: once the old blob is deleted, a client disconnect
        // must not abandon the replace mid-flight.
        let store = Arc::clone(&self.store);
        let assets = Arc::clone(&self.assets);
        let task_url = url.clone();
        let task = tokio::spawn(async move {
            assets.delete(&company.title, company_id, kind).await?;
            assets.put(&bytes, &company.title, company_id, kind).await?;
            store.set_asset_url(company_id, kind, &task_url).await?;
            Ok::<_, ServiceError>(())
        });
        task.await
            .map_err(|e| ServiceError::Storage(format!("replace task failed: {e}")))??;

        info!(company_id, kind = kind.slug(), event = "asset_replaced", "asset replaced");
        Ok(url)
    }

    pub async fn banner_bytes(&self, company_id: i32) -> Result<Vec<u8>, ServiceError> {
        self.asset_bytes(company_id, AssetKind::Banner).await
    }

    pub async fn logo_bytes(&self, company_id: i32) -> Result<Vec<u8>, ServiceError> {
        self.asset_bytes(company_id, AssetKind::Logo).await
    }

    /// Public read; requires no authentication.
    pub async fn asset_bytes(&self, company_id: i32, kind: AssetKind) -> Result<Vec<u8>, ServiceError> {
        let company = self
            .store
            .find_company(company_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("company"))?;
        let bytes = self.assets.get(&company.title, company.id, kind).await?;
        bytes.ok_or_else(|| {
            ServiceError::NotFound(format!("company {} has no {}", company_id, kind.slug()))
        })
    }

    /// Promote the caller's base-user identity to a company owner, attaching
    /// a brand-new company. The caller's primary key is preserved so
    /// authentication keeps resolving to the same identity.
    ///
    /// Whether a caller who already owns a company should be rejected is
    /// ambiguous upstream; no such check is made here, a repeat call relinks
    /// the caller to a fresh company.
    #[instrument(skip(self, description))]
    pub async fn create_company_from_user(
        &self,
        caller_id: i32,
        title: &str,
        description: &str,
    ) -> Result<CompanyRecord, ServiceError> {
        self.store
            .find_user(caller_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user"))?;
        let company = self.store.promote_to_owner(caller_id, title, description).await?;
        info!(
            company_id = company.id,
            owner_id = caller_id,
            event = "company_created",
            "company created from user"
        );
        Ok(company)
    }

    /// No filtering or pagination; intended for small catalogs.
    pub async fn list_companies(&self) -> Result<Vec<CompanyRecord>, ServiceError> {
        self.store.list_companies().await
    }

    pub async fn list_company_products(
        &self,
        company_id: i32,
    ) -> Result<Vec<ProductRecord>, ServiceError> {
        self.store
            .list_products(company_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("company"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::assets::repository::mock::MemoryAssetRepository;
    use crate::company::domain::UserRecord;
    use crate::company::store::mock::MockCompanyStore;

    const BASE: &str = "http://localhost:5000";

    fn service(
        store: Arc<MockCompanyStore>,
        assets: Arc<MemoryAssetRepository>,
    ) -> CompanyService<MockCompanyStore, MemoryAssetRepository> {
        CompanyService::new(store, assets, BASE)
    }

    fn base_user(id: i32) -> UserRecord {
        UserRecord {
            id,
            username: format!("user{}", id),
            role: models::user::ROLE_BASE.to_string(),
            company_id: None,
        }
    }

    fn owner_with_company(store: &MockCompanyStore, user_id: i32, company_id: i32, title: &str) {
        store.seed_user(UserRecord {
            id: user_id,
            username: format!("owner{}", user_id),
            role: models::user::ROLE_COMPANY_OWNER.to_string(),
            company_id: Some(company_id),
        });
        store.seed_company(crate::company::domain::CompanyRecord {
            id: company_id,
            title: title.to_string(),
            description: "desc".into(),
            date_created: Utc::now(),
            banner_url: None,
            logo_url: None,
        });
    }

    #[tokio::test]
    async fn replace_banner_then_read_returns_exact_bytes() {
        let store = Arc::new(MockCompanyStore::default());
        let assets = Arc::new(MemoryAssetRepository::default());
        owner_with_company(&store, 1, 10, "Acme");
        let svc = service(store, Arc::clone(&assets));

        let payload = vec![1u8, 2, 3, 4];
        svc.replace_banner(1, payload.clone()).await.unwrap();
        assert_eq!(svc.banner_bytes(10).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn double_replace_keeps_only_second_payload() {
        let store = Arc::new(MockCompanyStore::default());
        let assets = Arc::new(MemoryAssetRepository::default());
        owner_with_company(&store, 1, 10, "Acme");
        let svc = service(store, Arc::clone(&assets));

        svc.replace_banner(1, b"first".to_vec()).await.unwrap();
        svc.replace_banner(1, b"second".to_vec()).await.unwrap();

        assert_eq!(svc.banner_bytes(10).await.unwrap(), b"second".to_vec());
        // Replace, not append: exactly one live blob
        assert_eq!(assets.blob_count(), 1);
    }

    #[tokio::test]
    async fn unset_banner_reads_as_not_found_not_empty() {
        let store = Arc::new(MockCompanyStore::default());
        let assets = Arc::new(MemoryAssetRepository::default());
        owner_with_company(&store, 1, 10, "Acme");
        let svc = service(store, assets);

        let err = svc.banner_bytes(10).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn missing_company_reads_as_not_found() {
        let store = Arc::new(MockCompanyStore::default());
        let assets = Arc::new(MemoryAssetRepository::default());
        let svc = service(store, assets);

        let err = svc.logo_bytes(99).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn promotion_preserves_identity_key() {
        let store = Arc::new(MockCompanyStore::default());
        let assets = Arc::new(MemoryAssetRepository::default());
        store.seed_user(base_user(7));
        let svc = service(Arc::clone(&store), assets);

        let company = svc.create_company_from_user(7, "Acme", "widgets").await.unwrap();

        let owner = store.user(7).unwrap();
        assert_eq!(owner.id, 7, "primary key must survive promotion");
        assert_eq!(owner.role, models::user::ROLE_COMPANY_OWNER);
        assert_eq!(owner.company_id, Some(company.id));

        let listed = svc.list_companies().await.unwrap();
        assert!(listed.iter().any(|c| c.id == company.id && c.title == "Acme"));
    }

    #[tokio::test]
    async fn create_company_scenario_acme() {
        let store = Arc::new(MockCompanyStore::default());
        let assets = Arc::new(MemoryAssetRepository::default());
        store.seed_user(base_user(7));
        let svc = service(store, assets);

        let company = svc.create_company_from_user(7, "Acme", "widgets").await.unwrap();
        assert!(company.banner_url.is_none() && company.logo_url.is_none());

        let listed = svc.list_companies().await.unwrap();
        assert!(listed.iter().any(|c| c.title == "Acme"));

        // No products yet: empty sequence, not an error
        let products = svc.list_company_products(company.id).await.unwrap();
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn create_company_unknown_caller_is_not_found() {
        let store = Arc::new(MockCompanyStore::default());
        let assets = Arc::new(MemoryAssetRepository::default());
        let svc = service(store, assets);

        let err = svc.create_company_from_user(999, "Ghost", "none").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn non_owner_replace_is_not_found_and_repo_untouched() {
        let store = Arc::new(MockCompanyStore::default());
        let assets = Arc::new(MemoryAssetRepository::default());
        store.seed_user(base_user(5));
        let svc = service(store, Arc::clone(&assets));

        for kind in [AssetKind::Banner, AssetKind::Logo] {
            let err = svc.replace_asset(5, kind, b"data".to_vec()).await.unwrap_err();
            assert!(matches!(err, ServiceError::NotFound(_)));
        }

        use std::sync::atomic::Ordering;
        assert_eq!(assets.get_calls.load(Ordering::SeqCst), 0);
        assert_eq!(assets.delete_calls.load(Ordering::SeqCst), 0);
        assert_eq!(assets.put_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delete_io_failure_aborts_before_write() {
        use std::sync::atomic::Ordering;

        let store = Arc::new(MockCompanyStore::default());
        let assets = Arc::new(MemoryAssetRepository::default());
        owner_with_company(&store, 1, 10, "Acme");
        let svc = service(Arc::clone(&store), Arc::clone(&assets));

        assets.fail_delete.store(true, Ordering::SeqCst);
        let err = svc.replace_banner(1, b"new".to_vec()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)), "got {err:?}");

        // Aborted before the write phase; the URL pointer never moved
        assert_eq!(assets.put_calls.load(Ordering::SeqCst), 0);
        assert!(store.company(10).unwrap().banner_url.is_none());
    }

    #[tokio::test]
    async fn put_io_failure_keeps_stored_url() {
        use std::sync::atomic::Ordering;

        let store = Arc::new(MockCompanyStore::default());
        let assets = Arc::new(MemoryAssetRepository::default());
        owner_with_company(&store, 1, 10, "Acme");
        let svc = service(Arc::clone(&store), Arc::clone(&assets));

        let url = svc.replace_banner(1, b"old".to_vec()).await.unwrap();

        assets.fail_put.store(true, Ordering::SeqCst);
        let err = svc.replace_banner(1, b"new".to_vec()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)), "got {err:?}");

        // The old blob is already gone (accepted gap), but the stored URL
        // keeps its pre-request value because persist never ran
        assert_eq!(store.company(10).unwrap().banner_url, Some(url));
        assert!(matches!(svc.banner_bytes(10).await.unwrap_err(), ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn persist_failure_surfaces_and_leaves_pointer() {
        use std::sync::atomic::Ordering;

        let store = Arc::new(MockCompanyStore::default());
        let assets = Arc::new(MemoryAssetRepository::default());
        owner_with_company(&store, 1, 10, "Acme");
        let svc = service(Arc::clone(&store), Arc::clone(&assets));

        store.fail_set_url.store(true, Ordering::SeqCst);
        let err = svc.replace_banner(1, b"fresh".to_vec()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Persistence(_)), "got {err:?}");

        // Blob written but unreferenced until a retry repoints the URL
        assert!(store.company(10).unwrap().banner_url.is_none());
        assert_eq!(assets.blob_count(), 1);
    }

    #[tokio::test]
    async fn logo_scenario_company_three() {
        let store = Arc::new(MockCompanyStore::default());
        let assets = Arc::new(MemoryAssetRepository::default());
        owner_with_company(&store, 30, 3, "Trio");
        let svc = service(Arc::clone(&store), assets);

        let err = svc.logo_bytes(3).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let payload = vec![9u8; 10];
        svc.replace_logo(30, payload.clone()).await.unwrap();

        assert_eq!(svc.logo_bytes(3).await.unwrap(), payload);
        assert_eq!(
            store.company(3).unwrap().logo_url.as_deref(),
            Some("http://localhost:5000/api/Company/3/logo.jpg")
        );
        // Banner slot untouched
        assert!(store.company(3).unwrap().banner_url.is_none());
    }

    #[tokio::test]
    async fn empty_payload_rejected_after_old_blob_deleted() {
        let store = Arc::new(MockCompanyStore::default());
        let assets = Arc::new(MemoryAssetRepository::default());
        owner_with_company(&store, 1, 10, "Acme");
        let svc = service(Arc::clone(&store), assets);

        let url = svc.replace_banner(1, b"old".to_vec()).await.unwrap();

        let err = svc.replace_banner(1, Vec::new()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidAsset(_)));

        // The delete already ran: the old blob is gone (accepted gap), but
        // the stored URL is unchanged because persist never happened.
        assert!(matches!(svc.banner_bytes(10).await.unwrap_err(), ServiceError::NotFound(_)));
        assert_eq!(store.company(10).unwrap().banner_url, Some(url));
    }

    // Concurrent replaces for one company are deliberately not serialized
    // (no request-level locking); callers get "last persisted URL wins" and
    // nothing stronger. This test pins the sequential-interleaving outcome.
    #[tokio::test]
    async fn last_replace_wins_without_serialization() {
        let store = Arc::new(MockCompanyStore::default());
        let assets = Arc::new(MemoryAssetRepository::default());
        owner_with_company(&store, 1, 10, "Acme");
        let svc = Arc::new(service(Arc::clone(&store), Arc::clone(&assets)));

        let a = Arc::clone(&svc);
        let b = Arc::clone(&svc);
        let (ra, rb) = tokio::join!(
            a.replace_banner(1, b"from-a".to_vec()),
            b.replace_banner(1, b"from-b".to_vec()),
        );
        ra.unwrap();
        rb.unwrap();

        let settled = svc.banner_bytes(10).await.unwrap();
        assert!(settled == b"from-a".to_vec() || settled == b"from-b".to_vec());
        assert_eq!(assets.blob_count(), 1);
    }

    #[tokio::test]
    async fn products_for_unknown_company_is_not_found() {
        let store = Arc::new(MockCompanyStore::default());
        let assets = Arc::new(MemoryAssetRepository::default());
        let svc = service(store, assets);

        let err = svc.list_company_products(404).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn products_carry_their_media() {
        use crate::company::domain::{ProductRecord, SocialLink};

        let store = Arc::new(MockCompanyStore::default());
        let assets = Arc::new(MemoryAssetRepository::default());
        owner_with_company(&store, 1, 10, "Acme");
        store.seed_products(
            10,
            vec![ProductRecord {
                id: 100,
                title: "Widget Quest".into(),
                description: "a game".into(),
                genre: Some("Arcade".into()),
                video_url: Some("https://cdn.example.com/trailer.mp4".into()),
                images: vec!["one.jpg".into(), "two.jpg".into()],
                social_networks: vec![SocialLink {
                    name: "x".into(),
                    url: "https://x.example.com/widget".into(),
                }],
            }],
        );
        let svc = service(store, assets);

        let products = svc.list_company_products(10).await.unwrap();
        assert_eq!(products.len(), 1);
        let p = &products[0];
        assert_eq!(p.genre.as_deref(), Some("Arcade"));
        assert_eq!(p.images, vec!["one.jpg".to_string(), "two.jpg".to_string()]);
        assert_eq!(p.social_networks.len(), 1);
    }
}

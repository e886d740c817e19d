use async_trait::async_trait;

use crate::errors::AssetError;

/// The two image slots a company owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Banner,
    Logo,
}

impl AssetKind {
    /// File name under the company directory; also the final URL segment.
    pub fn file_name(&self) -> &'static str {
        match self {
            AssetKind::Banner => "banner.jpg",
            AssetKind::Logo => "logo.jpg",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            AssetKind::Banner => "banner",
            AssetKind::Logo => "logo",
        }
    }
}

/// Replaceable byte-blob storage addressed by `(companyId, companyTitle, kind)`.
///
/// The id alone is the identity key; the title only keeps storage
/// human-browsable and may go stale if titles are edited elsewhere.
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Absent is `Ok(None)`, never an error; an unreachable medium is
    /// `Err(AssetError::Io)` and must not be conflated with absent.
    async fn get(
        &self,
        company_title: &str,
        company_id: i32,
        kind: AssetKind,
    ) -> Result<Option<Vec<u8>>, AssetError>;

    /// Overwrites whatever is stored under the key. Callers that need strict
    /// replace-not-merge semantics delete first.
    async fn put(
        &self,
        bytes: &[u8],
        company_title: &str,
        company_id: i32,
        kind: AssetKind,
    ) -> Result<(), AssetError>;

    /// Idempotent; deleting an absent blob succeeds.
    async fn delete(
        &self,
        company_title: &str,
        company_id: i32,
        kind: AssetKind,
    ) -> Result<(), AssetError>;
}

/// In-memory repository for service tests. Counts calls so tests can assert
/// the repository was (or was not) touched.
pub mod mock {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    pub struct MemoryAssetRepository {
        blobs: Mutex<HashMap<(i32, AssetKind), Vec<u8>>>,
        max_bytes: usize,
        pub get_calls: AtomicUsize,
        pub put_calls: AtomicUsize,
        pub delete_calls: AtomicUsize,
        /// While set, `delete` fails with `AssetError::Io`.
        pub fail_delete: AtomicBool,
        /// While set, `put` fails with `AssetError::Io`.
        pub fail_put: AtomicBool,
    }

    impl Default for MemoryAssetRepository {
        fn default() -> Self {
            Self::with_max_bytes(usize::MAX)
        }
    }

    impl MemoryAssetRepository {
        pub fn with_max_bytes(max_bytes: usize) -> Self {
            Self {
                blobs: Mutex::new(HashMap::new()),
                max_bytes,
                get_calls: AtomicUsize::new(0),
                put_calls: AtomicUsize::new(0),
                delete_calls: AtomicUsize::new(0),
                fail_delete: AtomicBool::new(false),
                fail_put: AtomicBool::new(false),
            }
        }

        pub fn blob_count(&self) -> usize {
            self.blobs.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AssetRepository for MemoryAssetRepository {
        async fn get(
            &self,
            _company_title: &str,
            company_id: i32,
            kind: AssetKind,
        ) -> Result<Option<Vec<u8>>, AssetError> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.blobs.lock().unwrap().get(&(company_id, kind)).cloned())
        }

        async fn put(
            &self,
            bytes: &[u8],
            _company_title: &str,
            company_id: i32,
            kind: AssetKind,
        ) -> Result<(), AssetError> {
            self.put_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_put.load(Ordering::SeqCst) {
                return Err(AssetError::Io("asset medium unreachable".into()));
            }
            if bytes.is_empty() {
                return Err(AssetError::Invalid("empty payload".into()));
            }
            if bytes.len() > self.max_bytes {
                return Err(AssetError::Invalid(format!(
                    "payload of {} bytes exceeds cap of {}",
                    bytes.len(),
                    self.max_bytes
                )));
            }
            self.blobs.lock().unwrap().insert((company_id, kind), bytes.to_vec());
            Ok(())
        }

        async fn delete(
            &self,
            _company_title: &str,
            company_id: i32,
            kind: AssetKind,
        ) -> Result<(), AssetError> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(AssetError::Io("asset medium unreachable".into()));
            }
            self.blobs.lock().unwrap().remove(&(company_id, kind));
            Ok(())
        }
    }
}

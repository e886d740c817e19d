use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::repository::{AssetKind, AssetRepository};
use crate::errors::AssetError;

/// Filesystem-backed asset repository.
///
/// Each company gets one directory named `<id>_<slug-of-title>`; the slug is
/// a best-effort debug aid and lookups resolve by the numeric id prefix, so a
/// directory created under an old title still resolves after a rename.
pub struct FsAssetRepository {
    root: PathBuf,
    max_bytes: usize,
}

impl FsAssetRepository {
    pub fn new<P: Into<PathBuf>>(root: P, max_bytes: usize) -> Self {
        Self { root: root.into(), max_bytes }
    }

    fn slugify(title: &str) -> String {
        let mut out = String::with_capacity(title.len());
        let mut last_dash = true;
        for c in title.chars() {
            if c.is_ascii_alphanumeric() {
                out.push(c.to_ascii_lowercase());
                last_dash = false;
            } else if !last_dash {
                out.push('-');
                last_dash = true;
            }
        }
        while out.ends_with('-') {
            out.pop();
        }
        if out.is_empty() {
            out.push_str("company");
        }
        out
    }

    fn dir_name(company_title: &str, company_id: i32) -> String {
        format!("{}_{}", company_id, Self::slugify(company_title))
    }

    /// Find the company's directory by its id prefix, ignoring the slug.
    async fn resolve_dir(&self, company_id: i32) -> Result<Option<PathBuf>, AssetError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AssetError::Io(e.to_string())),
        };
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => return Ok(None),
                Err(e) => return Err(AssetError::Io(e.to_string())),
            };
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some((prefix, _)) = name.split_once('_') {
                if prefix.parse::<i32>() == Ok(company_id) {
                    return Ok(Some(entry.path()));
                }
            }
        }
    }
}

#[async_trait]
impl AssetRepository for FsAssetRepository {
    async fn get(
        &self,
        _company_title: &str,
        company_id: i32,
        kind: AssetKind,
    ) -> Result<Option<Vec<u8>>, AssetError> {
        let dir = match self.resolve_dir(company_id).await? {
            Some(dir) => dir,
            None => return Ok(None),
        };
        match fs::read(dir.join(kind.file_name())).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AssetError::Io(e.to_string())),
        }
    }

    async fn put(
        &self,
        bytes: &[u8],
        company_title: &str,
        company_id: i32,
        kind: AssetKind,
    ) -> Result<(), AssetError> {
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
        // Reuse the existing directory even when the title has drifted; a
        // fresh name here would split one company's blobs across two dirs.
        let dir = match self.resolve_dir(company_id).await? {
            Some(dir) => dir,
            None => self.root.join(Self::dir_name(company_title, company_id)),
        };
        fs::create_dir_all(&dir).await.map_err(|e| AssetError::Io(e.to_string()))?;
        fs::write(dir.join(kind.file_name()), bytes)
            .await
            .map_err(|e| AssetError::Io(e.to_string()))
    }

    async fn delete(
        &self,
        _company_title: &str,
        company_id: i32,
        kind: AssetKind,
    ) -> Result<(), AssetError> {
        let dir = match self.resolve_dir(company_id).await? {
            Some(dir) => dir,
            None => return Ok(()),
        };
        match fs::remove_file(dir.join(kind.file_name())).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AssetError::Io(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_repo(max_bytes: usize) -> (FsAssetRepository, PathBuf) {
        let root = std::env::temp_dir().join(format!("company_assets_{}", uuid::Uuid::new_v4()));
        (FsAssetRepository::new(&root, max_bytes), root)
    }

    #[tokio::test]
    async fn put_then_get_returns_exact_bytes() -> Result<(), AssetError> {
        let (repo, root) = temp_repo(1024);
        repo.put(b"jpeg-bytes", "Acme", 1, AssetKind::Banner).await?;
        let got = repo.get("Acme", 1, AssetKind::Banner).await?;
        assert_eq!(got.as_deref(), Some(&b"jpeg-bytes"[..]));
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn get_absent_is_none_not_error() -> Result<(), AssetError> {
        let (repo, _root) = temp_repo(1024);
        assert!(repo.get("Nobody", 42, AssetKind::Logo).await?.is_none());
        // Root exists but company dir does not
        let (repo, root) = temp_repo(1024);
        repo.put(b"x", "Other", 7, AssetKind::Logo).await?;
        assert!(repo.get("Nobody", 42, AssetKind::Logo).await?.is_none());
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn delete_is_idempotent() -> Result<(), AssetError> {
        let (repo, root) = temp_repo(1024);
        repo.delete("Acme", 1, AssetKind::Banner).await?;
        repo.put(b"abc", "Acme", 1, AssetKind::Banner).await?;
        repo.delete("Acme", 1, AssetKind::Banner).await?;
        repo.delete("Acme", 1, AssetKind::Banner).await?;
        assert!(repo.get("Acme", 1, AssetKind::Banner).await?.is_none());
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn replace_does_not_accumulate_versions() -> Result<(), AssetError> {
        let (repo, root) = temp_repo(1024);
        repo.put(b"first", "Acme", 3, AssetKind::Logo).await?;
        repo.delete("Acme", 3, AssetKind::Logo).await?;
        repo.put(b"second", "Acme", 3, AssetKind::Logo).await?;
        assert_eq!(repo.get("Acme", 3, AssetKind::Logo).await?.as_deref(), Some(&b"second"[..]));

        // Exactly one file lives under the company's directory
        let dir = repo.resolve_dir(3).await?.expect("company dir");
        let mut count = 0;
        let mut entries = tokio::fs::read_dir(&dir).await.unwrap();
        while entries.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 1);
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn empty_and_oversized_payloads_rejected() {
        let (repo, _root) = temp_repo(8);
        let empty = repo.put(b"", "Acme", 1, AssetKind::Banner).await;
        assert!(matches!(empty, Err(AssetError::Invalid(_))));
        let oversized = repo.put(b"123456789", "Acme", 1, AssetKind::Banner).await;
        assert!(matches!(oversized, Err(AssetError::Invalid(_))));
    }

    #[tokio::test]
    async fn stale_title_still_resolves_by_id() -> Result<(), AssetError> {
        let (repo, root) = temp_repo(1024);
        repo.put(b"blob", "Old Name", 9, AssetKind::Banner).await?;
        // Title edited elsewhere; the id keeps resolving the old directory
        assert_eq!(
            repo.get("New Name", 9, AssetKind::Banner).await?.as_deref(),
            Some(&b"blob"[..])
        );
        repo.put(b"blob2", "New Name", 9, AssetKind::Banner).await?;
        assert_eq!(
            repo.get("whatever", 9, AssetKind::Banner).await?.as_deref(),
            Some(&b"blob2"[..])
        );
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[test]
    fn slugs_are_filesystem_safe() {
        assert_eq!(FsAssetRepository::slugify("Acme Widgets, Inc."), "acme-widgets-inc");
        assert_eq!(FsAssetRepository::slugify("  "), "company");
        assert_eq!(FsAssetRepository::slugify("Ünïcode"), "n-code");
    }
}

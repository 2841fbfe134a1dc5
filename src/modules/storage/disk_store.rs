//! Local disk blob store
//!
//! Key-addressed byte storage for uploaded file content. Keys look like
//! `{owner_id}/{uuid}.{ext}` and resolve to paths under the configured
//! uploads directory.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};

/// Key-addressed blob store over a local directory
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Create a new store, preparing the root directory if it doesn't exist
    pub async fn new(config: StorageConfig) -> Result<Self> {
        fs::create_dir_all(&config.root_dir).await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to create uploads directory '{}': {}",
                config.root_dir.display(),
                e
            ))
        })?;

        info!("Disk store initialized at {}", config.root_dir.display());

        Ok(Self {
            root: config.root_dir,
        })
    }

    /// Generate a storage key for a new blob: `{owner_id}/{uuid}.{ext}`
    ///
    /// The extension is taken from the original filename, `bin` when absent.
    pub fn generate_key(owner_id: &str, original_filename: &str) -> String {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .unwrap_or("bin");

        format!(
            "{}/{}.{}",
            sanitize_segment(owner_id),
            Uuid::new_v4(),
            sanitize_segment(extension)
        )
    }

    /// Resolve a key to a path under the root, rejecting traversal components
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || key
                .split('/')
                .any(|part| part.is_empty() || part == "." || part == ".." || part.contains('\\'))
        {
            return Err(AppError::BadRequest(format!(
                "Invalid storage key: '{}'",
                key
            )));
        }

        let mut path = self.root.clone();
        path.extend(key.split('/'));
        Ok(path)
    }

    /// Write blob content under the given key, creating parent directories
    pub async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Internal(format!("Failed to prepare storage path '{}': {}", key, e))
            })?;
        }

        fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write blob '{}': {}", key, e)))?;

        debug!("Wrote blob '{}' ({} bytes)", key, data.len());
        Ok(())
    }

    /// Read blob content by key
    pub async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;

        match fs::read(&path).await {
            Ok(data) => {
                debug!("Read blob '{}' ({} bytes)", key, data.len());
                Ok(data)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound("File content not found".to_string()))
            }
            Err(e) => Err(AppError::Internal(format!(
                "Failed to read blob '{}': {}",
                key, e
            ))),
        }
    }

    /// Delete a blob by key. Deleting a missing key is not an error.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted blob '{}'", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Blob '{}' already absent", key);
                Ok(())
            }
            Err(e) => Err(AppError::Internal(format!(
                "Failed to delete blob '{}': {}",
                key, e
            ))),
        }
    }

    /// Check whether a blob exists for the given key
    #[allow(dead_code)]
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;

        fs::try_exists(&path).await.map_err(|e| {
            AppError::Internal(format!("Failed to check blob '{}': {}", key, e))
        })
    }
}

/// Strip a key segment down to filesystem-safe characters
fn sanitize_segment(segment: &str) -> String {
    let cleaned: String = segment
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();

    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (tempfile::TempDir, DiskStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(StorageConfig {
            root_dir: dir.path().to_path_buf(),
        })
        .await
        .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn put_then_get_returns_content() {
        let (_dir, store) = temp_store().await;

        store.put("user-1/blob.txt", b"hello").await.unwrap();
        assert_eq!(store.get("user-1/blob.txt").await.unwrap(), b"hello");
        assert!(store.exists("user-1/blob.txt").await.unwrap());
    }

    #[tokio::test]
    async fn put_overwrites_existing_key() {
        let (_dir, store) = temp_store().await;

        store.put("user-1/blob.txt", b"first").await.unwrap();
        store.put("user-1/blob.txt", b"second, longer").await.unwrap();

        assert_eq!(
            store.get("user-1/blob.txt").await.unwrap(),
            b"second, longer"
        );
    }

    #[tokio::test]
    async fn get_missing_key_is_not_found() {
        let (_dir, store) = temp_store().await;

        assert!(matches!(
            store.get("user-1/missing.txt").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, store) = temp_store().await;

        store.put("user-1/blob.txt", b"hello").await.unwrap();
        store.delete("user-1/blob.txt").await.unwrap();
        store.delete("user-1/blob.txt").await.unwrap();

        assert!(!store.exists("user-1/blob.txt").await.unwrap());
    }

    #[tokio::test]
    async fn rejects_traversal_keys() {
        let (_dir, store) = temp_store().await;

        for key in ["../evil", "a/../../evil", "", "a//b", "./a", "a\\b"] {
            assert!(
                matches!(store.get(key).await, Err(AppError::BadRequest(_))),
                "key '{}' should be rejected",
                key
            );
        }
    }

    #[test]
    fn generated_keys_are_scoped_to_owner() {
        let key = DiskStore::generate_key("user-1", "report.pdf");
        assert!(key.starts_with("user-1/"));
        assert!(key.ends_with(".pdf"));
    }

    #[test]
    fn generated_keys_sanitize_hostile_segments() {
        let key = DiskStore::generate_key("../etc", "x.sh/../..");
        assert!(key.starts_with("etc/"));
        assert!(!key.contains(".."));

        let fallback = DiskStore::generate_key("///", "noext");
        assert!(fallback.starts_with("unknown/"));
        assert!(fallback.ends_with(".bin"));
    }
}

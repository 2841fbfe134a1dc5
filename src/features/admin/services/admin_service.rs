use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::FileResponseDto;
use crate::features::files::models::File;
use crate::features::files::services::to_responses;
use crate::modules::storage::DiskStore;

/// Service for admin file inspection and deletion.
///
/// Admin operations skip the per-file access rules entirely: listings are
/// unrestricted and deletion applies to any record.
pub struct AdminService {
    pool: PgPool,
    store: Arc<DiskStore>,
}

impl AdminService {
    pub fn new(pool: PgPool, store: Arc<DiskStore>) -> Self {
        Self { pool, store }
    }

    /// List every file record, owner identity included
    pub async fn list_all_files(&self) -> Result<Vec<FileResponseDto>> {
        let files = sqlx::query_as::<_, File>("SELECT * FROM files")
            .fetch_all(&self.pool)
            .await?;

        to_responses(&self.pool, files).await
    }

    /// List files owned by a specific user
    pub async fn list_files_by_owner(&self, owner_id: &str) -> Result<Vec<FileResponseDto>> {
        let files = sqlx::query_as::<_, File>("SELECT * FROM files WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        to_responses(&self.pool, files).await
    }

    /// Delete any file regardless of ownership or shares.
    ///
    /// The blob is removed afterwards, best-effort.
    pub async fn delete_file(&self, file_id: Uuid) -> Result<()> {
        let storage_key = sqlx::query_scalar::<_, String>(
            r#"
            DELETE FROM files
            WHERE id = $1
            RETURNING storage_key
            "#,
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        if let Err(e) = self.store.delete(&storage_key).await {
            warn!("Failed to delete blob '{}': {}", storage_key, e);
        }

        info!("File deleted by admin: id={}", file_id);
        Ok(())
    }
}

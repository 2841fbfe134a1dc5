use std::collections::HashMap;
use std::sync::Arc;

use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::access::{evaluate, AccessDecision, FileOperation};
use crate::features::files::dtos::FileResponseDto;
use crate::features::files::models::{normalize_email, File, FileShare, SharePermission};
use crate::modules::storage::DiskStore;

/// Content replacement input, one mode per request
pub enum ContentUpdate {
    /// New binary blob; the previous blob is deleted best-effort afterwards
    Replace { data: Vec<u8>, content_type: String },
    /// Raw text written over the existing stored blob
    Text { content: String },
}

/// Service for file records, sharing and content storage
pub struct FileService {
    pool: PgPool,
    store: Arc<DiskStore>,
}

impl FileService {
    pub fn new(pool: PgPool, store: Arc<DiskStore>) -> Self {
        Self { pool, store }
    }

    /// Upload a new file owned by the caller.
    ///
    /// The blob is written before the record is inserted, so a failure in
    /// between can orphan a blob but never produces a record without content.
    pub async fn upload(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        content_type: &str,
        owner: &AuthenticatedUser,
    ) -> Result<FileResponseDto> {
        let file_size = data.len() as i64;
        let file_id = Uuid::new_v4();
        let storage_key = DiskStore::generate_key(&owner.id, original_filename);

        self.store.put(&storage_key, &data).await?;
        debug!("Blob stored for upload: {}", storage_key);

        let file = sqlx::query_as::<_, File>(
            r#"
            INSERT INTO files (id, storage_key, original_filename, content_type, file_size, owner_id, owner_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(file_id)
        .bind(&storage_key)
        .bind(original_filename)
        .bind(content_type)
        .bind(file_size)
        .bind(&owner.id)
        .bind(owner.normalized_email())
        .fetch_one(&self.pool)
        .await?;

        info!(
            "File uploaded: id={}, key={}, size={}, owner={}",
            file.id, file.storage_key, file.file_size, file.owner_id
        );

        Ok(FileResponseDto::from_record(file, Vec::new()))
    }

    /// List files owned by the caller, most recent first
    pub async fn list_owned(&self, user: &AuthenticatedUser) -> Result<Vec<FileResponseDto>> {
        let files = sqlx::query_as::<_, File>(
            r#"
            SELECT * FROM files
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(&user.id)
        .fetch_all(&self.pool)
        .await?;

        to_responses(&self.pool, files).await
    }

    /// List files shared with the caller's email
    pub async fn list_shared_with(&self, user: &AuthenticatedUser) -> Result<Vec<FileResponseDto>> {
        let files = sqlx::query_as::<_, File>(
            r#"
            SELECT f.* FROM files f
            INNER JOIN file_shares s ON s.file_id = f.id
            WHERE s.email = $1
            "#,
        )
        .bind(user.normalized_email())
        .fetch_all(&self.pool)
        .await?;

        to_responses(&self.pool, files).await
    }

    /// Share a file with another user by email.
    ///
    /// Owner-only; for anyone else the file looks missing. Re-sharing an
    /// already-present email updates its permission in place; the upsert is a
    /// single atomic statement, so concurrent shares cannot lose entries.
    pub async fn share(
        &self,
        file_id: Uuid,
        user: &AuthenticatedUser,
        email: &str,
        permission: SharePermission,
    ) -> Result<FileResponseDto> {
        let (file, shares) = self.load_with_shares(file_id).await?;

        match evaluate(&file, &shares, user, FileOperation::Share) {
            AccessDecision::Allowed => {}
            _ => return Err(AppError::NotFound("File not found".to_string())),
        }

        let normalized = normalize_email(email);

        sqlx::query(
            r#"
            INSERT INTO file_shares (file_id, email, permission)
            VALUES ($1, $2, $3)
            ON CONFLICT (file_id, email)
            DO UPDATE SET permission = EXCLUDED.permission, updated_at = NOW()
            "#,
        )
        .bind(file.id)
        .bind(&normalized)
        .bind(permission)
        .execute(&self.pool)
        .await?;

        info!(
            "File shared: id={}, target={}, permission={:?}",
            file.id, normalized, permission
        );

        let shares = self.shares_for(file.id).await?;
        Ok(FileResponseDto::from_record(file, shares))
    }

    /// Replace or rewrite a file's content.
    ///
    /// Allowed for the owner, an admin, or a sharer with edit permission; a
    /// view-only sharer is rejected explicitly, anyone else sees not-found.
    /// Binary mode writes the new blob, updates the record, then deletes the
    /// old blob; old-blob deletion failure is a warning, never an error.
    pub async fn update_content(
        &self,
        file_id: Uuid,
        user: &AuthenticatedUser,
        update: ContentUpdate,
    ) -> Result<FileResponseDto> {
        let (file, shares) = self.load_with_shares(file_id).await?;

        match evaluate(&file, &shares, user, FileOperation::Edit) {
            AccessDecision::Allowed => {}
            AccessDecision::Denied => {
                return Err(AppError::Forbidden(
                    "Access denied. Edit permission required.".to_string(),
                ))
            }
            AccessDecision::Hidden => {
                return Err(AppError::NotFound("File not found".to_string()))
            }
        }

        let updated = match update {
            ContentUpdate::Replace { data, content_type } => {
                let new_key = DiskStore::generate_key(&file.owner_id, &file.original_filename);
                self.store.put(&new_key, &data).await?;

                let updated = sqlx::query_as::<_, File>(
                    r#"
                    UPDATE files
                    SET storage_key = $2, content_type = $3, file_size = $4, updated_at = NOW()
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(file.id)
                .bind(&new_key)
                .bind(&content_type)
                .bind(data.len() as i64)
                .fetch_one(&self.pool)
                .await?;

                // record now points at the new blob; the old one is cleanup only
                if let Err(e) = self.store.delete(&file.storage_key).await {
                    warn!(
                        "Failed to delete previous blob '{}': {}",
                        file.storage_key, e
                    );
                }

                info!(
                    "File content replaced: id={}, key={}, size={}",
                    updated.id, updated.storage_key, updated.file_size
                );
                updated
            }
            ContentUpdate::Text { content } => {
                let bytes = content.into_bytes();
                self.store.put(&file.storage_key, &bytes).await?;

                let updated = sqlx::query_as::<_, File>(
                    r#"
                    UPDATE files
                    SET file_size = $2, updated_at = NOW()
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(file.id)
                .bind(bytes.len() as i64)
                .fetch_one(&self.pool)
                .await?;

                info!(
                    "File content rewritten: id={}, key={}, size={}",
                    updated.id, updated.storage_key, updated.file_size
                );
                updated
            }
        };

        Ok(FileResponseDto::from_record(updated, shares))
    }

    /// Fetch a file's content for download.
    ///
    /// Visible to the owner, any sharer, or an admin; everyone else sees
    /// not-found.
    pub async fn download(
        &self,
        file_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<(FileResponseDto, Vec<u8>)> {
        let (file, shares) = self.load_with_shares(file_id).await?;

        match evaluate(&file, &shares, user, FileOperation::View) {
            AccessDecision::Allowed => {}
            _ => return Err(AppError::NotFound("File not found".to_string())),
        }

        let data = self.store.get(&file.storage_key).await?;
        Ok((FileResponseDto::from_record(file, shares), data))
    }

    /// Delete a file owned by the caller.
    ///
    /// Owner-only; a file owned by someone else looks missing, never
    /// forbidden. The delete statement itself stays scoped by owner, and the
    /// blob is removed afterwards, best-effort.
    pub async fn delete_owned(&self, file_id: Uuid, user: &AuthenticatedUser) -> Result<()> {
        let (file, shares) = self.load_with_shares(file_id).await?;

        match evaluate(&file, &shares, user, FileOperation::Delete) {
            AccessDecision::Allowed => {}
            _ => return Err(AppError::NotFound("File not found".to_string())),
        }

        let result = sqlx::query("DELETE FROM files WHERE id = $1 AND owner_id = $2")
            .bind(file_id)
            .bind(&user.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("File not found".to_string()));
        }

        if let Err(e) = self.store.delete(&file.storage_key).await {
            warn!("Failed to delete blob '{}': {}", file.storage_key, e);
        }

        info!("File deleted: id={}, owner={}", file_id, user.id);
        Ok(())
    }

    async fn load_with_shares(&self, file_id: Uuid) -> Result<(File, Vec<FileShare>)> {
        let file = sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        let shares = self.shares_for(file_id).await?;
        Ok((file, shares))
    }

    async fn shares_for(&self, file_id: Uuid) -> Result<Vec<FileShare>> {
        let shares =
            sqlx::query_as::<_, FileShare>("SELECT * FROM file_shares WHERE file_id = $1")
                .bind(file_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(shares)
    }
}

/// Attach share lists to a page of file records with one batched query
pub(crate) async fn to_responses(
    pool: &PgPool,
    files: Vec<File>,
) -> Result<Vec<FileResponseDto>> {
    if files.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = files.iter().map(|f| f.id).collect();
    let shares = sqlx::query_as::<_, FileShare>(
        "SELECT * FROM file_shares WHERE file_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_file: HashMap<Uuid, Vec<FileShare>> = HashMap::new();
    for share in shares {
        by_file.entry(share.file_id).or_default().push(share);
    }

    Ok(files
        .into_iter()
        .map(|file| {
            let shares = by_file.remove(&file.id).unwrap_or_default();
            FileResponseDto::from_record(file, shares)
        })
        .collect())
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Database model for file records
#[derive(Debug, Clone, FromRow)]
pub struct File {
    pub id: Uuid,
    pub storage_key: String,
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub owner_id: String,
    /// Uploader's email, captured from the token claims at creation so
    /// admin listings can show owner identity without a user store
    pub owner_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One share-list entry: grants `permission` on `file_id` to `email`.
///
/// `email` is stored lowercased; `(file_id, email)` is unique, so re-sharing
/// the same address updates the permission in place.
#[derive(Debug, Clone, FromRow)]
pub struct FileShare {
    pub file_id: Uuid,
    pub email: String,
    pub permission: SharePermission,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Permission granted by a share entry
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "share_permission", rename_all = "lowercase")]
pub enum SharePermission {
    #[default]
    View,
    Edit,
}

/// Canonical form for share-list emails: comparison and storage both use this
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_lowercases_and_trims() {
        assert_eq!(normalize_email("User@Example.Com"), "user@example.com");
        assert_eq!(normalize_email("  bob@x.com "), "bob@x.com");
        assert_eq!(normalize_email("already@lower.case"), "already@lower.case");
    }
}

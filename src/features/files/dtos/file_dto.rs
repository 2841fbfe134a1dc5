use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::files::models::{File, FileShare, SharePermission};

/// Maximum file size in bytes (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Owner identity attached to file responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OwnerDto {
    pub id: String,
    pub email: String,
}

/// One entry of a file's share list
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShareEntryDto {
    pub email: String,
    pub permission: SharePermission,
}

/// Response DTO for file records
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    /// Unique identifier for the file
    pub id: Uuid,
    /// Original filename as uploaded
    pub original_filename: String,
    /// MIME type of the file
    pub content_type: String,
    /// Size of the file in bytes
    pub file_size: i64,
    /// Identity of the uploader
    pub owner: OwnerDto,
    /// Users this file is shared with
    pub shared_with: Vec<ShareEntryDto>,
    /// Timestamp when the file was uploaded
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last metadata or content change
    pub updated_at: DateTime<Utc>,
}

impl FileResponseDto {
    pub fn from_record(file: File, shares: Vec<FileShare>) -> Self {
        Self {
            id: file.id,
            original_filename: file.original_filename,
            content_type: file.content_type,
            file_size: file.file_size,
            owner: OwnerDto {
                id: file.owner_id,
                email: file.owner_email,
            },
            shared_with: shares
                .into_iter()
                .map(|s| ShareEntryDto {
                    email: s.email,
                    permission: s.permission,
                })
                .collect(),
            created_at: file.created_at,
            updated_at: file.updated_at,
        }
    }
}

/// Request DTO for sharing a file with another user by email
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ShareFileDto {
    /// Email address of the user to share with
    #[validate(length(min = 1, message = "email is required"))]
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    /// Permission to grant (defaults to view)
    #[serde(default)]
    pub permission: SharePermission,
}

/// Request DTO for rewriting file content with raw text
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTextContentDto {
    /// New text content, written to the existing stored blob
    pub content: String,
}

/// Response DTO for delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileResponseDto {
    /// Confirmation that the file was deleted
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_dto_requires_email() {
        let dto = ShareFileDto {
            email: "".to_string(),
            permission: SharePermission::View,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn share_dto_rejects_malformed_email() {
        let dto = ShareFileDto {
            email: "not-an-email".to_string(),
            permission: SharePermission::Edit,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn share_dto_accepts_valid_email() {
        let dto = ShareFileDto {
            email: "bob@x.com".to_string(),
            permission: SharePermission::Edit,
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn share_permission_defaults_to_view() {
        let dto: ShareFileDto = serde_json::from_value(serde_json::json!({
            "email": "bob@x.com"
        }))
        .unwrap();

        assert_eq!(dto.permission, SharePermission::View);
    }
}

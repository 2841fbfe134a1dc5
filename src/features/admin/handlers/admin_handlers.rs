use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::admin::services::AdminService;
use crate::features::auth::guards::RequireAdmin;
use crate::features::files::dtos::{DeleteFileResponseDto, FileResponseDto};
use crate::shared::types::{ApiResponse, Meta};

/// List all files (admin)
#[utoipa::path(
    get,
    path = "/api/files/admin/all",
    tag = "admin",
    responses(
        (status = 200, description = "All file records with owner identity", body = ApiResponse<Vec<FileResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_all_files(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>> {
    let files = service.list_all_files().await?;
    let total = files.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(files),
        None,
        Some(Meta { total }),
    )))
}

/// List files owned by a specific user (admin)
#[utoipa::path(
    get,
    path = "/api/files/admin/users/{userId}",
    tag = "admin",
    params(
        ("userId" = String, Path, description = "Owner user id")
    ),
    responses(
        (status = 200, description = "Files owned by the user", body = ApiResponse<Vec<FileResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_user_files(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>> {
    let files = service.list_files_by_owner(&user_id).await?;
    let total = files.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(files),
        None,
        Some(Meta { total }),
    )))
}

/// Delete any file (admin)
///
/// Unconditional: no ownership or share check applies.
#[utoipa::path(
    delete,
    path = "/api/files/admin/{id}",
    tag = "admin",
    params(
        ("id" = Uuid, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File deleted", body = ApiResponse<DeleteFileResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_any_file(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteFileResponseDto>>> {
    service.delete_file(id).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteFileResponseDto { deleted: true }),
        Some("File deleted successfully".to_string()),
        None,
    )))
}

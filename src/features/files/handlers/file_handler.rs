use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    DeleteFileResponseDto, FileResponseDto, ShareFileDto, UpdateTextContentDto, MAX_FILE_SIZE,
};
use crate::features::files::services::{ContentUpdate, FileService};
use crate::shared::types::{ApiResponse, Meta};

/// Upload a file
///
/// Accepts multipart/form-data with a single `file` field. The caller
/// becomes the owner of the new record.
#[utoipa::path(
    post,
    path = "/api/files/upload",
    tag = "files",
    request_body(
        content = crate::features::files::dtos::UploadFileDto,
        content_type = "multipart/form-data",
        description = "File upload form",
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "No file uploaded or file too large"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponseDto>>), AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;

    // Process multipart fields
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let ct = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                let fname = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                file_data = Some(data.to_vec());
                file_name = Some(fname);
                content_type = Some(ct);
            }
            _ => {
                // Ignore unknown fields
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let file_data =
        file_data.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    let file_name =
        file_name.ok_or_else(|| AppError::Validation("Filename is required".to_string()))?;
    let content_type =
        content_type.ok_or_else(|| AppError::Validation("Content type is required".to_string()))?;

    // Validate file size
    if file_data.len() > MAX_FILE_SIZE {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} bytes ({} MB)",
            MAX_FILE_SIZE,
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let response = service
        .upload(file_data, &file_name, &content_type, &user)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(response), None, None)),
    ))
}

/// List the caller's own files, most recent first
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    responses(
        (status = 200, description = "Files owned by the caller", body = ApiResponse<Vec<FileResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_my_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>, AppError> {
    let files = service.list_owned(&user).await?;
    let total = files.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(files),
        None,
        Some(Meta { total }),
    )))
}

/// List files shared with the caller's email
#[utoipa::path(
    get,
    path = "/api/files/shared",
    tag = "files",
    responses(
        (status = 200, description = "Files shared with the caller", body = ApiResponse<Vec<FileResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_shared_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>, AppError> {
    let files = service.list_shared_with(&user).await?;
    let total = files.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(files),
        None,
        Some(Meta { total }),
    )))
}

/// Share a file with another user by email
///
/// Owner only. Sharing an email that already has access updates its
/// permission instead of adding a duplicate entry.
#[utoipa::path(
    post,
    path = "/api/files/share/{id}",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File id")
    ),
    request_body = ShareFileDto,
    responses(
        (status = 200, description = "File shared successfully", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Missing or invalid email"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn share_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ShareFileDto>,
) -> Result<Json<ApiResponse<FileResponseDto>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = service.share(id, &user, &dto.email, dto.permission).await?;

    Ok(Json(ApiResponse::success(
        Some(response),
        Some("File shared successfully".to_string()),
        None,
    )))
}

/// Replace or rewrite a file's content
///
/// Two mutually exclusive modes selected by the request shape: a
/// multipart/form-data body with a `file` field replaces the stored blob; a
/// JSON body with a `content` field rewrites the existing blob as text.
/// Requires owner, admin, or edit-permission share access.
#[utoipa::path(
    put,
    path = "/api/files/{id}/content",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File id")
    ),
    request_body = UpdateTextContentDto,
    responses(
        (status = 200, description = "File content updated", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "No content provided"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Edit permission required"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_file_content(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
    req: Request,
) -> Result<Json<ApiResponse<FileResponseDto>>, AppError> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false);

    let update = if is_multipart {
        let mut multipart = Multipart::from_request(req, &()).await.map_err(|e| {
            AppError::BadRequest(format!("Failed to read multipart data: {}", e))
        })?;

        let mut replacement: Option<ContentUpdate> = None;
        while let Some(field) = multipart.next_field().await.map_err(|e| {
            AppError::BadRequest(format!("Failed to read multipart data: {}", e))
        })? {
            if field.name() != Some("file") {
                debug!("Ignoring unknown field: {}", field.name().unwrap_or(""));
                continue;
            }

            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let data = field.bytes().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read file data: {}", e))
            })?;

            if data.len() > MAX_FILE_SIZE {
                return Err(AppError::BadRequest(format!(
                    "File too large. Maximum size is {} bytes ({} MB)",
                    MAX_FILE_SIZE,
                    MAX_FILE_SIZE / 1024 / 1024
                )));
            }

            replacement = Some(ContentUpdate::Replace {
                data: data.to_vec(),
                content_type,
            });
        }

        replacement.ok_or_else(|| {
            AppError::Validation("No content provided (file or text)".to_string())
        })?
    } else {
        let Json(dto) = Json::<UpdateTextContentDto>::from_request(req, &())
            .await
            .map_err(|_| {
                AppError::Validation("No content provided (file or text)".to_string())
            })?;

        ContentUpdate::Text {
            content: dto.content,
        }
    };

    let response = service.update_content(id, &user, update).await?;

    Ok(Json(ApiResponse::success(
        Some(response),
        Some("File content updated successfully".to_string()),
        None,
    )))
}

/// Download a file's content
///
/// Available to the owner, anyone the file is shared with, and admins.
#[utoipa::path(
    get,
    path = "/api/files/{id}/download",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File content"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (file, data) = service.download(id, &user).await?;

    let filename = file.original_filename.replace(['"', '\r', '\n'], "_");
    let headers = [
        (header::CONTENT_TYPE, file.content_type),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];

    Ok((headers, data).into_response())
}

/// Delete a file owned by the caller
///
/// Hard delete: the record and its stored content are both removed.
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File deleted successfully", body = ApiResponse<DeleteFileResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteFileResponseDto>>, AppError> {
    service.delete_owned(id, &user).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteFileResponseDto { deleted: true }),
        Some("File deleted successfully".to_string()),
        None,
    )))
}

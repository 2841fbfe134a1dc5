use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::features::files::dtos::MAX_FILE_SIZE;
use crate::features::files::handlers::{
    delete_file, download_file, list_my_files, list_shared_files, share_file, update_file_content,
    upload_file,
};
use crate::features::files::services::FileService;

/// Create routes for the files feature
pub fn routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route(
            "/api/files/upload",
            // Allow body size up to MAX_FILE_SIZE + buffer for multipart overhead
            post(upload_file).layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024)),
        )
        .route("/api/files", get(list_my_files))
        .route("/api/files/shared", get(list_shared_files))
        .route("/api/files/share/{id}", post(share_file))
        .route(
            "/api/files/{id}/content",
            put(update_file_content).layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024)),
        )
        .route("/api/files/{id}/download", get(download_file))
        .route("/api/files/{id}", delete(delete_file))
        .with_state(file_service)
}

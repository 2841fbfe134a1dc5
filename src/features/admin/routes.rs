use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};

use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;

/// Create admin routes (all require admin access)
pub fn routes(admin_service: Arc<AdminService>) -> Router {
    Router::new()
        .route("/api/files/admin/all", get(handlers::list_all_files))
        .route(
            "/api/files/admin/users/{userId}",
            get(handlers::list_user_files),
        )
        .route("/api/files/admin/{id}", delete(handlers::delete_any_file))
        .with_state(admin_service)
}

//! Route definitions for the `/documentos` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::documentos;
use crate::state::AppState;

/// Routes mounted at `/documentos`.
///
/// ```text
/// POST   /upload               -> upload (multipart)
/// GET    /{id}                 -> get_by_id (metadata)
/// GET    /{id}/download        -> download (stored bytes)
/// DELETE /{id}                 -> delete
/// GET    /oficio/{oficio_id}   -> list_by_oficio
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(documentos::upload))
        .route(
            "/{id}",
            get(documentos::get_by_id).delete(documentos::delete),
        )
        .route("/{id}/download", get(documentos::download))
        .route("/oficio/{oficio_id}", get(documentos::list_by_oficio))
}

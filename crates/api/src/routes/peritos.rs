//! Route definitions for the `/peritos` resource.
//!
//! All endpoints require authentication.

use axum::routing::get;
use axum::Router;

use crate::handlers::peritos;
use crate::state::AppState;

/// Routes mounted at `/peritos`.
///
/// ```text
/// GET    /      -> list (?activos&disponibles)
/// POST   /      -> create
/// GET    /{id}  -> get_by_id
/// PUT    /{id}  -> update
/// DELETE /{id}  -> delete (soft, sets activo = false)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(peritos::list).post(peritos::create))
        .route(
            "/{id}",
            get(peritos::get_by_id)
                .put(peritos::update)
                .delete(peritos::delete),
        )
}

//! Route definitions for the `/oficios` resource.
//!
//! All endpoints require authentication. Oficios are never deleted through
//! the API; closed cases stay queryable.

use axum::routing::{get, patch, put};
use axum::Router;

use crate::handlers::oficios;
use crate::state::AppState;

/// Routes mounted at `/oficios`.
///
/// ```text
/// GET   /              -> list
/// POST  /              -> create
/// GET   /{id}          -> get_by_id
/// PUT   /{id}          -> update
/// PUT   /{id}/perito   -> assign_perito
/// PATCH /{id}/status   -> set_estado
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(oficios::list).post(oficios::create))
        .route("/{id}", get(oficios::get_by_id).put(oficios::update))
        .route("/{id}/perito", put(oficios::assign_perito))
        .route("/{id}/status", patch(oficios::set_estado))
}

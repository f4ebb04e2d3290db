//! Route definitions for the `/citas` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::citas;
use crate::state::AppState;

/// Routes mounted at `/citas`.
///
/// ```text
/// GET    /                       -> list
/// POST   /                       -> create (conflict-checked)
/// GET    /proximas               -> proximas (?horas)
/// GET    /disponibilidad         -> disponibilidad
/// GET    /perito/{perito_id}     -> list_by_perito
/// GET    /oficio/{oficio_id}     -> list_by_oficio
/// GET    /{id}                   -> get_by_id
/// PUT    /{id}                   -> update (conflict-checked)
/// DELETE /{id}                   -> delete
/// PATCH  /{id}/estado            -> set_estado
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(citas::list).post(citas::create))
        .route("/proximas", get(citas::proximas))
        .route("/disponibilidad", get(citas::disponibilidad))
        .route("/perito/{perito_id}", get(citas::list_by_perito))
        .route("/oficio/{oficio_id}", get(citas::list_by_oficio))
        .route(
            "/{id}",
            get(citas::get_by_id)
                .put(citas::update)
                .delete(citas::delete),
        )
        .route("/{id}/estado", patch(citas::set_estado))
}

pub mod auth;
pub mod citas;
pub mod documentos;
pub mod health;
pub mod oficios;
pub mod peritos;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree.
///
/// All routes are mounted at the root, with no version prefix. Everything
/// except `/auth/login`, `/auth/refresh`, and `/health` requires a Bearer
/// token.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                      login (public)
/// /auth/refresh                    refresh (public)
/// /auth/profile                    current user profile (GET)
/// /auth/logout                     logout (POST)
///
/// /citas                           list, create
/// /citas/proximas                  upcoming citas (?horas)
/// /citas/disponibilidad            slot availability check (GET)
/// /citas/perito/{perito_id}        list by perito
/// /citas/oficio/{oficio_id}        list by oficio
/// /citas/{id}                      get, update, delete
/// /citas/{id}/estado               estado change (PATCH)
///
/// /oficios                         list, create
/// /oficios/{id}                    get, update
/// /oficios/{id}/perito             assign perito (PUT)
/// /oficios/{id}/status             estado change (PATCH)
///
/// /peritos                         list (?activos&disponibles), create
/// /peritos/{id}                    get, update, baja (DELETE, soft)
///
/// /documentos/upload               upload file (multipart POST)
/// /documentos/{id}                 metadata (GET), delete
/// /documentos/{id}/download        download stored file (GET)
/// /documentos/oficio/{oficio_id}   list by oficio
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (login, refresh, profile, logout).
        .nest("/auth", auth::router())
        // Agenda scheduling with conflict detection.
        .nest("/citas", citas::router())
        // Case file management.
        .nest("/oficios", oficios::router())
        // Expert roster with derived workload.
        .nest("/peritos", peritos::router())
        // File attachments per oficio.
        .nest("/documentos", documentos::router())
}

//! Handlers for the `/peritos` resource.
//!
//! Listings return [`PeritoConCarga`], which carries the derived
//! `casosAsignados` counter (open oficios per perito). The counter is
//! computed per query and never stored.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use peritos_core::error::CoreError;
use peritos_core::types::DbId;
use peritos_db::models::perito::{CreatePerito, Perito, PeritoConCarga, UpdatePerito};
use peritos_db::repositories::PeritoRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for `GET /peritos`.
#[derive(Debug, Deserialize)]
pub struct PeritosListQuery {
    /// `true` limits the listing to active peritos, `false` to inactive ones.
    pub activos: Option<bool>,
    /// `true` limits the listing to available peritos.
    pub disponibles: Option<bool>,
}

/// GET /peritos
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<PeritosListQuery>,
) -> AppResult<Json<ApiResponse<Vec<PeritoConCarga>>>> {
    let peritos = PeritoRepo::list(&state.pool, query.activos, query.disponibles).await?;
    Ok(Json(ApiResponse::data(peritos)))
}

/// GET /peritos/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<PeritoConCarga>>> {
    let perito = PeritoRepo::find_con_carga(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Perito",
            id,
        }))?;
    Ok(Json(ApiResponse::data(perito)))
}

/// POST /peritos
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiJson(input): ApiJson<CreatePerito>,
) -> AppResult<(StatusCode, Json<ApiResponse<Perito>>)> {
    if input.especialidades.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Debe indicar al menos una especialidad".into(),
        )));
    }

    let perito = PeritoRepo::create(&state.pool, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Perito registrado correctamente",
            perito,
        )),
    ))
}

/// PUT /peritos/{id}
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<UpdatePerito>,
) -> AppResult<Json<ApiResponse<Perito>>> {
    if let Some(especialidades) = &input.especialidades {
        if especialidades.is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Debe indicar al menos una especialidad".into(),
            )));
        }
    }

    let perito = PeritoRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Perito",
            id,
        }))?;
    Ok(Json(ApiResponse::with_message(
        "Perito actualizado correctamente",
        perito,
    )))
}

/// DELETE /peritos/{id}
///
/// Soft delete: flips `activo` to false. The perito keeps its history and
/// stays referenced by its oficios and citas.
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    if PeritoRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Perito",
            id,
        }));
    }

    PeritoRepo::deactivate(&state.pool, id).await?;
    Ok(Json(ApiResponse::message("Perito dado de baja correctamente")))
}

//! Handlers for the `/oficios` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use peritos_core::error::CoreError;
use peritos_core::pagination::{Page, PageParams};
use peritos_core::types::{DbId, Timestamp};
use peritos_core::oficio;
use peritos_db::models::oficio::{self as oficio_model, CreateOficio, Oficio, OficioFilter, UpdateOficio};
use peritos_db::repositories::{OficioRepo, PeritoRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::auth::AuthUser;
use crate::query::sort_spec;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /oficios`.
///
/// Filters combine with AND; `busqueda` is matched case-insensitively
/// against the expediente number, solicitante name, and DNI.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OficiosListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub estado: Option<String>,
    pub prioridad: Option<String>,
    pub perito_id: Option<DbId>,
    pub tipo_peritaje: Option<String>,
    pub busqueda: Option<String>,
    pub fecha_desde: Option<Timestamp>,
    pub fecha_hasta: Option<Timestamp>,
}

/// Request body for `PUT /oficios/{id}/perito`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsignarPeritoRequest {
    pub perito_id: DbId,
}

/// Request body for `PATCH /oficios/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct CambioEstadoRequest {
    pub estado: String,
    pub observaciones: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /oficios
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<OficiosListQuery>,
) -> AppResult<Json<ApiResponse<Page<Oficio>>>> {
    let params = PageParams::new(query.page, query.limit)?;
    let (column, order) = sort_spec(
        query.sort_by.as_deref(),
        query.sort_order.as_deref(),
        oficio_model::DEFAULT_SORT_COLUMN,
        oficio_model::sort_column,
    )?;

    if let Some(estado) = &query.estado {
        oficio::validate_estado(estado)?;
    }
    if let Some(prioridad) = &query.prioridad {
        oficio::validate_prioridad(prioridad)?;
    }

    let filter = OficioFilter {
        estado: query.estado,
        prioridad: query.prioridad,
        perito_id: query.perito_id,
        tipo_peritaje: query.tipo_peritaje,
        busqueda: query.busqueda,
        fecha_desde: query.fecha_desde,
        fecha_hasta: query.fecha_hasta,
    };

    let (items, total) = OficioRepo::list(&state.pool, &filter, params, column, order).await?;
    Ok(Json(ApiResponse::data(Page::new(items, total, params))))
}

/// GET /oficios/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<Oficio>>> {
    let oficio = OficioRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Oficio",
            id,
        }))?;
    Ok(Json(ApiResponse::data(oficio)))
}

/// POST /oficios
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiJson(input): ApiJson<CreateOficio>,
) -> AppResult<(StatusCode, Json<ApiResponse<Oficio>>)> {
    if let Some(prioridad) = &input.prioridad {
        oficio::validate_prioridad(prioridad)?;
    }

    let fecha_ingreso = input.fecha_ingreso.unwrap_or_else(Utc::now);
    oficio::validate_fechas(fecha_ingreso, input.fecha_vencimiento)?;

    // The create-and-assign shortcut requires a live perito.
    if let Some(perito_id) = input.perito_id {
        ensure_perito_asignable(&state, perito_id).await?;
    }

    let oficio = OficioRepo::create(&state.pool, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Oficio registrado correctamente",
            oficio,
        )),
    ))
}

/// PUT /oficios/{id}
///
/// Estado changes and perito assignment have their own endpoints and are
/// not accepted here.
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<UpdateOficio>,
) -> AppResult<Json<ApiResponse<Oficio>>> {
    if let Some(prioridad) = &input.prioridad {
        oficio::validate_prioridad(prioridad)?;
    }

    let current = OficioRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Oficio",
            id,
        }))?;

    // fecha_ingreso is immutable after registration; a new deadline is
    // checked against the stored intake date.
    if let Some(fecha_vencimiento) = input.fecha_vencimiento {
        oficio::validate_fechas(current.fecha_ingreso, fecha_vencimiento)?;
    }

    let oficio = OficioRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Oficio",
            id,
        }))?;
    Ok(Json(ApiResponse::with_message(
        "Oficio actualizado correctamente",
        oficio,
    )))
}

/// PUT /oficios/{id}/perito
///
/// Assign (or reassign) a perito. A PENDIENTE oficio moves to ASIGNADO;
/// any other estado is kept, and the first assignment date wins.
pub async fn assign_perito(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<AsignarPeritoRequest>,
) -> AppResult<Json<ApiResponse<Oficio>>> {
    ensure_perito_asignable(&state, input.perito_id).await?;

    let oficio = OficioRepo::assign_perito(&state.pool, id, input.perito_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Oficio",
            id,
        }))?;
    Ok(Json(ApiResponse::with_message(
        "Perito asignado correctamente",
        oficio,
    )))
}

/// PATCH /oficios/{id}/status
pub async fn set_estado(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<CambioEstadoRequest>,
) -> AppResult<Json<ApiResponse<Oficio>>> {
    oficio::validate_estado(&input.estado)?;

    let current = OficioRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Oficio",
            id,
        }))?;

    oficio::validate_transition(&current.estado, &input.estado)?;

    let oficio = OficioRepo::set_estado(
        &state.pool,
        id,
        &input.estado,
        input.observaciones.as_deref(),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Oficio",
        id,
    }))?;
    Ok(Json(ApiResponse::with_message(
        "Estado del oficio actualizado",
        oficio,
    )))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A perito can be assigned work only while it exists and is active.
/// `disponible` does not gate assignment; it is advisory for scheduling.
async fn ensure_perito_asignable(state: &AppState, perito_id: DbId) -> AppResult<()> {
    let perito = PeritoRepo::find_by_id(&state.pool, perito_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Perito",
            id: perito_id,
        }))?;

    if !perito.activo {
        return Err(AppError::Core(CoreError::Validation(
            "No se puede asignar un perito dado de baja".into(),
        )));
    }

    Ok(())
}

//! Handlers for the `/citas` resource.
//!
//! Creating or rescheduling a cita runs the agenda conflict check inside a
//! transaction that locks the perito row, so two concurrent requests for the
//! same perito serialize instead of double-booking. Estado changes never
//! re-run the check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use peritos_core::cita;
use peritos_core::error::CoreError;
use peritos_core::pagination::{Page, PageParams};
use peritos_core::types::{DbId, Timestamp};
use peritos_db::models::cita::{
    self as cita_model, Cita, CitaFilter, CreateCita, ScheduleOutcome, UpdateCita,
};
use peritos_db::repositories::{CitaRepo, OficioRepo, PeritoRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::auth::AuthUser;
use crate::query::sort_spec;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for the cita listing endpoints.
///
/// `GET /citas/perito/{peritoId}` and `GET /citas/oficio/{oficioId}` accept
/// the same parameters; the path segment overrides the matching filter.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitasListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub perito_id: Option<DbId>,
    pub oficio_id: Option<DbId>,
    pub tipo: Option<String>,
    pub estado: Option<String>,
    pub fecha_desde: Option<Timestamp>,
    pub fecha_hasta: Option<Timestamp>,
}

/// Query parameters for `GET /citas/proximas`.
#[derive(Debug, Deserialize)]
pub struct ProximasQuery {
    pub horas: Option<i64>,
}

/// Query parameters for `GET /citas/disponibilidad`.
///
/// `cita_id` excludes an existing cita from the check, for reschedule
/// previews.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisponibilidadQuery {
    pub perito_id: DbId,
    pub fecha_inicio: Timestamp,
    pub fecha_fin: Timestamp,
    pub cita_id: Option<DbId>,
}

/// Availability verdict for a candidate slot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Disponibilidad {
    pub disponible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cita_conflicto: Option<Cita>,
}

/// Request body for `PATCH /citas/{id}/estado`.
#[derive(Debug, Deserialize)]
pub struct CambioEstadoRequest {
    pub estado: String,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /citas
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<CitasListQuery>,
) -> AppResult<Json<ApiResponse<Page<Cita>>>> {
    list_filtered(&state, query).await
}

/// GET /citas/perito/{perito_id}
pub async fn list_by_perito(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(perito_id): ApiPath<DbId>,
    ApiQuery(mut query): ApiQuery<CitasListQuery>,
) -> AppResult<Json<ApiResponse<Page<Cita>>>> {
    query.perito_id = Some(perito_id);
    list_filtered(&state, query).await
}

/// GET /citas/oficio/{oficio_id}
pub async fn list_by_oficio(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(oficio_id): ApiPath<DbId>,
    ApiQuery(mut query): ApiQuery<CitasListQuery>,
) -> AppResult<Json<ApiResponse<Page<Cita>>>> {
    query.oficio_id = Some(oficio_id);
    list_filtered(&state, query).await
}

async fn list_filtered(
    state: &AppState,
    query: CitasListQuery,
) -> AppResult<Json<ApiResponse<Page<Cita>>>> {
    let params = PageParams::new(query.page, query.limit)?;
    let (column, order) = sort_spec(
        query.sort_by.as_deref(),
        query.sort_order.as_deref(),
        cita_model::DEFAULT_SORT_COLUMN,
        cita_model::sort_column,
    )?;

    if let Some(tipo) = &query.tipo {
        cita::validate_tipo(tipo)?;
    }
    if let Some(estado) = &query.estado {
        cita::validate_estado(estado)?;
    }

    let filter = CitaFilter {
        perito_id: query.perito_id,
        oficio_id: query.oficio_id,
        tipo: query.tipo,
        estado: query.estado,
        fecha_desde: query.fecha_desde,
        fecha_hasta: query.fecha_hasta,
    };

    let (items, total) = CitaRepo::list(&state.pool, &filter, params, column, order).await?;
    Ok(Json(ApiResponse::data(Page::new(items, total, params))))
}

/// GET /citas/proximas
///
/// Citas in blocking estados starting within the next `horas` hours.
pub async fn proximas(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<ProximasQuery>,
) -> AppResult<Json<ApiResponse<Vec<Cita>>>> {
    let horas = query.horas.unwrap_or(cita::DEFAULT_UPCOMING_HOURS);
    if horas < 1 {
        return Err(AppError::Core(CoreError::Validation(
            "El parámetro 'horas' debe ser mayor o igual a 1".into(),
        )));
    }

    let citas = CitaRepo::proximas(&state.pool, horas).await?;
    Ok(Json(ApiResponse::data(citas)))
}

/// GET /citas/disponibilidad
pub async fn disponibilidad(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<DisponibilidadQuery>,
) -> AppResult<Json<ApiResponse<Disponibilidad>>> {
    cita::validate_time_range(query.fecha_inicio, query.fecha_fin)?;

    let conflict = CitaRepo::find_conflict(
        &state.pool,
        query.perito_id,
        query.fecha_inicio,
        query.fecha_fin,
        query.cita_id,
    )
    .await?;

    Ok(Json(ApiResponse::data(Disponibilidad {
        disponible: conflict.is_none(),
        cita_conflicto: conflict,
    })))
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /citas/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<Cita>>> {
    let cita = CitaRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Cita", id }))?;
    Ok(Json(ApiResponse::data(cita)))
}

/// POST /citas
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiJson(input): ApiJson<CreateCita>,
) -> AppResult<(StatusCode, Json<ApiResponse<Cita>>)> {
    cita::validate_tipo(&input.tipo)?;
    cita::validate_time_range(input.fecha_inicio, input.fecha_fin)?;
    ensure_perito_exists(&state, input.perito_id).await?;
    ensure_oficio_exists(&state, input.oficio_id).await?;

    match CitaRepo::create_checked(&state.pool, &input).await? {
        ScheduleOutcome::Scheduled(cita) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::with_message(
                "Cita programada correctamente",
                cita,
            )),
        )),
        ScheduleOutcome::Conflict(existing) => {
            Err(AppError::SchedulingConflict(Box::new(existing)))
        }
    }
}

/// PUT /citas/{id}
///
/// Reschedules or edits a cita. The conflict check runs against the
/// effective time range (incoming values falling back to the stored ones)
/// and excludes the cita itself.
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<UpdateCita>,
) -> AppResult<Json<ApiResponse<Cita>>> {
    if let Some(tipo) = &input.tipo {
        cita::validate_tipo(tipo)?;
    }

    let current = CitaRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Cita", id }))?;

    let inicio = input.fecha_inicio.unwrap_or(current.fecha_inicio);
    let fin = input.fecha_fin.unwrap_or(current.fecha_fin);
    cita::validate_time_range(inicio, fin)?;

    if let Some(perito_id) = input.perito_id {
        ensure_perito_exists(&state, perito_id).await?;
    }
    if let Some(oficio_id) = input.oficio_id {
        ensure_oficio_exists(&state, oficio_id).await?;
    }

    match CitaRepo::update_checked(&state.pool, id, &input).await? {
        None => Err(AppError::Core(CoreError::NotFound { entity: "Cita", id })),
        Some(ScheduleOutcome::Scheduled(cita)) => Ok(Json(ApiResponse::with_message(
            "Cita actualizada correctamente",
            cita,
        ))),
        Some(ScheduleOutcome::Conflict(existing)) => {
            Err(AppError::SchedulingConflict(Box::new(existing)))
        }
    }
}

/// PATCH /citas/{id}/estado
///
/// Estado-only change. Reviving a cancelled cita does not re-check the
/// agenda; overlaps introduced this way are an operator decision.
pub async fn set_estado(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<CambioEstadoRequest>,
) -> AppResult<Json<ApiResponse<Cita>>> {
    cita::validate_estado(&input.estado)?;

    let current = CitaRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Cita", id }))?;

    cita::validate_transition(&current.estado, &input.estado)?;

    let cita = CitaRepo::set_estado(&state.pool, id, &input.estado)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Cita", id }))?;
    Ok(Json(ApiResponse::with_message(
        "Estado de la cita actualizado",
        cita,
    )))
}

/// DELETE /citas/{id}
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    let deleted = CitaRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "Cita", id }));
    }
    Ok(Json(ApiResponse::message("Cita eliminada correctamente")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Citas can reference inactive peritos (historical agendas survive a
/// baja), so only existence is checked here.
async fn ensure_perito_exists(state: &AppState, perito_id: DbId) -> AppResult<()> {
    PeritoRepo::find_by_id(&state.pool, perito_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Perito",
            id: perito_id,
        }))?;
    Ok(())
}

async fn ensure_oficio_exists(state: &AppState, oficio_id: DbId) -> AppResult<()> {
    OficioRepo::find_by_id(&state.pool, oficio_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Oficio",
            id: oficio_id,
        }))?;
    Ok(())
}

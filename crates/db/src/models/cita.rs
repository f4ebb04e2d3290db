//! Cita entity model, DTOs, listing filters, and scheduling outcomes.

use peritos_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full cita row from the `citas` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cita {
    pub id: DbId,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub fecha_inicio: Timestamp,
    pub fecha_fin: Timestamp,
    pub ubicacion: Option<String>,
    pub tipo: String,
    pub estado: String,
    pub oficio_id: DbId,
    pub perito_id: DbId,
    pub recordatorio_24h: bool,
    pub recordatorio_1h: bool,
    pub notificado_24h: bool,
    pub notificado_1h: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for booking a new cita.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCita {
    pub titulo: String,
    pub descripcion: Option<String>,
    pub fecha_inicio: Timestamp,
    pub fecha_fin: Timestamp,
    pub ubicacion: Option<String>,
    pub tipo: String,
    pub oficio_id: DbId,
    pub perito_id: DbId,
    pub recordatorio_24h: Option<bool>,
    pub recordatorio_1h: Option<bool>,
}

/// DTO for updating a cita. All fields are optional; estado changes go
/// through `PATCH /citas/{id}/estado`, and the sent markers
/// (`notificado24h`/`notificado1h`) have no API write path at all.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCita {
    pub titulo: Option<String>,
    pub descripcion: Option<String>,
    pub fecha_inicio: Option<Timestamp>,
    pub fecha_fin: Option<Timestamp>,
    pub ubicacion: Option<String>,
    pub tipo: Option<String>,
    pub oficio_id: Option<DbId>,
    pub perito_id: Option<DbId>,
    pub recordatorio_24h: Option<bool>,
    pub recordatorio_1h: Option<bool>,
}

/// Result of a conflict-checked write. The check and the write share one
/// transaction, so `Scheduled` means the row is committed and `Conflict`
/// means nothing was written.
#[derive(Debug)]
pub enum ScheduleOutcome {
    Scheduled(Cita),
    /// The blocking cita that overlaps the requested range.
    Conflict(Cita),
}

/// Filter set for cita listings. All fields optional, combined with AND.
#[derive(Debug, Default)]
pub struct CitaFilter {
    pub perito_id: Option<DbId>,
    pub oficio_id: Option<DbId>,
    pub tipo: Option<String>,
    pub estado: Option<String>,
    /// Inclusive lower bound on `fecha_inicio`.
    pub fecha_desde: Option<Timestamp>,
    /// Inclusive upper bound on `fecha_inicio`.
    pub fecha_hasta: Option<Timestamp>,
}

/// Column used when the caller does not pick a sort field.
pub const DEFAULT_SORT_COLUMN: &str = "fecha_inicio";

/// Map an API sort field (camelCase) to its column.
///
/// Returns `None` for unknown fields; the handler turns that into a
/// validation error instead of interpolating caller input into SQL.
pub fn sort_column(field: &str) -> Option<&'static str> {
    match field {
        "titulo" => Some("titulo"),
        "fechaInicio" => Some("fecha_inicio"),
        "fechaFin" => Some("fecha_fin"),
        "tipo" => Some("tipo"),
        "estado" => Some("estado"),
        "createdAt" => Some("created_at"),
        _ => None,
    }
}

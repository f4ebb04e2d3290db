//! Oficio entity model, DTOs, and listing filters.

use peritos_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full oficio row from the `oficios` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Oficio {
    pub id: DbId,
    pub numero_expediente: String,
    pub solicitante_nombre: String,
    pub solicitante_apellido: String,
    pub solicitante_dni: String,
    pub solicitante_telefono: Option<String>,
    pub solicitante_email: Option<String>,
    pub tipo_peritaje: String,
    pub descripcion: Option<String>,
    pub fecha_ingreso: Timestamp,
    pub fecha_asignacion: Option<Timestamp>,
    pub fecha_audiencia: Option<Timestamp>,
    pub fecha_vencimiento: Timestamp,
    pub estado: String,
    pub prioridad: String,
    pub perito_id: Option<DbId>,
    pub observaciones: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a new oficio.
///
/// `peritoId` is the create-and-assign shortcut: when present the oficio
/// starts out ASIGNADO with `fechaAsignacion` set (see `OficioRepo::create`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOficio {
    pub numero_expediente: String,
    pub solicitante_nombre: String,
    pub solicitante_apellido: String,
    pub solicitante_dni: String,
    pub solicitante_telefono: Option<String>,
    pub solicitante_email: Option<String>,
    pub tipo_peritaje: String,
    pub descripcion: Option<String>,
    pub fecha_ingreso: Option<Timestamp>,
    pub fecha_audiencia: Option<Timestamp>,
    pub fecha_vencimiento: Timestamp,
    pub prioridad: Option<String>,
    pub perito_id: Option<DbId>,
    pub observaciones: Option<String>,
}

/// DTO for updating an oficio. All fields are optional; estado changes and
/// perito assignment go through their own endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOficio {
    pub numero_expediente: Option<String>,
    pub solicitante_nombre: Option<String>,
    pub solicitante_apellido: Option<String>,
    pub solicitante_dni: Option<String>,
    pub solicitante_telefono: Option<String>,
    pub solicitante_email: Option<String>,
    pub tipo_peritaje: Option<String>,
    pub descripcion: Option<String>,
    pub fecha_audiencia: Option<Timestamp>,
    pub fecha_vencimiento: Option<Timestamp>,
    pub prioridad: Option<String>,
    pub observaciones: Option<String>,
}

/// Filter set for oficio listings. All fields optional, combined with AND.
#[derive(Debug, Default)]
pub struct OficioFilter {
    pub estado: Option<String>,
    pub prioridad: Option<String>,
    pub perito_id: Option<DbId>,
    /// Substring match (case-insensitive) on `tipo_peritaje`.
    pub tipo_peritaje: Option<String>,
    /// Free text matched against expediente number, solicitante first and
    /// last name, and DNI.
    pub busqueda: Option<String>,
    /// Inclusive lower bound on `fecha_ingreso`.
    pub fecha_desde: Option<Timestamp>,
    /// Inclusive upper bound on `fecha_ingreso`.
    pub fecha_hasta: Option<Timestamp>,
}

/// Column used when the caller does not pick a sort field.
pub const DEFAULT_SORT_COLUMN: &str = "fecha_ingreso";

/// Map an API sort field (camelCase) to its column.
///
/// Returns `None` for unknown fields; the handler turns that into a
/// validation error instead of interpolating caller input into SQL.
pub fn sort_column(field: &str) -> Option<&'static str> {
    match field {
        "numeroExpediente" => Some("numero_expediente"),
        "tipoPeritaje" => Some("tipo_peritaje"),
        "fechaIngreso" => Some("fecha_ingreso"),
        "fechaVencimiento" => Some("fecha_vencimiento"),
        "fechaAudiencia" => Some("fecha_audiencia"),
        "estado" => Some("estado"),
        "prioridad" => Some("prioridad"),
        "createdAt" => Some("created_at"),
        _ => None,
    }
}

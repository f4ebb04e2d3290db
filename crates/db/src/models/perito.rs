//! Perito entity model and DTOs.

use peritos_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full perito row from the `peritos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Perito {
    pub id: DbId,
    pub nombre: String,
    pub apellido: String,
    pub matricula: String,
    pub especialidades: Vec<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub activo: bool,
    pub disponible: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Perito row plus the derived open-case counter.
///
/// `casos_asignados` counts oficios referencing the perito whose estado is
/// not terminal. It is computed per query and never stored, so it cannot
/// drift from the oficios table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeritoConCarga {
    pub id: DbId,
    pub nombre: String,
    pub apellido: String,
    pub matricula: String,
    pub especialidades: Vec<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub activo: bool,
    pub disponible: bool,
    pub casos_asignados: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a new perito.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePerito {
    pub nombre: String,
    pub apellido: String,
    pub matricula: String,
    pub especialidades: Vec<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub disponible: Option<bool>,
}

/// DTO for updating an existing perito. All fields are optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePerito {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub matricula: Option<String>,
    pub especialidades: Option<Vec<String>>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub activo: Option<bool>,
    pub disponible: Option<bool>,
}

//! Documento entity model and DTOs.

use peritos_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full documento row from the `documentos` table.
///
/// `ruta` is the storage path on disk; it stays internal-facing but is
/// harmless to expose (download goes through the API, not the path).
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Documento {
    pub id: DbId,
    /// Display name shown in listings.
    pub nombre: String,
    /// Filename as uploaded by the client.
    pub nombre_original: String,
    /// Lowercased file extension.
    pub tipo: String,
    pub ruta: String,
    pub tamano_bytes: i64,
    pub oficio_id: DbId,
    pub subido_por: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload built by the upload handler after the file is on disk.
/// Not deserialized from a request body; uploads arrive as multipart.
#[derive(Debug)]
pub struct CreateDocumento {
    pub nombre: String,
    pub nombre_original: String,
    pub tipo: String,
    pub ruta: String,
    pub tamano_bytes: i64,
    pub oficio_id: DbId,
    pub subido_por: DbId,
}

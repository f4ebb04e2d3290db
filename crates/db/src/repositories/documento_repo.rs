//! Repository for the `documentos` table.
//!
//! Rows carry file metadata only; the bytes live on disk under the upload
//! directory and the API layer owns moving them in and out.

use peritos_core::types::DbId;
use sqlx::PgPool;

use crate::models::documento::{CreateDocumento, Documento};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, nombre, nombre_original, tipo, ruta, tamano_bytes, oficio_id, \
                        subido_por, created_at, updated_at";

/// Provides CRUD operations for documentos.
pub struct DocumentoRepo;

impl DocumentoRepo {
    /// Record an uploaded file's metadata.
    pub async fn create(pool: &PgPool, input: &CreateDocumento) -> Result<Documento, sqlx::Error> {
        let query = format!(
            "INSERT INTO documentos \
                 (nombre, nombre_original, tipo, ruta, tamano_bytes, oficio_id, subido_por) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Documento>(&query)
            .bind(&input.nombre)
            .bind(&input.nombre_original)
            .bind(&input.tipo)
            .bind(&input.ruta)
            .bind(input.tamano_bytes)
            .bind(input.oficio_id)
            .bind(input.subido_por)
            .fetch_one(pool)
            .await
    }

    /// Find a documento by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Documento>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documentos WHERE id = $1");
        sqlx::query_as::<_, Documento>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All documentos attached to an oficio, newest upload first.
    pub async fn list_by_oficio(
        pool: &PgPool,
        oficio_id: DbId,
    ) -> Result<Vec<Documento>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documentos \
             WHERE oficio_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Documento>(&query)
            .bind(oficio_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a documento row, returning it so the caller can remove the
    /// file at `ruta` afterwards. `None` if the id does not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Documento>, sqlx::Error> {
        let query = format!("DELETE FROM documentos WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Documento>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

//! Handlers for the `/documentos` resource.
//!
//! Files land on local disk under the configured upload directory with a
//! UUID name; the original filename survives only as metadata. If the
//! metadata insert fails after the file was written, the file is removed
//! best-effort so the upload directory does not accumulate orphans.

use std::path::Path;

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use peritos_core::error::CoreError;
use peritos_core::types::DbId;
use peritos_db::models::documento::{CreateDocumento, Documento};
use peritos_db::repositories::{DocumentoRepo, OficioRepo};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::extract::ApiPath;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /documentos/upload
///
/// Multipart form with fields `file` (required), `oficioId` (required) and
/// `nombre` (optional display name, defaults to the original filename).
pub async fn upload(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Documento>>)> {
    let mut oficio_id: Option<DbId> = None;
    let mut nombre: Option<String> = None;
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        // `text`/`bytes` consume the field, so copy the name out first.
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "oficioId" => {
                let text = field.text().await.map_err(multipart_error)?;
                let parsed = text.trim().parse::<DbId>().map_err(|_| {
                    AppError::BadRequest("El campo 'oficioId' debe ser un número".into())
                })?;
                oficio_id = Some(parsed);
            }
            "nombre" => {
                nombre = Some(field.text().await.map_err(multipart_error)?);
            }
            "file" => {
                let original = field
                    .file_name()
                    .map(str::to_owned)
                    .ok_or_else(|| {
                        AppError::BadRequest("El archivo debe incluir un nombre".into())
                    })?;
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((original, data));
            }
            _ => {}
        }
    }

    let oficio_id =
        oficio_id.ok_or_else(|| AppError::BadRequest("Falta el campo 'oficioId'".into()))?;
    let (original, data) =
        file.ok_or_else(|| AppError::BadRequest("Falta el archivo a subir".into()))?;
    if data.is_empty() {
        return Err(AppError::BadRequest("El archivo está vacío".into()));
    }

    OficioRepo::find_by_id(&state.pool, oficio_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Oficio",
            id: oficio_id,
        }))?;

    let extension = Path::new(&original)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string());
    let stored_name = format!("{}.{extension}", Uuid::new_v4());
    let path = state.config.upload_dir.join(&stored_name);

    tokio::fs::create_dir_all(&state.config.upload_dir)
        .await
        .map_err(|err| {
            AppError::InternalError(format!("failed to create upload directory: {err}"))
        })?;
    tokio::fs::write(&path, &data).await.map_err(|err| {
        AppError::InternalError(format!("failed to store uploaded file: {err}"))
    })?;

    let input = CreateDocumento {
        nombre: nombre
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| original.clone()),
        nombre_original: original,
        tipo: extension,
        ruta: path.to_string_lossy().into_owned(),
        tamano_bytes: data.len() as i64,
        oficio_id,
        subido_por: user.user_id,
    };

    let documento = match DocumentoRepo::create(&state.pool, &input).await {
        Ok(documento) => documento,
        Err(err) => {
            if let Err(io_err) = tokio::fs::remove_file(&path).await {
                tracing::warn!(
                    path = %path.display(),
                    error = %io_err,
                    "failed to remove orphaned upload"
                );
            }
            return Err(AppError::Database(err));
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Documento subido correctamente",
            documento,
        )),
    ))
}

/// GET /documentos/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<Documento>>> {
    let documento = DocumentoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Documento",
            id,
        }))?;
    Ok(Json(ApiResponse::data(documento)))
}

/// GET /documentos/{id}/download
///
/// Streams the stored bytes with the original filename in the
/// Content-Disposition header. A row whose file is gone from disk is
/// reported as not found and logged for the operator.
pub async fn download(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let documento = DocumentoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Documento",
            id,
        }))?;

    let bytes = match tokio::fs::read(&documento.ruta).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(
                documento_id = id,
                ruta = %documento.ruta,
                error = %err,
                "stored file missing or unreadable"
            );
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Documento",
                id,
            }));
        }
    };

    // Quotes would break the header value.
    let filename = documento.nombre_original.replace('"', "");
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

/// DELETE /documentos/{id}
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    let documento = DocumentoRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Documento",
            id,
        }))?;

    if let Err(io_err) = tokio::fs::remove_file(&documento.ruta).await {
        tracing::warn!(
            documento_id = id,
            ruta = %documento.ruta,
            error = %io_err,
            "failed to remove stored file"
        );
    }

    Ok(Json(ApiResponse::message(
        "Documento eliminado correctamente",
    )))
}

/// GET /documentos/oficio/{oficio_id}
pub async fn list_by_oficio(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(oficio_id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<Vec<Documento>>>> {
    OficioRepo::find_by_id(&state.pool, oficio_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Oficio",
            id: oficio_id,
        }))?;

    let documentos = DocumentoRepo::list_by_oficio(&state.pool, oficio_id).await?;
    Ok(Json(ApiResponse::data(documentos)))
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::BadRequest(format!("Carga multipart inválida: {err}"))
}

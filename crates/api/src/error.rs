use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use peritos_core::error::CoreError;
use peritos_db::models::cita::Cita;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the `{ "success": false, "error" }`
/// JSON body every error response uses. User-facing messages are Spanish;
/// logs stay English.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `peritos_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The requested time slot overlaps an existing blocking cita. Carries
    /// the conflicting row so the response can embed it as `citaConflicto`.
    #[error("Scheduling conflict with cita {}", .0.id)]
    SchedulingConflict(Box<Cita>),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            // The conflict body is the one shape that carries extra data
            // besides the message, so it is built separately.
            AppError::SchedulingConflict(cita) => {
                let body = json!({
                    "success": false,
                    "error": "El perito ya tiene una cita programada en ese horario",
                    "citaConflicto": *cita,
                });
                return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
            }

            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    format!("{entity} con id {id} no encontrado"),
                ),
                CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
                CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Error interno del servidor".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(&err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error interno del servidor".to_string(),
                )
            }
        };

        let body = json!({
            "success": false,
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status and user-facing message.
///
/// - `RowNotFound` maps to 404.
/// - Constraint violations (unique 23505, foreign key 23503, check 23514)
///   map to 400: they mean the client sent data the schema rejects.
/// - Everything else maps to 500 with a sanitized message; the real error
///   goes to the log.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "Recurso no encontrado".to_string(),
        ),
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => {
                let message = match db_err.constraint() {
                    Some("uq_oficios_numero_expediente") => {
                        "Ya existe un oficio con ese número de expediente".to_string()
                    }
                    Some("uq_peritos_matricula") => {
                        "Ya existe un perito con esa matrícula".to_string()
                    }
                    _ => "El valor ya existe y debe ser único".to_string(),
                };
                (StatusCode::BAD_REQUEST, message)
            }
            Some("23503") => (
                StatusCode::BAD_REQUEST,
                "La entidad relacionada no existe".to_string(),
            ),
            Some("23514") => (
                StatusCode::BAD_REQUEST,
                "Los datos no cumplen las restricciones de validación".to_string(),
            ),
            _ => {
                tracing::error!(error = %db_err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error interno del servidor".to_string(),
                )
            }
        },
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error interno del servidor".to_string(),
            )
        }
    }
}

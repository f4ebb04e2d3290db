//! Extractor wrappers that route rejections through [`AppError`].
//!
//! Axum's stock `Json`/`Query`/`Path` extractors answer malformed input with
//! their own plain-text bodies (and 422 for JSON deserialization failures).
//! These wrappers convert every rejection into an [`AppError::BadRequest`] so
//! clients always get a 400 with the standard `{ "success": false, "error" }`
//! envelope, no matter where parsing failed.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON body extractor. Use in place of `axum::Json` for request bodies.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor. Use in place of `axum::extract::Query`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Path parameter extractor. Use in place of `axum::extract::Path`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!(
            "Cuerpo de la petición inválido: {}",
            rejection.body_text()
        ))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(format!(
            "Parámetros de consulta inválidos: {}",
            rejection.body_text()
        ))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(format!(
            "Parámetro de ruta inválido: {}",
            rejection.body_text()
        ))
    }
}

//! HTTP request handlers, one module per resource.

pub mod auth;
pub mod citas;
pub mod documentos;
pub mod oficios;
pub mod peritos;

//! Pure domain rules for the peritos case-management backend.
//!
//! This crate has zero internal dependencies so the rules it encodes
//! (estado catalogues, transition policy, agenda overlap, pagination
//! bounds) can be exercised by the repository layer, the HTTP layer,
//! and unit tests without a database.

pub mod agenda;
pub mod cita;
pub mod error;
pub mod oficio;
pub mod pagination;
pub mod types;

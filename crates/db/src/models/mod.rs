//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! Wire format is camelCase Spanish, matching the frontend the API was
//! built for (`numeroExpediente`, `fechaInicio`, ...).

pub mod cita;
pub mod documento;
pub mod oficio;
pub mod perito;
pub mod session;
pub mod user;

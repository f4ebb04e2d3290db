//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Writes that depend on a
//! conflict check open their own transaction (see `CitaRepo`).

pub mod cita_repo;
pub mod documento_repo;
pub mod oficio_repo;
pub mod perito_repo;
pub mod session_repo;
pub mod user_repo;

pub use cita_repo::CitaRepo;
pub use documento_repo::DocumentoRepo;
pub use oficio_repo::OficioRepo;
pub use perito_repo::PeritoRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;

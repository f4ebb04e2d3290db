//! Oficio estado and prioridad catalogue plus the transition policy.
//!
//! An oficio is a court-issued case file worked by an expert witness
//! (perito). Estados are stored as uppercase TEXT; the database mirrors
//! this module with CHECK constraints, and the HTTP layer validates
//! user input against it before touching the database.

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Estado constants
// ---------------------------------------------------------------------------

/// Freshly registered, no perito assigned yet.
pub const ESTADO_PENDIENTE: &str = "PENDIENTE";

/// A perito has been assigned.
pub const ESTADO_ASIGNADO: &str = "ASIGNADO";

/// The perito is actively working the case.
pub const ESTADO_EN_PROCESO: &str = "EN_PROCESO";

/// Report delivered, pending acceptance.
pub const ESTADO_REVISION: &str = "REVISION";

/// Work accepted and archived.
pub const ESTADO_COMPLETADO: &str = "COMPLETADO";

/// Rejected by the court or the requesting party.
pub const ESTADO_RECHAZADO: &str = "RECHAZADO";

/// Deadline passed without completion.
pub const ESTADO_VENCIDO: &str = "VENCIDO";

/// All valid oficio estados.
pub const VALID_ESTADOS: &[&str] = &[
    ESTADO_PENDIENTE,
    ESTADO_ASIGNADO,
    ESTADO_EN_PROCESO,
    ESTADO_REVISION,
    ESTADO_COMPLETADO,
    ESTADO_RECHAZADO,
    ESTADO_VENCIDO,
];

/// Estados after which no further work happens on the oficio.
///
/// Oficios in these estados do not count towards a perito's open case
/// load (`casosAsignados` is derived from the complement of this set).
pub const TERMINAL_ESTADOS: &[&str] = &[ESTADO_COMPLETADO, ESTADO_RECHAZADO, ESTADO_VENCIDO];

// ---------------------------------------------------------------------------
// Prioridad constants
// ---------------------------------------------------------------------------

pub const PRIORIDAD_BAJA: &str = "BAJA";
pub const PRIORIDAD_MEDIA: &str = "MEDIA";
pub const PRIORIDAD_ALTA: &str = "ALTA";
pub const PRIORIDAD_URGENTE: &str = "URGENTE";

/// All valid prioridad values.
pub const VALID_PRIORIDADES: &[&str] = &[
    PRIORIDAD_BAJA,
    PRIORIDAD_MEDIA,
    PRIORIDAD_ALTA,
    PRIORIDAD_URGENTE,
];

/// Prioridad applied when a new oficio does not specify one.
pub const DEFAULT_PRIORIDAD: &str = PRIORIDAD_MEDIA;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that an estado string is one of the accepted values.
pub fn validate_estado(estado: &str) -> Result<(), CoreError> {
    if VALID_ESTADOS.contains(&estado) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Estado de oficio inválido '{estado}'. Valores permitidos: {}",
            VALID_ESTADOS.join(", ")
        )))
    }
}

/// Validate that a prioridad string is one of the accepted values.
pub fn validate_prioridad(prioridad: &str) -> Result<(), CoreError> {
    if VALID_PRIORIDADES.contains(&prioridad) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Prioridad inválida '{prioridad}'. Valores permitidos: {}",
            VALID_PRIORIDADES.join(", ")
        )))
    }
}

/// Validate that an oficio's deadline does not precede its intake date.
/// Equal values are accepted (same-day turnaround happens).
pub fn validate_fechas(
    fecha_ingreso: Timestamp,
    fecha_vencimiento: Timestamp,
) -> Result<(), CoreError> {
    if fecha_vencimiento >= fecha_ingreso {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "La fecha de vencimiento no puede ser anterior a la fecha de ingreso".to_string(),
        ))
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Documented lifecycle for reference and for a future strict mode:
///
/// ```text
/// PENDIENTE -> ASIGNADO -> EN_PROCESO -> REVISION -> COMPLETADO
///     |            |            |            |
///     +------------+------------+------------+--> RECHAZADO | VENCIDO
/// ```
///
/// Terminal estados return an empty slice.
pub fn intended_transitions(from: &str) -> &'static [&'static str] {
    match from {
        ESTADO_PENDIENTE => &[ESTADO_ASIGNADO, ESTADO_RECHAZADO, ESTADO_VENCIDO],
        ESTADO_ASIGNADO => &[ESTADO_EN_PROCESO, ESTADO_RECHAZADO, ESTADO_VENCIDO],
        ESTADO_EN_PROCESO => &[ESTADO_REVISION, ESTADO_RECHAZADO, ESTADO_VENCIDO],
        ESTADO_REVISION => &[ESTADO_COMPLETADO, ESTADO_RECHAZADO, ESTADO_VENCIDO],
        _ => &[],
    }
}

/// Whether an estado ends the oficio's lifecycle.
pub fn is_terminal(estado: &str) -> bool {
    TERMINAL_ESTADOS.contains(&estado)
}

/// Single choke point for estado changes.
///
/// The workflow is currently permissive: any change between known estados
/// is accepted, matching how the application is operated today (estados
/// get corrected by hand, including backwards moves). Tightening to
/// [`intended_transitions`] only requires changing this function; the
/// handlers already route every estado change through here.
pub fn validate_transition(from: &str, to: &str) -> Result<(), CoreError> {
    validate_estado(from)?;
    validate_estado(to)?;
    Ok(())
}

//! Cita estado and tipo catalogue plus the transition policy.
//!
//! A cita is a calendar appointment tied to exactly one oficio and one
//! perito. Estado decides whether the cita reserves the perito's time
//! (see [`BLOCKING_ESTADOS`] and the [`crate::agenda`] overlap rules).

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Estado constants
// ---------------------------------------------------------------------------

/// Booked, awaiting confirmation.
pub const ESTADO_PROGRAMADA: &str = "PROGRAMADA";

/// Confirmed by the parties involved.
pub const ESTADO_CONFIRMADA: &str = "CONFIRMADA";

/// The appointment took place.
pub const ESTADO_COMPLETADA: &str = "COMPLETADA";

/// Called off; the slot is free again.
pub const ESTADO_CANCELADA: &str = "CANCELADA";

/// Moved to another date. No replacement cita is created automatically;
/// rebooking is a manual step. Known limitation, kept as-is.
pub const ESTADO_REPROGRAMADA: &str = "REPROGRAMADA";

/// All valid cita estados.
pub const VALID_ESTADOS: &[&str] = &[
    ESTADO_PROGRAMADA,
    ESTADO_CONFIRMADA,
    ESTADO_COMPLETADA,
    ESTADO_CANCELADA,
    ESTADO_REPROGRAMADA,
];

/// Estados that reserve the perito's time. Only citas in these estados
/// participate in conflict detection.
pub const BLOCKING_ESTADOS: &[&str] = &[ESTADO_PROGRAMADA, ESTADO_CONFIRMADA];

// ---------------------------------------------------------------------------
// Tipo constants
// ---------------------------------------------------------------------------

pub const TIPO_EVALUACION: &str = "EVALUACION";
pub const TIPO_AUDIENCIA: &str = "AUDIENCIA";
pub const TIPO_ENTREGA_INFORME: &str = "ENTREGA_INFORME";
pub const TIPO_SEGUIMIENTO: &str = "SEGUIMIENTO";
pub const TIPO_OTRA: &str = "OTRA";

/// All valid cita tipos.
pub const VALID_TIPOS: &[&str] = &[
    TIPO_EVALUACION,
    TIPO_AUDIENCIA,
    TIPO_ENTREGA_INFORME,
    TIPO_SEGUIMIENTO,
    TIPO_OTRA,
];

/// Horizon used by the "próximas citas" listing when no `horas` is given.
pub const DEFAULT_UPCOMING_HOURS: i64 = 24;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that an estado string is one of the accepted values.
pub fn validate_estado(estado: &str) -> Result<(), CoreError> {
    if VALID_ESTADOS.contains(&estado) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Estado de cita inválido '{estado}'. Valores permitidos: {}",
            VALID_ESTADOS.join(", ")
        )))
    }
}

/// Validate that a tipo string is one of the accepted values.
pub fn validate_tipo(tipo: &str) -> Result<(), CoreError> {
    if VALID_TIPOS.contains(&tipo) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Tipo de cita inválido '{tipo}'. Valores permitidos: {}",
            VALID_TIPOS.join(", ")
        )))
    }
}

/// Validate that a cita's time range is well formed: `fin` strictly after
/// `inicio`. Zero-length citas are rejected.
pub fn validate_time_range(inicio: Timestamp, fin: Timestamp) -> Result<(), CoreError> {
    if inicio < fin {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "La fecha de fin debe ser posterior a la fecha de inicio".to_string(),
        ))
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Documented lifecycle for reference and for a future strict mode:
///
/// ```text
/// PROGRAMADA -> CONFIRMADA -> COMPLETADA
///     |            |
///     +------------+--> CANCELADA | REPROGRAMADA
/// ```
///
/// COMPLETADA and CANCELADA are terminal; REPROGRAMADA is a dead end.
pub fn intended_transitions(from: &str) -> &'static [&'static str] {
    match from {
        ESTADO_PROGRAMADA => &[ESTADO_CONFIRMADA, ESTADO_CANCELADA, ESTADO_REPROGRAMADA],
        ESTADO_CONFIRMADA => &[ESTADO_COMPLETADA, ESTADO_CANCELADA, ESTADO_REPROGRAMADA],
        _ => &[],
    }
}

/// Whether a cita in this estado blocks other bookings for its perito.
pub fn is_blocking(estado: &str) -> bool {
    BLOCKING_ESTADOS.contains(&estado)
}

/// Single choke point for estado changes, permissive like the oficio
/// machine. Changing estado never re-runs conflict detection, so a cita
/// moved back into a blocking estado is accepted even when its slot has
/// been taken in the meantime. Tightening either rule happens here.
pub fn validate_transition(from: &str, to: &str) -> Result<(), CoreError> {
    validate_estado(from)?;
    validate_estado(to)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts(h: u32, m: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, 0).unwrap()
    }

    // -----------------------------------------------------------------------
    // Estado / tipo validation
    // -----------------------------------------------------------------------

    #[test]
    fn all_estados_are_valid() {
        for estado in VALID_ESTADOS {
            assert!(validate_estado(estado).is_ok());
        }
    }

    #[test]
    fn unknown_estado_rejected() {
        assert!(validate_estado("PAUSADA").is_err());
    }

    #[test]
    fn all_tipos_are_valid() {
        for tipo in VALID_TIPOS {
            assert!(validate_tipo(tipo).is_ok());
        }
    }

    #[test]
    fn unknown_tipo_rejected() {
        let err = validate_tipo("PERICIA").unwrap_err();
        assert!(err.to_string().contains("PERICIA"));
    }

    // -----------------------------------------------------------------------
    // Blocking estados
    // -----------------------------------------------------------------------

    #[test]
    fn programada_and_confirmada_block() {
        assert!(is_blocking(ESTADO_PROGRAMADA));
        assert!(is_blocking(ESTADO_CONFIRMADA));
    }

    #[test]
    fn closed_estados_do_not_block() {
        assert!(!is_blocking(ESTADO_COMPLETADA));
        assert!(!is_blocking(ESTADO_CANCELADA));
        assert!(!is_blocking(ESTADO_REPROGRAMADA));
    }

    // -----------------------------------------------------------------------
    // Time range validation
    // -----------------------------------------------------------------------

    #[test]
    fn valid_range_accepted() {
        assert!(validate_time_range(ts(9, 0), ts(10, 0)).is_ok());
    }

    #[test]
    fn zero_length_range_rejected() {
        assert!(validate_time_range(ts(9, 0), ts(9, 0)).is_err());
    }

    #[test]
    fn inverted_range_rejected() {
        assert!(validate_time_range(ts(10, 0), ts(9, 0)).is_err());
    }

    // -----------------------------------------------------------------------
    // Transition policy
    // -----------------------------------------------------------------------

    #[test]
    fn intended_flow_reaches_completada() {
        assert!(intended_transitions(ESTADO_PROGRAMADA).contains(&ESTADO_CONFIRMADA));
        assert!(intended_transitions(ESTADO_CONFIRMADA).contains(&ESTADO_COMPLETADA));
    }

    #[test]
    fn reprogramada_is_a_dead_end() {
        assert!(intended_transitions(ESTADO_REPROGRAMADA).is_empty());
    }

    #[test]
    fn permissive_policy_accepts_reopening() {
        assert!(validate_transition(ESTADO_CANCELADA, ESTADO_PROGRAMADA).is_ok());
    }

    #[test]
    fn transition_to_unknown_estado_rejected() {
        assert!(validate_transition(ESTADO_PROGRAMADA, "PAUSADA").is_err());
    }
}

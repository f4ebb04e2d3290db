//! Interval overlap rules for the perito agenda.
//!
//! Appointment boundaries are inclusive on both ends: a cita ending at
//! 10:00 conflicts with one starting at 10:00 for the same perito, so
//! back-to-back bookings are rejected. Keep the `<=` comparisons exactly
//! as they are; half-open interval math changes observable behaviour at
//! the boundaries.

use crate::types::Timestamp;

/// Three-way inclusive overlap check between an existing booking and a
/// candidate range.
///
/// True when any of the following holds:
///
/// 1. the candidate's start falls inside the existing booking,
/// 2. the candidate's end falls inside the existing booking,
/// 3. the candidate fully contains the existing booking.
///
/// The cita repository runs the same predicate in SQL; this mirror exists
/// so the rule stays unit-testable without a database.
pub fn ranges_overlap(
    existing_inicio: Timestamp,
    existing_fin: Timestamp,
    inicio: Timestamp,
    fin: Timestamp,
) -> bool {
    (existing_inicio <= inicio && inicio <= existing_fin)
        || (existing_inicio <= fin && fin <= existing_fin)
        || (inicio <= existing_inicio && existing_fin <= fin)
}

use crate::model::{ShiftType, StaffId};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// plusieurs affectations pour le même (personne, date)
    DoubleBooking,
    /// poste autre que congé pendant une absence
    AbsenceViolation,
    /// nuit suivie d'un matin le lendemain
    ForbiddenTransition,
    /// série de jours travaillés trop longue
    ConsecutiveWorkExceeded,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::DoubleBooking => "double",
            ConflictKind::AbsenceViolation => "absence",
            ConflictKind::ForbiddenTransition => "night_morning",
            ConflictKind::ConsecutiveWorkExceeded => "consecutive",
        }
    }
}

/// Conflit détecté pour une personne à une date.
///
/// `shifts` liste les postes en cause : les doublons pour `DoubleBooking`,
/// le couple nuit/matin pour `ForbiddenTransition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub staff_id: StaffId,
    pub date: NaiveDate,
    pub kind: ConflictKind,
    pub shifts: Vec<ShiftType>,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid date range: start {start} is after end {end}")]
    RangeInverted { start: NaiveDate, end: NaiveDate },
    #[error("date range too large: {days} days (max {max})")]
    RangeTooLarge { days: i64, max: i64 },
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("unknown shift type: {0}")]
    UnknownShift(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    #[error("invalid staff member {id}: {reason}")]
    InvalidStaff { id: StaffId, reason: &'static str },
    #[error("unknown staff member: {0}")]
    UnknownStaff(String),
    #[error("no assignment for {staff} on {date}")]
    NoAssignment { staff: StaffId, date: NaiveDate },
    #[error("swap invalid: {0}")]
    SwapInvalid(&'static str),
    #[error("{what} unavailable")]
    DependencyUnavailable {
        what: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl SchedError {
    /// Erreur de validation des entrées (par opposition à une dépendance indisponible).
    pub fn is_validation(&self) -> bool {
        !matches!(self, SchedError::DependencyUnavailable { .. })
    }
}

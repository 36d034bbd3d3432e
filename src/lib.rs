#![forbid(unsafe_code)]
//! Roulement — génération et évaluation de plannings de soins (sans BD).
//!
//! - Allocation jour par jour matin / après-midi / nuit / repos, par dette d'équité.
//! - Contraintes dures : congés, nuit puis matin interdit, jours consécutifs bornés.
//! - Score qualité 0–100, détection de conflits, retouches manuelles.
//! - Stockage fichiers (JSON/CSV) derrière des traits de collaborateurs.

pub mod io;
pub mod model;
pub mod scheduler;
pub mod storage;

pub use model::{
    Absence, DateRange, Role, Roster, ShiftAssignment, ShiftType, StaffId, StaffMember,
    MAX_RANGE_DAYS,
};
pub use scheduler::{
    check_conflicts, check_rules, compute_quality, Allocator, Conflict, ConflictKind,
    GeneratedSchedule, OptimizationParameters, ProportionalAllocator, SchedError,
    ScheduleQualityMetrics, Scheduler, ScoreWeights, ShiftSplit,
};
pub use storage::{AbsenceSource, AssignmentStore, JsonStorage, StaffDirectory, Storage};

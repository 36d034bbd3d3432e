mod allocator;
mod assignment;
mod conflicts;
mod ledger;
mod mutate;
mod params;
mod quality;
mod types;
mod util;
mod view;

pub use allocator::{Allocator, DayContext, ProportionalAllocator};
pub use assignment::plan_day;
pub use conflicts::{check_conflicts, check_rules};
pub use ledger::{RunLedger, StaffTally};
pub use mutate::{set_shift, swap_shifts};
pub use params::{OptimizationParameters, ScoreWeights, ShiftSplit};
pub use quality::{compute_quality, compute_quality_with, ScheduleQualityMetrics, ScoreBreakdown};
pub use types::{Conflict, ConflictKind, SchedError};
pub use view::{AbsenceIndex, RosterView};

use crate::model::{Absence, DateRange, Role, ShiftAssignment, StaffId, StaffMember};
use crate::storage::{AbsenceSource, StaffDirectory};
use serde::Serialize;

/// Résultat d'une génération complète : affectations et indicateurs.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedSchedule {
    pub assignments: Vec<ShiftAssignment>,
    pub metrics: ScheduleQualityMetrics,
}

/// Scheduler : façade sans état autour d'une stratégie d'allocation
#[derive(Debug, Default)]
pub struct Scheduler<A: Allocator = ProportionalAllocator> {
    allocator: A,
    weights: ScoreWeights,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A: Allocator> Scheduler<A> {
    pub fn with_allocator(allocator: A) -> Self {
        Self {
            allocator,
            weights: ScoreWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Génère une affectation par personne et par date de `range`.
    pub fn generate(
        &self,
        range: &DateRange,
        staff: &[StaffMember],
        absences: &[Absence],
        params: &OptimizationParameters,
    ) -> Result<Vec<ShiftAssignment>, SchedError> {
        assignment::generate(&self.allocator, range, staff, absences, params)
    }

    /// Interroge les collaborateurs, génère le planning du rôle et le note.
    pub fn generate_schedule<D, S>(
        &self,
        directory: &D,
        absences: &S,
        range: &DateRange,
        role: Role,
        params: &OptimizationParameters,
    ) -> Result<GeneratedSchedule, SchedError>
    where
        D: StaffDirectory + ?Sized,
        S: AbsenceSource + ?Sized,
    {
        range.validate()?;
        params.validate()?;

        let mut staff = directory
            .list_staff(role)
            .map_err(|source| SchedError::DependencyUnavailable {
                what: "staff directory",
                source,
            })?;
        staff.retain(|m| m.role == role);

        let ids: Vec<StaffId> = staff.iter().map(|m| m.id.clone()).collect();
        let absences = absences
            .list_absences(&ids, range)
            .map_err(|source| SchedError::DependencyUnavailable {
                what: "absence source",
                source,
            })?;

        let assignments = self.generate(range, &staff, &absences, params)?;
        let metrics = self.compute_quality(&assignments, &staff);
        Ok(GeneratedSchedule {
            assignments,
            metrics,
        })
    }

    pub fn compute_quality(
        &self,
        assignments: &[ShiftAssignment],
        staff: &[StaffMember],
    ) -> ScheduleQualityMetrics {
        compute_quality_with(assignments, staff, &self.weights)
    }

    pub fn check_conflicts(
        &self,
        assignments: &[ShiftAssignment],
        absences: &[Absence],
    ) -> Vec<Conflict> {
        check_conflicts(assignments, absences)
    }

    pub fn check_rules(
        &self,
        assignments: &[ShiftAssignment],
        params: &OptimizationParameters,
    ) -> Vec<Conflict> {
        check_rules(assignments, params)
    }
}

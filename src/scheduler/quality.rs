//! Indicateurs de qualité d'un planning.
//!
//! | Composante | Poids | Calcul |
//! |------------|-------|--------|
//! | Équilibre de charge | 30 | `1 - (max - min) / moyenne` (moyenne nulle : plein score) |
//! | Équilibre week-end | 25 | `1 - (max - min) / max(1, moyenne)` |
//! | Transitions | 20 | `1 - min(1, nuits→matins / effectif)` |
//! | Base | 25 | constante |
//!
//! Le score global est la somme, bornée à [0, 100]. Les poids sont
//! configurables via [`ScoreWeights`].

use super::{util, ScoreWeights};
use crate::model::{ShiftAssignment, ShiftType, StaffId, StaffMember};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Détail des composantes du score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub workload_balance: f64,
    pub weekend_balance: f64,
    pub transitions: f64,
    pub base_distribution: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.workload_balance + self.weekend_balance + self.transitions + self.base_distribution
    }
}

/// Indicateurs calculés sur une liste d'affectations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScheduleQualityMetrics {
    pub shift_totals: BTreeMap<ShiftType, usize>,
    pub min_workload: u32,
    pub max_workload: u32,
    pub avg_workload: f64,
    pub min_weekend_workload: u32,
    pub max_weekend_workload: u32,
    pub avg_weekend_workload: f64,
    pub night_morning_violations: usize,
    pub overall_quality_score: f64,
    pub breakdown: ScoreBreakdown,
    /// Identifiants inconnus du personnel, exclus du calcul.
    pub excluded_staff: Vec<StaffId>,
}

impl ScheduleQualityMetrics {
    pub fn total(&self, shift: ShiftType) -> usize {
        self.shift_totals.get(&shift).copied().unwrap_or(0)
    }
}

/// Calcule les indicateurs avec la pondération par défaut.
pub fn compute_quality(
    assignments: &[ShiftAssignment],
    staff: &[StaffMember],
) -> ScheduleQualityMetrics {
    compute_quality_with(assignments, staff, &ScoreWeights::default())
}

pub fn compute_quality_with(
    assignments: &[ShiftAssignment],
    staff: &[StaffMember],
    weights: &ScoreWeights,
) -> ScheduleQualityMetrics {
    let mut per_staff: BTreeMap<&StaffId, Vec<&ShiftAssignment>> =
        staff.iter().map(|m| (&m.id, Vec::new())).collect();
    let mut excluded: BTreeSet<StaffId> = BTreeSet::new();

    for assignment in assignments {
        match per_staff.get_mut(&assignment.staff_id) {
            Some(list) => list.push(assignment),
            None => {
                excluded.insert(assignment.staff_id.clone());
            }
        }
    }
    if !excluded.is_empty() {
        warn!(
            count = excluded.len(),
            "assignments for unknown staff excluded from quality metrics"
        );
    }
    let excluded_staff: Vec<StaffId> = excluded.into_iter().collect();

    if per_staff.is_empty() {
        return ScheduleQualityMetrics {
            excluded_staff,
            ..ScheduleQualityMetrics::default()
        };
    }

    let mut shift_totals: BTreeMap<ShiftType, usize> =
        ShiftType::ALL.iter().map(|s| (*s, 0)).collect();
    let mut workloads = Vec::with_capacity(per_staff.len());
    let mut weekend_loads = Vec::with_capacity(per_staff.len());
    let mut violations = 0usize;

    for list in per_staff.values_mut() {
        util::sort_assignments(list);
        let mut work = 0u32;
        let mut weekend = 0u32;
        for a in list.iter() {
            *shift_totals.entry(a.shift).or_insert(0) += 1;
            if a.shift.is_work() {
                work += 1;
                if util::is_weekend(a.date) {
                    weekend += 1;
                }
            }
        }
        violations += list
            .windows(2)
            .filter(|pair| {
                pair[0].shift == ShiftType::Night
                    && pair[1].shift == ShiftType::Morning
                    && util::is_next_day(pair[0].date, pair[1].date)
            })
            .count();
        workloads.push(work);
        weekend_loads.push(weekend);
    }

    let (min_workload, max_workload, avg_workload) = spread(&workloads);
    let (min_weekend, max_weekend, avg_weekend) = spread(&weekend_loads);

    let workload_balance = if avg_workload > 0.0 {
        weights.workload_balance * (1.0 - f64::from(max_workload - min_workload) / avg_workload)
    } else {
        weights.workload_balance
    };
    let weekend_balance = weights.weekend_balance
        * (1.0 - f64::from(max_weekend - min_weekend) / avg_weekend.max(1.0));
    let staff_count = per_staff.len().max(1) as f64;
    let transitions = weights.transitions * (1.0 - (violations as f64 / staff_count).min(1.0));

    let breakdown = ScoreBreakdown {
        workload_balance,
        weekend_balance,
        transitions,
        base_distribution: weights.base_distribution,
    };

    ScheduleQualityMetrics {
        shift_totals,
        min_workload,
        max_workload,
        avg_workload,
        min_weekend_workload: min_weekend,
        max_weekend_workload: max_weekend,
        avg_weekend_workload: avg_weekend,
        night_morning_violations: violations,
        overall_quality_score: breakdown.total().clamp(0.0, 100.0),
        breakdown,
        excluded_staff,
    }
}

/// (min, max, moyenne) ; zéros pour une liste vide.
fn spread(values: &[u32]) -> (u32, u32, f64) {
    let Some(min) = values.iter().min().copied() else {
        return (0, 0, 0.0);
    };
    let max = values.iter().max().copied().unwrap_or(min);
    let sum: u64 = values.iter().map(|v| u64::from(*v)).sum();
    (min, max, sum as f64 / values.len() as f64)
}

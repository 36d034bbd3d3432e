use super::{util, view::AbsenceIndex, Conflict, ConflictKind, OptimizationParameters};
use crate::model::{Absence, ShiftAssignment, ShiftType, StaffId};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Doublons (personne, date) et postes tenus pendant une absence.
///
/// Résultat trié par personne puis date ; vide si la liste est saine.
pub fn check_conflicts(assignments: &[ShiftAssignment], absences: &[Absence]) -> Vec<Conflict> {
    let index = AbsenceIndex::new(absences);
    let mut out = Vec::new();

    for ((staff, date), shifts) in group_by_day(assignments) {
        if shifts.len() > 1 {
            out.push(Conflict {
                staff_id: staff.clone(),
                date,
                kind: ConflictKind::DoubleBooking,
                shifts: shifts.clone(),
            });
        }

        if index.is_absent(staff, date) {
            let offending: Vec<ShiftType> = shifts
                .iter()
                .copied()
                .filter(|s| *s != ShiftType::Vacation)
                .collect();
            if !offending.is_empty() {
                out.push(Conflict {
                    staff_id: staff.clone(),
                    date,
                    kind: ConflictKind::AbsenceViolation,
                    shifts: offending,
                });
            }
        }
    }

    out
}

/// Règles de roulement : nuit suivie d'un matin (si la règle est active)
/// et séries travaillées plus longues que `max_consecutive_work_days`.
///
/// Une série trop longue n'est signalée qu'une fois, au premier jour en excès.
pub fn check_rules(
    assignments: &[ShiftAssignment],
    params: &OptimizationParameters,
) -> Vec<Conflict> {
    let mut per_staff: BTreeMap<&StaffId, Vec<(NaiveDate, Vec<ShiftType>)>> = BTreeMap::new();
    for ((staff, date), shifts) in group_by_day(assignments) {
        per_staff.entry(staff).or_default().push((date, shifts));
    }

    let mut out = Vec::new();
    for (staff, days) in per_staff {
        let mut prev: Option<(NaiveDate, bool)> = None;
        let mut streak = 0u32;

        for (date, shifts) in days {
            let worked = shifts.iter().any(ShiftType::is_work);
            let contiguous = prev.is_some_and(|(d, _)| util::is_next_day(d, date));

            streak = match (worked, contiguous) {
                (false, _) => 0,
                (true, true) => streak + 1,
                (true, false) => 1,
            };
            if streak == params.max_consecutive_work_days.saturating_add(1) {
                out.push(Conflict {
                    staff_id: staff.clone(),
                    date,
                    kind: ConflictKind::ConsecutiveWorkExceeded,
                    shifts: shifts.clone(),
                });
            }

            let after_night = contiguous && prev.is_some_and(|(_, night)| night);
            if params.avoid_night_after_morning
                && after_night
                && shifts.contains(&ShiftType::Morning)
            {
                out.push(Conflict {
                    staff_id: staff.clone(),
                    date,
                    kind: ConflictKind::ForbiddenTransition,
                    shifts: vec![ShiftType::Night, ShiftType::Morning],
                });
            }

            prev = Some((date, shifts.contains(&ShiftType::Night)));
        }
    }

    out
}

fn group_by_day(assignments: &[ShiftAssignment]) -> BTreeMap<(&StaffId, NaiveDate), Vec<ShiftType>> {
    let mut by_day: BTreeMap<(&StaffId, NaiveDate), Vec<ShiftType>> = BTreeMap::new();
    for a in assignments {
        by_day.entry((&a.staff_id, a.date)).or_default().push(a.shift);
    }
    for shifts in by_day.values_mut() {
        shifts.sort();
    }
    by_day
}

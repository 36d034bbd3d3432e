use super::{conflicts, OptimizationParameters, SchedError};
use crate::model::{ShiftAssignment, ShiftType, StaffId};
use chrono::NaiveDate;

/// Remplace le poste d'une personne à une date (saisie manuelle).
/// Retourne le poste précédent.
pub fn set_shift(
    assignments: &mut [ShiftAssignment],
    staff: &StaffId,
    date: NaiveDate,
    shift: ShiftType,
) -> Result<ShiftType, SchedError> {
    let pos = find(assignments, staff, date)?;
    let entry = &mut assignments[pos];
    let previous = entry.shift;
    entry.shift = shift;
    entry.manually_assigned = true;
    Ok(previous)
}

/// Échange les postes de deux personnes à une date (idempotent si identiques).
///
/// Refuse les congés et annule l'échange s'il crée une violation de règle
/// pour l'une des deux personnes.
pub fn swap_shifts(
    assignments: &mut [ShiftAssignment],
    date: NaiveDate,
    a: &StaffId,
    b: &StaffId,
    params: &OptimizationParameters,
) -> Result<(), SchedError> {
    if a == b {
        return Err(SchedError::SwapInvalid("cannot swap with oneself"));
    }
    let pa = find(assignments, a, date)?;
    let pb = find(assignments, b, date)?;

    let (shift_a, shift_b) = (assignments[pa].shift, assignments[pb].shift);
    if shift_a == ShiftType::Vacation || shift_b == ShiftType::Vacation {
        return Err(SchedError::SwapInvalid("vacation cannot be swapped"));
    }
    if shift_a == shift_b {
        return Ok(());
    }

    let before = violations_for(assignments, a, b, params);
    let manual = (assignments[pa].manually_assigned, assignments[pb].manually_assigned);

    assignments[pa].shift = shift_b;
    assignments[pb].shift = shift_a;
    assignments[pa].manually_assigned = true;
    assignments[pb].manually_assigned = true;

    if violations_for(assignments, a, b, params) > before {
        assignments[pa].shift = shift_a;
        assignments[pb].shift = shift_b;
        assignments[pa].manually_assigned = manual.0;
        assignments[pb].manually_assigned = manual.1;
        return Err(SchedError::SwapInvalid("introduces rule violation"));
    }
    Ok(())
}

fn find(assignments: &[ShiftAssignment], staff: &StaffId, date: NaiveDate) -> Result<usize, SchedError> {
    assignments
        .iter()
        .position(|x| &x.staff_id == staff && x.date == date)
        .ok_or_else(|| SchedError::NoAssignment {
            staff: staff.clone(),
            date,
        })
}

fn violations_for(
    assignments: &[ShiftAssignment],
    a: &StaffId,
    b: &StaffId,
    params: &OptimizationParameters,
) -> usize {
    let subset: Vec<ShiftAssignment> = assignments
        .iter()
        .filter(|x| &x.staff_id == a || &x.staff_id == b)
        .cloned()
        .collect();
    conflicts::check_rules(&subset, params).len()
}

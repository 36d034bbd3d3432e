use crate::model::ShiftAssignment;
use chrono::{Datelike, NaiveDate, Weekday};

pub(super) fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Vrai si `next` est le lendemain de `prev`.
pub(super) fn is_next_day(prev: NaiveDate, next: NaiveDate) -> bool {
    (next - prev).num_days() == 1
}

/// Tri total, indépendant de l'ordre d'entrée.
pub(super) fn sort_assignments(list: &mut [&ShiftAssignment]) {
    list.sort_by(|a, b| {
        a.staff_id
            .cmp(&b.staff_id)
            .then_with(|| a.date.cmp(&b.date))
            .then_with(|| a.shift.cmp(&b.shift))
            .then_with(|| a.manually_assigned.cmp(&b.manually_assigned))
    });
}

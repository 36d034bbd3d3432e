use super::{
    allocator::{Allocator, DayContext},
    ledger::RunLedger,
    util,
    view::{AbsenceIndex, RosterView},
    OptimizationParameters, SchedError,
};
use crate::model::{Absence, DateRange, ShiftAssignment, ShiftType, StaffId, StaffMember};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, info_span, warn};

pub(super) fn generate<A: Allocator + ?Sized>(
    allocator: &A,
    range: &DateRange,
    staff: &[StaffMember],
    absences: &[Absence],
    params: &OptimizationParameters,
) -> Result<Vec<ShiftAssignment>, SchedError> {
    range.validate()?;
    params.validate()?;
    let view = RosterView::new(staff)?;
    if view.is_empty() {
        return Ok(Vec::new());
    }
    let index = AbsenceIndex::new(absences);

    let span = info_span!(
        "generate",
        range = %range,
        staff = view.len(),
        allocator = allocator.name()
    );
    let _guard = span.enter();

    let days = usize::try_from(range.len_days()).unwrap_or(0);
    let mut out = Vec::with_capacity(view.len() * days);
    let mut ledger = RunLedger::new();

    for date in range.days() {
        let day = plan_day(allocator, date, &view, &index, &ledger, params);
        let weekend = util::is_weekend(date);
        for (id, shift) in &day {
            ledger.record(id, *shift, weekend);
        }
        out.extend(
            day.into_iter()
                .map(|(id, shift)| ShiftAssignment::new(id, date, shift)),
        );
    }

    info!(assignments = out.len(), "schedule generated");
    Ok(out)
}

/// Alloue une journée : congés, repos imposés, proposition de l'allocateur,
/// puis application des contraintes dures. Une entrée par personne de la vue,
/// triée par identifiant.
pub fn plan_day<A: Allocator + ?Sized>(
    allocator: &A,
    date: NaiveDate,
    view: &RosterView,
    index: &AbsenceIndex,
    ledger: &RunLedger,
    params: &OptimizationParameters,
) -> Vec<(StaffId, ShiftType)> {
    let mut day: BTreeMap<StaffId, ShiftType> = BTreeMap::new();
    let mut candidates: Vec<&StaffMember> = Vec::new();
    let mut headcount = 0usize;

    for member in view.iter() {
        if index.is_absent(&member.id, date) {
            day.insert(member.id.clone(), ShiftType::Vacation);
            continue;
        }
        headcount += 1;
        if ledger
            .tally(&member.id)
            .at_work_limit(params.max_consecutive_work_days)
        {
            debug!(staff = %member.id, %date, "forced rest after consecutive work days");
            day.insert(member.id.clone(), ShiftType::Rest);
            continue;
        }
        candidates.push(member);
    }

    let eligible: BTreeSet<&StaffId> = candidates.iter().map(|m| &m.id).collect();
    let ctx = DayContext {
        date,
        headcount,
        candidates: &candidates,
        ledger,
        params,
    };

    for (id, shift) in allocator.assign_day(&ctx) {
        if !eligible.contains(&id) {
            warn!(staff = %id, %date, "allocator proposed a non-candidate, ignored");
            continue;
        }
        if day.contains_key(&id) {
            warn!(staff = %id, %date, "allocator proposed twice, first kept");
            continue;
        }
        let shift = match shift {
            ShiftType::Vacation => {
                warn!(staff = %id, %date, "allocator proposed vacation outside an absence");
                ShiftType::Rest
            }
            ShiftType::Morning
                if params.avoid_night_after_morning
                    && ledger.tally(&id).last_shift == Some(ShiftType::Night) =>
            {
                warn!(staff = %id, %date, "morning right after night demoted to rest");
                ShiftType::Rest
            }
            other => other,
        };
        day.insert(id, shift);
    }

    for member in &candidates {
        day.entry(member.id.clone()).or_insert(ShiftType::Rest);
    }

    debug!(
        %date,
        headcount,
        candidates = candidates.len(),
        "day allocated"
    );
    day.into_iter().collect()
}

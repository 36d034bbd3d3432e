use super::SchedError;
use crate::model::{Absence, StaffId, StaffMember};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::warn;

/// Instantané immuable du personnel d'une génération, indexé par id.
///
/// L'ordre d'itération est celui des identifiants, indépendamment de
/// l'ordre fourni par l'appelant.
#[derive(Debug, Clone, Default)]
pub struct RosterView {
    staff: BTreeMap<StaffId, StaffMember>,
}

impl RosterView {
    /// Construit la vue ; une quotité hors 1..=100 est refusée et
    /// un identifiant en double conserve la première occurrence.
    pub fn new(members: &[StaffMember]) -> Result<Self, SchedError> {
        let mut staff = BTreeMap::new();
        for member in members {
            if !(1..=100).contains(&member.working_percentage) {
                return Err(SchedError::InvalidStaff {
                    id: member.id.clone(),
                    reason: "working percentage must be within 1..=100",
                });
            }
            if staff.contains_key(&member.id) {
                warn!(staff = %member.id, "duplicate staff id ignored");
                continue;
            }
            staff.insert(member.id.clone(), member.clone());
        }
        Ok(Self { staff })
    }

    pub fn iter(&self) -> impl Iterator<Item = &StaffMember> {
        self.staff.values()
    }

    pub fn len(&self) -> usize {
        self.staff.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staff.is_empty()
    }
}

/// Index des absences par personne.
#[derive(Debug, Clone, Default)]
pub struct AbsenceIndex {
    by_staff: BTreeMap<StaffId, Vec<(NaiveDate, NaiveDate)>>,
}

impl AbsenceIndex {
    pub fn new(absences: &[Absence]) -> Self {
        let mut by_staff: BTreeMap<StaffId, Vec<(NaiveDate, NaiveDate)>> = BTreeMap::new();
        for absence in absences {
            if absence.end < absence.start {
                warn!(
                    staff = %absence.staff_id,
                    start = %absence.start,
                    end = %absence.end,
                    "inverted absence ignored"
                );
                continue;
            }
            by_staff
                .entry(absence.staff_id.clone())
                .or_default()
                .push((absence.start, absence.end));
        }
        for ranges in by_staff.values_mut() {
            ranges.sort();
        }
        Self { by_staff }
    }

    pub fn is_absent(&self, id: &StaffId, date: NaiveDate) -> bool {
        self.by_staff
            .get(id)
            .is_some_and(|ranges| ranges.iter().any(|(s, e)| *s <= date && date <= *e))
    }
}

use crate::model::{ShiftType, StaffId};
use std::collections::BTreeMap;

/// Compteurs d'une personne pour la génération en cours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaffTally {
    pub work_shifts: u32,
    pub weekend_shifts: u32,
    pub consecutive_work: u32,
    pub consecutive_nights: u32,
    pub consecutive_rest: u32,
    /// Poste de la veille (`None` le premier jour).
    pub last_shift: Option<ShiftType>,
}

impl StaffTally {
    pub fn record(&mut self, shift: ShiftType, weekend: bool) {
        if shift.is_work() {
            self.work_shifts += 1;
            if weekend {
                self.weekend_shifts += 1;
            }
            self.consecutive_work += 1;
            self.consecutive_rest = 0;
            if shift == ShiftType::Night {
                self.consecutive_nights += 1;
            } else {
                self.consecutive_nights = 0;
            }
        } else {
            self.consecutive_work = 0;
            self.consecutive_nights = 0;
            self.consecutive_rest += 1;
        }
        self.last_shift = Some(shift);
    }

    /// Dette d'équité : postes travaillés rapportés à la quotité.
    pub fn debt(&self, part_time_ratio: f64, normalize: bool) -> f64 {
        normalized(self.work_shifts, part_time_ratio, normalize)
    }

    pub fn weekend_debt(&self, part_time_ratio: f64, normalize: bool) -> f64 {
        normalized(self.weekend_shifts, part_time_ratio, normalize)
    }

    /// Vrai si un jour travaillé de plus dépasserait `max_consecutive`.
    pub fn at_work_limit(&self, max_consecutive: u32) -> bool {
        self.consecutive_work >= max_consecutive
    }
}

fn normalized(count: u32, ratio: f64, normalize: bool) -> f64 {
    if normalize {
        f64::from(count) / ratio
    } else {
        f64::from(count)
    }
}

/// Accumulateur de la génération, transmis de jour en jour.
#[derive(Debug, Clone, Default)]
pub struct RunLedger {
    tallies: BTreeMap<StaffId, StaffTally>,
}

impl RunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tally(&self, id: &StaffId) -> StaffTally {
        self.tallies.get(id).copied().unwrap_or_default()
    }

    pub fn record(&mut self, id: &StaffId, shift: ShiftType, weekend: bool) {
        self.tallies
            .entry(id.clone())
            .or_default()
            .record(shift, weekend);
    }
}

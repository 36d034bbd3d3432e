use crate::scheduler::SchedError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Durée maximale (en jours, bornes incluses) d'une génération.
pub const MAX_RANGE_DAYS: i64 = 31;

/// Identifiant fort pour un membre du personnel
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffId(String);

impl StaffId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rôle du personnel soignant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Nurse,
    Oss,
    HeadNurse,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Nurse => "nurse",
            Role::Oss => "oss",
            Role::HeadNurse => "head_nurse",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nurse" => Ok(Role::Nurse),
            "oss" => Ok(Role::Oss),
            "head_nurse" | "head-nurse" | "headnurse" => Ok(Role::HeadNurse),
            _ => Err(SchedError::UnknownRole(s.to_string())),
        }
    }
}

/// Membre du personnel, figé pendant une génération.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: StaffId,
    pub role: Role,
    /// Quotité de travail, 1 à 100 (%).
    pub working_percentage: u8,
    #[serde(default)]
    pub years_of_experience: u16,
    #[serde(default)]
    pub available_for_extra_shifts: bool,
}

impl StaffMember {
    /// Temps plein, sans ancienneté ni disponibilité supplémentaire.
    pub fn new<S: AsRef<str>>(id: S, role: Role) -> Self {
        Self {
            id: StaffId::new(id),
            role,
            working_percentage: 100,
            years_of_experience: 0,
            available_for_extra_shifts: false,
        }
    }

    pub fn with_working_percentage(mut self, pct: u8) -> Self {
        self.working_percentage = pct;
        self
    }

    pub fn with_experience(mut self, years: u16) -> Self {
        self.years_of_experience = years;
        self
    }

    pub fn with_extra_shifts(mut self, available: bool) -> Self {
        self.available_for_extra_shifts = available;
        self
    }

    /// Quotité ramenée à [0.01, 1.0].
    pub fn part_time_ratio(&self) -> f64 {
        f64::from(self.working_percentage.clamp(1, 100)) / 100.0
    }
}

/// Absence validée (congés, maladie), bornes incluses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Absence {
    pub staff_id: StaffId,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Absence {
    pub fn new(staff_id: StaffId, start: NaiveDate, end: NaiveDate) -> Result<Self, SchedError> {
        if end < start {
            return Err(SchedError::RangeInverted { start, end });
        }
        Ok(Self {
            staff_id,
            start,
            end,
        })
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, range: &DateRange) -> bool {
        self.start <= range.end && range.start <= self.end
    }
}

/// Type de poste pour une journée
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    Morning,
    Afternoon,
    Night,
    Rest,
    Vacation,
}

impl ShiftType {
    pub const WORK: [ShiftType; 3] = [ShiftType::Morning, ShiftType::Afternoon, ShiftType::Night];
    pub const ALL: [ShiftType; 5] = [
        ShiftType::Morning,
        ShiftType::Afternoon,
        ShiftType::Night,
        ShiftType::Rest,
        ShiftType::Vacation,
    ];

    /// Matin, après-midi et nuit sont travaillés ; repos et congés non.
    pub fn is_work(&self) -> bool {
        matches!(self, ShiftType::Morning | ShiftType::Afternoon | ShiftType::Night)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftType::Morning => "morning",
            ShiftType::Afternoon => "afternoon",
            ShiftType::Night => "night",
            ShiftType::Rest => "rest",
            ShiftType::Vacation => "vacation",
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftType {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" | "m" => Ok(ShiftType::Morning),
            "afternoon" | "a" => Ok(ShiftType::Afternoon),
            "night" | "n" => Ok(ShiftType::Night),
            "rest" | "r" => Ok(ShiftType::Rest),
            "vacation" | "v" => Ok(ShiftType::Vacation),
            _ => Err(SchedError::UnknownShift(s.to_string())),
        }
    }
}

/// Affectation d'un poste à une personne pour une date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    pub staff_id: StaffId,
    pub date: NaiveDate,
    pub shift: ShiftType,
    #[serde(default)]
    pub manually_assigned: bool,
}

impl ShiftAssignment {
    pub fn new(staff_id: StaffId, date: NaiveDate, shift: ShiftType) -> Self {
        Self {
            staff_id,
            date,
            shift,
            manually_assigned: false,
        }
    }
}

/// Intervalle de dates, bornes incluses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Nombre de jours couverts (négatif ou nul si l'intervalle est inversé).
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Vérifie l'ordre des bornes et la taille maximale d'une génération.
    pub fn validate(&self) -> Result<(), SchedError> {
        if self.start > self.end {
            return Err(SchedError::RangeInverted {
                start: self.start,
                end: self.end,
            });
        }
        let days = self.len_days();
        if days > MAX_RANGE_DAYS {
            return Err(SchedError::RangeTooLarge {
                days,
                max: MAX_RANGE_DAYS,
            });
        }
        Ok(())
    }

    /// Dates du premier au dernier jour, dans l'ordre.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Planning complet tel que persisté par le stockage fichier.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Roster {
    #[serde(default)]
    pub staff: Vec<StaffMember>,
    #[serde(default)]
    pub absences: Vec<Absence>,
    #[serde(default)]
    pub assignments: Vec<ShiftAssignment>,
}

impl Roster {
    pub fn find_staff_by_id<'a>(&'a self, id: &StaffId) -> Option<&'a StaffMember> {
        self.staff.iter().find(|s| &s.id == id)
    }

    pub fn staff_by_role(&self, role: Role) -> Vec<StaffMember> {
        self.staff.iter().filter(|s| s.role == role).cloned().collect()
    }

    pub fn absences_for(&self, ids: &[StaffId], range: &DateRange) -> Vec<Absence> {
        self.absences
            .iter()
            .filter(|a| ids.contains(&a.staff_id) && a.overlaps(range))
            .cloned()
            .collect()
    }

    pub fn assignments_in(&self, range: &DateRange) -> Vec<ShiftAssignment> {
        self.assignments
            .iter()
            .filter(|a| range.contains(a.date))
            .cloned()
            .collect()
    }

    /// Remplace par `fresh` les affectations de l'intervalle appartenant aux
    /// personnes présentes dans `fresh` ; les autres rôles restent intacts.
    /// Retourne le nombre d'affectations insérées.
    pub fn replace_range(&mut self, range: &DateRange, fresh: &[ShiftAssignment]) -> usize {
        let regenerated: BTreeSet<&StaffId> = fresh.iter().map(|a| &a.staff_id).collect();
        self.assignments
            .retain(|a| !(range.contains(a.date) && regenerated.contains(&a.staff_id)));
        self.assignments.extend(fresh.iter().cloned());
        self.assignments
            .sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.staff_id.cmp(&b.staff_id)));
        fresh.len()
    }
}

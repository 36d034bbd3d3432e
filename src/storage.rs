use crate::model::{Absence, DateRange, Role, Roster, ShiftAssignment, StaffId, StaffMember};
use anyhow::Context;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub trait Storage {
    /// Charge un roster depuis un support.
    fn load(&self) -> anyhow::Result<Roster>;
    /// Sauvegarde de manière atomique.
    fn save(&self, roster: &Roster) -> anyhow::Result<()>;
}

/// Annuaire du personnel.
pub trait StaffDirectory {
    fn list_staff(&self, role: Role) -> anyhow::Result<Vec<StaffMember>>;
}

/// Source des absences validées.
pub trait AbsenceSource {
    /// Absences des personnes `staff_ids` qui chevauchent `range`.
    fn list_absences(&self, staff_ids: &[StaffId], range: &DateRange)
        -> anyhow::Result<Vec<Absence>>;
}

/// Persistance des affectations générées.
pub trait AssignmentStore {
    /// Remplace atomiquement les affectations de `range` des personnes présentes
    /// dans `assignments` ; retourne le nombre inséré.
    fn persist_assignments(
        &self,
        range: &DateRange,
        assignments: &[ShiftAssignment],
    ) -> anyhow::Result<usize>;
}

impl StaffDirectory for Roster {
    fn list_staff(&self, role: Role) -> anyhow::Result<Vec<StaffMember>> {
        Ok(self.staff_by_role(role))
    }
}

impl AbsenceSource for Roster {
    fn list_absences(
        &self,
        staff_ids: &[StaffId],
        range: &DateRange,
    ) -> anyhow::Result<Vec<Absence>> {
        Ok(self.absences_for(staff_ids, range))
    }
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Comme `load`, mais un fichier absent donne un roster vide.
    pub fn load_or_default(&self) -> anyhow::Result<Roster> {
        match fs::metadata(&self.path) {
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no roster file yet");
                Ok(Roster::default())
            }
            _ => self.load(),
        }
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Roster> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let roster: Roster =
            serde_json::from_slice(&data).with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(roster)
    }

    fn save(&self, roster: &Roster) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(roster)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}

impl StaffDirectory for JsonStorage {
    fn list_staff(&self, role: Role) -> anyhow::Result<Vec<StaffMember>> {
        Ok(self.load_or_default()?.staff_by_role(role))
    }
}

impl AbsenceSource for JsonStorage {
    fn list_absences(
        &self,
        staff_ids: &[StaffId],
        range: &DateRange,
    ) -> anyhow::Result<Vec<Absence>> {
        Ok(self.load_or_default()?.absences_for(staff_ids, range))
    }
}

impl AssignmentStore for JsonStorage {
    fn persist_assignments(
        &self,
        range: &DateRange,
        assignments: &[ShiftAssignment],
    ) -> anyhow::Result<usize> {
        let mut roster = self.load_or_default()?;
        let count = roster.replace_range(range, assignments);
        self.save(&roster)?;
        debug!(%range, count, "assignments persisted");
        Ok(count)
    }
}

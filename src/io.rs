use crate::model::{Absence, Role, Roster, ShiftAssignment, StaffId, StaffMember};
use crate::scheduler::{Conflict, OptimizationParameters};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import du personnel depuis CSV :
/// header `id,role,working_percentage[,years_of_experience][,available_for_extra_shifts]`.
/// Un `id` vide reçoit un identifiant aléatoire.
pub fn import_staff_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<StaffMember>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = rec.get(0).context("missing id")?.trim();
        let role: Role = rec
            .get(1)
            .context("missing role")?
            .parse()
            .with_context(|| format!("invalid role for staff {id}"))?;
        let pct: u8 = rec
            .get(2)
            .context("missing working_percentage")?
            .trim()
            .parse()
            .with_context(|| format!("invalid working_percentage for staff {id}"))?;
        if !(1..=100).contains(&pct) {
            bail!("working_percentage must be within 1..=100 for staff {id}");
        }

        let mut member = if id.is_empty() {
            let mut m = StaffMember::new("", role);
            m.id = StaffId::random();
            m
        } else {
            StaffMember::new(id, role)
        };
        member.working_percentage = pct;

        if let Some(years) = rec.get(3).map(str::trim).filter(|s| !s.is_empty()) {
            member.years_of_experience = years
                .parse()
                .with_context(|| format!("invalid years_of_experience for staff {id}"))?;
        }
        if let Some(flag) = rec.get(4).map(str::trim).filter(|s| !s.is_empty()) {
            member.available_for_extra_shifts = parse_bool(flag)
                .with_context(|| format!("invalid available_for_extra_shifts for staff {id}"))?;
        }
        out.push(member);
    }
    Ok(out)
}

/// Import des absences : header `staff_id,start,end` (dates `YYYY-MM-DD`, bornes incluses).
pub fn import_absences_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Absence>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let staff = rec.get(0).context("missing staff_id")?.trim();
        if staff.is_empty() {
            bail!("invalid absence row (empty staff_id)");
        }
        let start = parse_date(rec.get(1).context("missing start")?)?;
        let end = parse_date(rec.get(2).context("missing end")?)?;
        let absence = Absence::new(StaffId::new(staff), start, end)
            .with_context(|| format!("invalid absence for staff {staff}"))?;
        out.push(absence);
    }
    Ok(out)
}

pub fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date: {}", raw.trim()))
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" => Ok(true),
        "false" | "0" | "no" | "n" | "non" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

/// Charge des paramètres d'optimisation (JSON partiel accepté) et les valide.
pub fn load_params_json<P: AsRef<Path>>(path: P) -> anyhow::Result<OptimizationParameters> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let params: OptimizationParameters = serde_json::from_slice(&data)
        .with_context(|| format!("parsing {}", path.display()))?;
    params.validate()?;
    Ok(params)
}

/// Export JSON du roster (jolie mise en forme)
pub fn export_roster_json<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(roster)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des affectations : header `staff_id,date,shift,manually_assigned`
pub fn export_assignments_csv<P: AsRef<Path>>(
    path: P,
    assignments: &[ShiftAssignment],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["staff_id", "date", "shift", "manually_assigned"])?;
    for a in assignments {
        let date = a.date.to_string();
        w.write_record([
            a.staff_id.as_str(),
            date.as_str(),
            a.shift.as_str(),
            if a.manually_assigned { "true" } else { "false" },
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des conflits : header `staff_id,date,kind,shifts`
pub fn export_conflicts_csv<P: AsRef<Path>>(path: P, conflicts: &[Conflict]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["staff_id", "date", "kind", "shifts"])?;
    for c in conflicts {
        let date = c.date.to_string();
        let shifts = c
            .shifts
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(";");
        w.write_record([c.staff_id.as_str(), date.as_str(), c.kind.as_str(), shifts.as_str()])?;
    }
    w.flush()?;
    Ok(())
}

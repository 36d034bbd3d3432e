#![forbid(unsafe_code)]
use chrono::NaiveDate;
use roulement::{
    io, AssignmentStore, DateRange, JsonStorage, OptimizationParameters, Role, Roster, Scheduler,
    ShiftAssignment, ShiftType, StaffId, StaffMember, Storage,
};
use std::fs;
use tempfile::tempdir;

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
}

fn sa(id: &str, day: u32, shift: ShiftType) -> ShiftAssignment {
    ShiftAssignment::new(StaffId::new(id), d(day), shift)
}

#[test]
fn missing_roster_file_loads_empty() {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("roster.json")).unwrap();
    let roster = storage.load_or_default().unwrap();
    assert!(roster.staff.is_empty());
    assert!(storage.load().is_err());
}

#[test]
fn save_and_load_roundtrip() {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("roster.json")).unwrap();
    let mut roster = Roster::default();
    roster.staff.push(
        StaffMember::new("n01", Role::HeadNurse)
            .with_working_percentage(80)
            .with_experience(12)
            .with_extra_shifts(true),
    );
    roster.assignments.push(sa("n01", 3, ShiftType::Night));
    storage.save(&roster).unwrap();

    let loaded = storage.load().unwrap();
    assert_eq!(loaded.staff, roster.staff);
    assert_eq!(loaded.assignments, roster.assignments);
}

#[test]
fn persist_replaces_only_the_given_range() {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("roster.json")).unwrap();
    let mut roster = Roster::default();
    roster.assignments = vec![
        sa("n01", 1, ShiftType::Morning),
        sa("n01", 3, ShiftType::Morning),
        sa("n01", 5, ShiftType::Morning),
    ];
    storage.save(&roster).unwrap();

    let fresh = vec![sa("n01", 3, ShiftType::Night), sa("n01", 4, ShiftType::Rest)];
    let count = storage
        .persist_assignments(&DateRange::new(d(3), d(4)), &fresh)
        .unwrap();
    assert_eq!(count, 2);

    let loaded = storage.load().unwrap();
    assert_eq!(
        loaded.assignments,
        vec![
            sa("n01", 1, ShiftType::Morning),
            sa("n01", 3, ShiftType::Night),
            sa("n01", 4, ShiftType::Rest),
            sa("n01", 5, ShiftType::Morning),
        ]
    );
}

#[test]
fn persisting_one_role_keeps_other_roles() {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("roster.json")).unwrap();
    let mut roster = Roster::default();
    roster.staff.push(StaffMember::new("n1", Role::Nurse));
    roster.staff.push(StaffMember::new("o1", Role::Oss));
    storage.save(&roster).unwrap();

    let range = DateRange::new(d(3), d(9));
    let params = OptimizationParameters::default();
    let engine = Scheduler::new();
    for role in [Role::Nurse, Role::Oss] {
        let generated = engine
            .generate_schedule(&storage, &storage, &range, role, &params)
            .unwrap();
        assert_eq!(storage.persist_assignments(&range, &generated.assignments).unwrap(), 7);
    }

    let loaded = storage.load().unwrap();
    let rows = |id: &str| loaded.assignments.iter().filter(|a| a.staff_id.as_str() == id).count();
    assert_eq!(rows("n1"), 7);
    assert_eq!(rows("o1"), 7);

    // régénérer les infirmiers remplace leurs lignes sans doublon
    let generated = engine
        .generate_schedule(&storage, &storage, &range, Role::Nurse, &params)
        .unwrap();
    storage.persist_assignments(&range, &generated.assignments).unwrap();
    let loaded = storage.load().unwrap();
    assert_eq!(loaded.assignments.len(), 14);
}

#[test]
fn import_staff_csv_with_optional_columns() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("staff.csv");
    fs::write(
        &path,
        "id,role,working_percentage,years_of_experience,available_for_extra_shifts\n\
         n01,nurse,100,5,oui\n\
         o01,oss,50,,\n\
         ,head_nurse,100\n",
    )
    .unwrap();

    let staff = io::import_staff_csv(&path).unwrap();
    assert_eq!(staff.len(), 3);
    assert_eq!(staff[0].years_of_experience, 5);
    assert!(staff[0].available_for_extra_shifts);
    assert_eq!(staff[1].role, Role::Oss);
    assert_eq!(staff[1].working_percentage, 50);
    assert_eq!(staff[2].role, Role::HeadNurse);
    assert_eq!(staff[2].id.as_str().len(), 36);
}

#[test]
fn import_staff_csv_rejects_unknown_role() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("staff.csv");
    fs::write(&path, "id,role,working_percentage\nx1,surgeon,100\n").unwrap();
    let err = io::import_staff_csv(&path).unwrap_err();
    assert!(format!("{err:#}").contains("unknown role: surgeon"));
}

#[test]
fn import_absences_csv() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absences.csv");
    fs::write(&path, "staff_id,start,end\nn01,2025-03-04,2025-03-06\n").unwrap();
    let absences = io::import_absences_csv(&path).unwrap();
    assert_eq!(absences.len(), 1);
    assert!(absences[0].covers(d(6)));
    assert!(!absences[0].covers(d(7)));

    fs::write(&path, "staff_id,start,end\nn01,2025-03-06,2025-03-04\n").unwrap();
    assert!(io::import_absences_csv(&path).is_err());
}

#[test]
fn partial_params_file_keeps_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("params.json");
    fs::write(&path, r#"{"max_consecutive_work_days": 5, "split": {"night": 0.1}}"#).unwrap();
    let params = io::load_params_json(&path).unwrap();
    assert_eq!(params.max_consecutive_work_days, 5);
    assert!(params.avoid_night_after_morning);
    assert_eq!(params.split.morning, 0.4);
    assert_eq!(params.split.night, 0.1);

    fs::write(&path, r#"{"max_consecutive_work_days": 0}"#).unwrap();
    assert!(io::load_params_json(&path).is_err());
}

#[test]
fn export_assignments_csv_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let mut assignments = vec![sa("n01", 3, ShiftType::Morning), sa("n02", 3, ShiftType::Vacation)];
    assignments[1].manually_assigned = true;
    io::export_assignments_csv(&path, &assignments).unwrap();

    let csv = fs::read_to_string(&path).unwrap();
    insta::assert_snapshot!(csv.trim_end(), @r"
staff_id,date,shift,manually_assigned
n01,2025-03-03,morning,false
n02,2025-03-03,vacation,true
");
}

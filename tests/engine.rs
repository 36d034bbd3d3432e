#![forbid(unsafe_code)]
use anyhow::anyhow;
use chrono::NaiveDate;
use roulement::{
    check_rules, compute_quality, Absence, ConflictKind, DateRange, OptimizationParameters, Role,
    Roster, SchedError, Scheduler, ShiftAssignment, ShiftType, StaffDirectory, StaffId,
    StaffMember,
};
use std::collections::{BTreeMap, HashSet};

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
}

fn nurses(n: usize) -> Vec<StaffMember> {
    (1..=n)
        .map(|i| StaffMember::new(format!("n{i:02}"), Role::Nurse))
        .collect()
}

fn week() -> DateRange {
    // lundi 3 au dimanche 9 mars 2025
    DateRange::new(d(3), d(9))
}

fn counts_for(assignments: &[ShiftAssignment], date: NaiveDate) -> BTreeMap<ShiftType, usize> {
    let mut out = BTreeMap::new();
    for a in assignments.iter().filter(|a| a.date == date) {
        *out.entry(a.shift).or_insert(0) += 1;
    }
    out
}

#[test]
fn ten_nurses_one_week_follows_default_split() {
    let staff = nurses(10);
    let out = Scheduler::new()
        .generate(&week(), &staff, &[], &OptimizationParameters::default())
        .unwrap();

    assert_eq!(out.len(), 70);
    for date in week().days() {
        let counts = counts_for(&out, date);
        assert_eq!(counts.get(&ShiftType::Morning), Some(&4), "{date}");
        assert_eq!(counts.get(&ShiftType::Afternoon), Some(&3), "{date}");
        assert_eq!(counts.get(&ShiftType::Night), Some(&2), "{date}");
        assert_eq!(counts.get(&ShiftType::Rest), Some(&1), "{date}");
    }
}

#[test]
fn every_staff_date_pair_appears_exactly_once() {
    let staff = nurses(7);
    let absences = vec![Absence::new(StaffId::new("n02"), d(4), d(6)).unwrap()];
    let out = Scheduler::new()
        .generate(&week(), &staff, &absences, &OptimizationParameters::default())
        .unwrap();

    let pairs: HashSet<(StaffId, NaiveDate)> =
        out.iter().map(|a| (a.staff_id.clone(), a.date)).collect();
    assert_eq!(pairs.len(), out.len());
    assert_eq!(out.len(), 7 * 7);
    for member in &staff {
        for date in week().days() {
            assert!(pairs.contains(&(member.id.clone(), date)));
        }
    }
}

#[test]
fn absences_are_always_vacation() {
    let staff = nurses(5);
    let absences = vec![
        Absence::new(StaffId::new("n01"), d(1), d(4)).unwrap(),
        Absence::new(StaffId::new("n04"), d(8), d(8)).unwrap(),
    ];
    let out = Scheduler::new()
        .generate(&week(), &staff, &absences, &OptimizationParameters::default())
        .unwrap();

    for a in &out {
        let absent = absences
            .iter()
            .any(|abs| abs.staff_id == a.staff_id && abs.covers(a.date));
        assert_eq!(absent, a.shift == ShiftType::Vacation, "{a:?}");
    }
}

#[test]
fn night_is_never_followed_by_morning() {
    let staff = nurses(6);
    let range = DateRange::new(d(1), d(31));
    let out = Scheduler::new()
        .generate(&range, &staff, &[], &OptimizationParameters::default())
        .unwrap();

    let by_key: BTreeMap<(StaffId, NaiveDate), ShiftType> = out
        .iter()
        .map(|a| ((a.staff_id.clone(), a.date), a.shift))
        .collect();
    for ((staff, date), shift) in &by_key {
        if *shift != ShiftType::Night {
            continue;
        }
        if let Some(next) = date.succ_opt() {
            assert_ne!(
                by_key.get(&(staff.clone(), next)),
                Some(&ShiftType::Morning),
                "{staff} {date}"
            );
        }
    }
    assert!(check_rules(&out, &OptimizationParameters::default()).is_empty());
}

#[test]
fn consecutive_work_days_are_bounded() {
    let staff = nurses(5);
    let range = DateRange::new(d(1), d(14));
    let params = OptimizationParameters {
        max_consecutive_work_days: 2,
        ..OptimizationParameters::default()
    };
    let out = Scheduler::new().generate(&range, &staff, &[], &params).unwrap();

    for member in &staff {
        let mut streak = 0;
        for date in range.days() {
            let a = out
                .iter()
                .find(|a| a.staff_id == member.id && a.date == date)
                .unwrap();
            streak = if a.shift.is_work() { streak + 1 } else { 0 };
            assert!(streak <= 2, "{} works {streak} days in a row", member.id);
        }
    }
    assert!(!check_rules(&out, &params)
        .iter()
        .any(|c| c.kind == ConflictKind::ConsecutiveWorkExceeded));
}

#[test]
fn part_time_staff_work_less() {
    let mut staff = nurses(9);
    staff.push(StaffMember::new("p01", Role::Nurse).with_working_percentage(50));
    let range = DateRange::new(d(3), d(16));
    let out = Scheduler::new()
        .generate(&range, &staff, &[], &OptimizationParameters::default())
        .unwrap();

    let worked = |id: &str| {
        out.iter()
            .filter(|a| a.staff_id.as_str() == id && a.shift.is_work())
            .count()
    };
    let part_time = worked("p01");
    for member in staff.iter().filter(|m| m.working_percentage == 100) {
        assert!(part_time < worked(member.id.as_str()));
    }
}

#[test]
fn generation_is_deterministic_and_order_independent() {
    let staff = nurses(8);
    let mut shuffled = staff.clone();
    shuffled.reverse();
    let params = OptimizationParameters {
        optimize_weekends: true,
        avoid_isolated_work_days: true,
        min_consecutive_rest_days: 2,
        ..OptimizationParameters::default()
    };
    let scheduler = Scheduler::new();

    let first = scheduler.generate(&week(), &staff, &[], &params).unwrap();
    let second = scheduler.generate(&week(), &staff, &[], &params).unwrap();
    let reversed = scheduler.generate(&week(), &shuffled, &[], &params).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, reversed);
}

#[test]
fn inverted_range_is_rejected() {
    let err = Scheduler::new()
        .generate(
            &DateRange::new(d(9), d(3)),
            &nurses(3),
            &[],
            &OptimizationParameters::default(),
        )
        .unwrap_err();
    assert!(matches!(err, SchedError::RangeInverted { .. }));
}

#[test]
fn range_cap_is_thirty_one_days() {
    let scheduler = Scheduler::new();
    let params = OptimizationParameters::default();
    let start = d(1);

    let ok = DateRange::new(start, start + chrono::Duration::days(30));
    assert_eq!(scheduler.generate(&ok, &nurses(2), &[], &params).unwrap().len(), 62);

    let too_long = DateRange::new(start, start + chrono::Duration::days(31));
    let err = scheduler
        .generate(&too_long, &nurses(2), &[], &params)
        .unwrap_err();
    assert!(matches!(err, SchedError::RangeTooLarge { days: 32, max: 31 }));
}

#[test]
fn empty_staff_pool_yields_no_assignment() {
    let out = Scheduler::new()
        .generate(&week(), &[], &[], &OptimizationParameters::default())
        .unwrap();
    assert!(out.is_empty());
}

#[test]
fn invalid_working_percentage_is_rejected() {
    let staff = vec![StaffMember::new("n01", Role::Nurse).with_working_percentage(0)];
    let err = Scheduler::new()
        .generate(&week(), &staff, &[], &OptimizationParameters::default())
        .unwrap_err();
    assert!(matches!(err, SchedError::InvalidStaff { .. }));
    assert!(err.is_validation());
}

#[test]
fn everyone_absent_degrades_to_vacation() {
    let staff = nurses(10);
    let absences: Vec<Absence> = staff
        .iter()
        .map(|m| Absence::new(m.id.clone(), d(1), d(31)).unwrap())
        .collect();
    let out = Scheduler::new()
        .generate(&week(), &staff, &absences, &OptimizationParameters::default())
        .unwrap();

    assert_eq!(out.len(), 70);
    assert!(out.iter().all(|a| a.shift == ShiftType::Vacation));

    let metrics = compute_quality(&out, &staff);
    assert_eq!(metrics.total(ShiftType::Vacation), 70);
    assert_eq!(metrics.max_workload, 0);
    assert_eq!(metrics.avg_workload, 0.0);
    assert_eq!(metrics.breakdown.workload_balance, 30.0);
    assert_eq!(metrics.overall_quality_score, 100.0);
}

#[test]
fn generate_schedule_filters_role_and_scores() {
    let mut roster = Roster::default();
    roster.staff.extend(nurses(4));
    roster.staff.push(StaffMember::new("o01", Role::Oss));
    roster.staff.push(StaffMember::new("o02", Role::Oss));
    roster
        .absences
        .push(Absence::new(StaffId::new("o01"), d(3), d(3)).unwrap());

    let generated = Scheduler::new()
        .generate_schedule(
            &roster,
            &roster,
            &week(),
            Role::Oss,
            &OptimizationParameters::default(),
        )
        .unwrap();

    assert_eq!(generated.assignments.len(), 14);
    assert!(generated
        .assignments
        .iter()
        .all(|a| a.staff_id.as_str().starts_with('o')));
    assert_eq!(generated.metrics.total(ShiftType::Vacation), 1);
    assert!((0.0..=100.0).contains(&generated.metrics.overall_quality_score));
}

struct Unreachable;

impl StaffDirectory for Unreachable {
    fn list_staff(&self, _role: Role) -> anyhow::Result<Vec<StaffMember>> {
        Err(anyhow!("connection refused"))
    }
}

#[test]
fn directory_failure_is_surfaced() {
    let err = Scheduler::new()
        .generate_schedule(
            &Unreachable,
            &Roster::default(),
            &week(),
            Role::Nurse,
            &OptimizationParameters::default(),
        )
        .unwrap_err();
    assert!(matches!(err, SchedError::DependencyUnavailable { .. }));
    assert!(!err.is_validation());
}

#[test]
fn validation_happens_before_dependencies_are_called() {
    let err = Scheduler::new()
        .generate_schedule(
            &Unreachable,
            &Roster::default(),
            &DateRange::new(d(9), d(3)),
            Role::Nurse,
            &OptimizationParameters::default(),
        )
        .unwrap_err();
    assert!(matches!(err, SchedError::RangeInverted { .. }));
}

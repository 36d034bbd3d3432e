#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use roulement::{
    io,
    model::{DateRange, Role, ShiftType, StaffId},
    scheduler::{self, OptimizationParameters, Scheduler},
    storage::{AssignmentStore, JsonStorage, Storage},
};
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeSet;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de roulement des soignants (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de roster
    #[arg(long, global = true, default_value = "roster.json")]
    roster: String,

    #[command(subcommand)]
    cmd: Commands,
}

/// Surcharges des paramètres d'optimisation (après `--params`).
#[derive(Args, Debug, Default)]
struct ParamArgs {
    /// Fichier JSON de paramètres (partiel accepté)
    #[arg(long)]
    params: Option<String>,
    #[arg(long)]
    min_consecutive_rest_days: Option<u32>,
    #[arg(long)]
    max_consecutive_work_days: Option<u32>,
    #[arg(long)]
    max_consecutive_nights: Option<u32>,
    #[arg(long)]
    avoid_night_after_morning: Option<bool>,
    #[arg(long)]
    balance_workload: Option<bool>,
    #[arg(long)]
    consider_preferences: Option<bool>,
    #[arg(long)]
    respect_seniority: Option<bool>,
    #[arg(long)]
    optimize_weekends: Option<bool>,
    #[arg(long)]
    avoid_isolated_work_days: Option<bool>,
}

impl ParamArgs {
    fn resolve(&self) -> Result<OptimizationParameters> {
        let mut p = match &self.params {
            Some(path) => io::load_params_json(path)?,
            None => OptimizationParameters::default(),
        };
        if let Some(v) = self.min_consecutive_rest_days {
            p.min_consecutive_rest_days = v;
        }
        if let Some(v) = self.max_consecutive_work_days {
            p.max_consecutive_work_days = v;
        }
        if let Some(v) = self.max_consecutive_nights {
            p.max_consecutive_nights = v;
        }
        if let Some(v) = self.avoid_night_after_morning {
            p.avoid_night_after_morning = v;
        }
        if let Some(v) = self.balance_workload {
            p.balance_workload = v;
        }
        if let Some(v) = self.consider_preferences {
            p.consider_preferences = v;
        }
        if let Some(v) = self.respect_seniority {
            p.respect_seniority = v;
        }
        if let Some(v) = self.optimize_weekends {
            p.optimize_weekends = v;
        }
        if let Some(v) = self.avoid_isolated_work_days {
            p.avoid_isolated_work_days = v;
        }
        p.validate()?;
        Ok(p)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer le personnel depuis un CSV
    ImportStaff {
        #[arg(long)]
        csv: String,
    },

    /// Importer des absences depuis un CSV
    ImportAbsences {
        #[arg(long)]
        csv: String,
    },

    /// Générer le planning d'un rôle sur une période (31 jours max)
    Generate {
        /// YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// YYYY-MM-DD (inclus)
        #[arg(long)]
        end: String,
        /// nurse | oss | head_nurse
        #[arg(long, default_value = "nurse")]
        role: String,
        #[command(flatten)]
        params: ParamArgs,
    },

    /// Calculer le score qualité (JSON sur stdout)
    Quality {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },

    /// Vérifier les conflits et règles de roulement
    Check {
        #[command(flatten)]
        params: ParamArgs,
        /// Export CSV des conflits (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Forcer un poste pour une personne à une date
    Set {
        #[arg(long)]
        staff: String,
        #[arg(long)]
        date: String,
        /// morning | afternoon | night | rest | vacation
        #[arg(long)]
        shift: String,
    },

    /// Échanger les postes de deux personnes à une date
    Swap {
        #[arg(long)]
        date: String,
        #[arg(long)]
        staff: String,
        #[arg(long)]
        with: String,
        #[command(flatten)]
        params: ParamArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.roster)?;
    let mut roster = storage.load_or_default()?;
    let engine = Scheduler::new();

    let code = match cli.cmd {
        Commands::ImportStaff { csv } => {
            let staff = io::import_staff_csv(csv)?;
            let mut known: BTreeSet<StaffId> = roster.staff.iter().map(|m| m.id.clone()).collect();
            for m in &staff {
                if !known.insert(m.id.clone()) {
                    bail!("duplicate staff member: {}", m.id);
                }
            }
            println!("Imported {} staff member(s)", staff.len());
            roster.staff.extend(staff);
            storage.save(&roster)?;
            0
        }
        Commands::ImportAbsences { csv } => {
            let absences = io::import_absences_csv(csv)?;
            for a in &absences {
                if roster.find_staff_by_id(&a.staff_id).is_none() {
                    bail!("unknown staff member: {}", a.staff_id);
                }
            }
            println!("Imported {} absence(s)", absences.len());
            roster.absences.extend(absences);
            storage.save(&roster)?;
            0
        }
        Commands::Generate {
            start,
            end,
            role,
            params,
        } => {
            let range = DateRange::new(io::parse_date(&start)?, io::parse_date(&end)?);
            let role: Role = role.parse()?;
            let params = params.resolve()?;
            let generated = engine.generate_schedule(&storage, &storage, &range, role, &params)?;
            let count = storage.persist_assignments(&range, &generated.assignments)?;
            let m = &generated.metrics;
            println!(
                "Generated {count} assignment(s) for {role} over {range}: score {:.1} (M {} / A {} / N {} / R {} / V {})",
                m.overall_quality_score,
                m.total(ShiftType::Morning),
                m.total(ShiftType::Afternoon),
                m.total(ShiftType::Night),
                m.total(ShiftType::Rest),
                m.total(ShiftType::Vacation),
            );
            0
        }
        Commands::Quality { start, end, role } => {
            let assignments = match (start, end) {
                (Some(s), Some(e)) => {
                    roster.assignments_in(&DateRange::new(io::parse_date(&s)?, io::parse_date(&e)?))
                }
                (None, None) => roster.assignments.clone(),
                _ => bail!("--start and --end must be given together"),
            };
            let staff = match role {
                Some(r) => roster.staff_by_role(r.parse()?),
                None => roster.staff.clone(),
            };
            let metrics = engine.compute_quality(&assignments, &staff);
            println!("{}", serde_json::to_string_pretty(&metrics)?);
            0
        }
        Commands::Check { params, report } => {
            let params = params.resolve()?;
            let mut conflicts = engine.check_conflicts(&roster.assignments, &roster.absences);
            conflicts.extend(engine.check_rules(&roster.assignments, &params));
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                for c in &conflicts {
                    eprintln!("{} | {} | {}", c.staff_id, c.date, c.kind.as_str());
                }
                if let Some(path) = report {
                    io::export_conflicts_csv(path, &conflicts)?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::List { out_json, out_csv } => {
            if let Some(path) = out_json {
                io::export_roster_json(path, &roster)?;
            }
            if let Some(path) = out_csv {
                io::export_assignments_csv(path, &roster.assignments)?;
            }
            // impression compacte
            for a in &roster.assignments {
                println!(
                    "{} | {} | {}{}",
                    a.date,
                    a.staff_id,
                    a.shift,
                    if a.manually_assigned { " *" } else { "" }
                );
            }
            0
        }
        Commands::Set { staff, date, shift } => {
            let staff = StaffId::new(staff);
            let date = io::parse_date(&date)?;
            let shift: ShiftType = shift.parse()?;
            let previous = scheduler::set_shift(&mut roster.assignments, &staff, date, shift)?;
            storage.save(&roster)?;
            println!("{staff} on {date}: {previous} -> {shift}");
            0
        }
        Commands::Swap {
            date,
            staff,
            with,
            params,
        } => {
            let params = params.resolve()?;
            let date = io::parse_date(&date)?;
            let a = StaffId::new(staff);
            let b = StaffId::new(with);
            scheduler::swap_shifts(&mut roster.assignments, date, &a, &b, &params)?;
            storage.save(&roster)?;
            0
        }
    };

    std::process::exit(code);
}

//! Stratégies d'allocation d'une journée.
//!
//! Le moteur prépare le contexte (absents et repos imposés déjà retirés),
//! l'allocateur propose un poste par candidat, puis le moteur applique
//! les contraintes dures sur la proposition.

use super::{ledger::RunLedger, util, OptimizationParameters};
use crate::model::{ShiftType, StaffId, StaffMember};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::fmt::Debug;

/// Contexte d'une journée à allouer.
#[derive(Debug, Clone, Copy)]
pub struct DayContext<'a> {
    pub date: NaiveDate,
    /// Effectif présent, repos imposés compris : base du calcul des quotas.
    pub headcount: usize,
    /// Personnes pouvant recevoir un poste travaillé, triées par id.
    pub candidates: &'a [&'a StaffMember],
    pub ledger: &'a RunLedger,
    pub params: &'a OptimizationParameters,
}

impl DayContext<'_> {
    pub fn is_weekend(&self) -> bool {
        util::is_weekend(self.date)
    }
}

/// Stratégie d'allocation d'une journée.
///
/// Un candidat absent de la proposition reçoit un repos.
pub trait Allocator: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    fn assign_day(&self, ctx: &DayContext<'_>) -> Vec<(StaffId, ShiftType)>;
}

/// Allocation gloutonne proportionnelle (matin, après-midi, nuit, repos)
/// par dette d'équité croissante.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalAllocator;

impl ProportionalAllocator {
    /// Classe les candidats, le premier étant le plus prioritaire.
    pub fn rank<'a>(&self, ctx: &DayContext<'a>) -> Vec<&'a StaffMember> {
        let params = ctx.params;
        let weekend = params.optimize_weekends && ctx.is_weekend();
        let mut keyed: Vec<(RankKey, &'a StaffMember)> = ctx
            .candidates
            .iter()
            .map(|member| {
                let tally = ctx.ledger.tally(&member.id);
                let ratio = member.part_time_ratio();
                let key = RankKey {
                    weekend_debt: if weekend {
                        tally.weekend_debt(ratio, params.balance_workload)
                    } else {
                        0.0
                    },
                    debt: tally.debt(ratio, params.balance_workload),
                    soft: soft_penalty(tally.consecutive_rest, tally.consecutive_work, params),
                    seniority: if params.respect_seniority {
                        member.years_of_experience
                    } else {
                        0
                    },
                    extra: params.consider_preferences && member.available_for_extra_shifts,
                };
                (key, *member)
            })
            .collect();

        keyed.sort_by(|(ka, a), (kb, b)| ka.compare(kb).then_with(|| a.id.cmp(&b.id)));
        keyed.into_iter().map(|(_, m)| m).collect()
    }
}

impl Allocator for ProportionalAllocator {
    fn name(&self) -> &'static str {
        "proportional"
    }

    fn assign_day(&self, ctx: &DayContext<'_>) -> Vec<(StaffId, ShiftType)> {
        let (morning, afternoon, night) = ctx.params.split.quotas(ctx.headcount);
        let mut queue = self.rank(ctx);
        let mut plan = Vec::with_capacity(queue.len());

        // Matin : on saute ceux qui sortent de nuit, le suivant prend la place.
        let mut filled = 0;
        let mut cursor = 0;
        while filled < morning && cursor < queue.len() {
            let tally = ctx.ledger.tally(&queue[cursor].id);
            if ctx.params.avoid_night_after_morning && tally.last_shift == Some(ShiftType::Night) {
                cursor += 1;
                continue;
            }
            let member = queue.remove(cursor);
            plan.push((member.id.clone(), ShiftType::Morning));
            filled += 1;
        }

        let take = afternoon.min(queue.len());
        for member in queue.drain(..take) {
            plan.push((member.id.clone(), ShiftType::Afternoon));
        }

        for _ in 0..night {
            if queue.is_empty() {
                break;
            }
            let cap = ctx.params.max_consecutive_nights;
            let pos = queue
                .iter()
                .position(|m| ctx.ledger.tally(&m.id).consecutive_nights < cap)
                .unwrap_or(0);
            let member = queue.remove(pos);
            plan.push((member.id.clone(), ShiftType::Night));
        }

        plan.extend(queue.into_iter().map(|m| (m.id.clone(), ShiftType::Rest)));
        plan
    }
}

/// Clé de tri : plus petite = servie en premier.
#[derive(Debug, Clone, Copy)]
struct RankKey {
    weekend_debt: f64,
    debt: f64,
    soft: i8,
    seniority: u16,
    extra: bool,
}

impl RankKey {
    fn compare(&self, other: &Self) -> Ordering {
        self.weekend_debt
            .total_cmp(&other.weekend_debt)
            .then_with(|| self.debt.total_cmp(&other.debt))
            .then_with(|| self.soft.cmp(&other.soft))
            .then_with(|| other.seniority.cmp(&self.seniority))
            .then_with(|| other.extra.cmp(&self.extra))
    }
}

/// Préférences douces : repos minimal pas encore atteint (recule),
/// série commencée la veille qu'il faut prolonger pour éviter un jour isolé (avance).
fn soft_penalty(consecutive_rest: u32, consecutive_work: u32, params: &OptimizationParameters) -> i8 {
    let mut penalty = 0;
    if consecutive_rest > 0 && consecutive_rest < params.min_consecutive_rest_days {
        penalty += 1;
    }
    if params.avoid_isolated_work_days && consecutive_work == 1 {
        penalty -= 1;
    }
    penalty
}

use super::SchedError;
use serde::{Deserialize, Serialize};

/// Paramètres d'optimisation d'une génération.
///
/// Tous les champs ont une valeur par défaut : un fichier JSON partiel
/// (`{"max_consecutive_work_days": 5}`) est accepté.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationParameters {
    /// Repos minimal souhaité entre deux séries de travail (préférence).
    pub min_consecutive_rest_days: u32,
    /// Au-delà, repos imposé quel que soit le classement.
    pub max_consecutive_work_days: u32,
    /// Nuits consécutives au-delà desquelles on préfère un autre candidat.
    pub max_consecutive_nights: u32,
    pub consider_preferences: bool,
    pub balance_workload: bool,
    pub avoid_night_after_morning: bool,
    pub respect_seniority: bool,
    pub optimize_weekends: bool,
    pub avoid_isolated_work_days: bool,
    pub split: ShiftSplit,
}

impl Default for OptimizationParameters {
    fn default() -> Self {
        Self {
            min_consecutive_rest_days: 1,
            max_consecutive_work_days: 7,
            max_consecutive_nights: 3,
            consider_preferences: false,
            balance_workload: true,
            avoid_night_after_morning: true,
            respect_seniority: false,
            optimize_weekends: false,
            avoid_isolated_work_days: false,
            split: ShiftSplit::default(),
        }
    }
}

impl OptimizationParameters {
    pub fn validate(&self) -> Result<(), SchedError> {
        if self.max_consecutive_work_days == 0 {
            return Err(SchedError::InvalidParameter(
                "max_consecutive_work_days must be >= 1",
            ));
        }
        if self.max_consecutive_nights == 0 {
            return Err(SchedError::InvalidParameter(
                "max_consecutive_nights must be >= 1",
            ));
        }
        self.split.validate()
    }
}

/// Part de l'effectif présent affectée à chaque poste travaillé.
///
/// Le reste de l'effectif est au repos. Les valeurs par défaut (40/30/20)
/// sont des heuristiques métier, pas des contraintes du domaine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftSplit {
    pub morning: f64,
    pub afternoon: f64,
    pub night: f64,
}

impl Default for ShiftSplit {
    fn default() -> Self {
        Self {
            morning: 0.4,
            afternoon: 0.3,
            night: 0.2,
        }
    }
}

impl ShiftSplit {
    pub fn validate(&self) -> Result<(), SchedError> {
        let parts = [self.morning, self.afternoon, self.night];
        if parts.iter().any(|p| !p.is_finite() || *p < 0.0 || *p > 1.0) {
            return Err(SchedError::InvalidParameter(
                "shift split fractions must be within [0, 1]",
            ));
        }
        if parts.iter().sum::<f64>() > 1.0 + f64::EPSILON {
            return Err(SchedError::InvalidParameter(
                "shift split fractions must not sum above 1",
            ));
        }
        Ok(())
    }

    /// Quotas (matin, après-midi, nuit) pour `headcount` personnes présentes.
    ///
    /// Chaque quota est arrondi au supérieur puis borné par l'effectif restant.
    pub fn quotas(&self, headcount: usize) -> (usize, usize, usize) {
        // tolérance : 0.3 * 20 ne doit pas donner 7
        let ceil = |fraction: f64| (headcount as f64 * fraction - 1e-9).ceil().max(0.0) as usize;
        let morning = ceil(self.morning).min(headcount);
        let afternoon = ceil(self.afternoon).min(headcount - morning);
        let night = ceil(self.night).min(headcount - morning - afternoon);
        (morning, afternoon, night)
    }
}

/// Pondération du score qualité (total 100 par défaut).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub workload_balance: f64,
    pub weekend_balance: f64,
    pub transitions: f64,
    pub base_distribution: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            workload_balance: 30.0,
            weekend_balance: 25.0,
            transitions: 20.0,
            base_distribution: 25.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotas_follow_default_split() {
        let split = ShiftSplit::default();
        assert_eq!(split.quotas(10), (4, 3, 2));
        assert_eq!(split.quotas(0), (0, 0, 0));
        // ceil saturates small teams
        assert_eq!(split.quotas(1), (1, 0, 0));
        assert_eq!(split.quotas(4), (2, 2, 0));
    }

    #[test]
    fn validate_rejects_zero_max_work_days() {
        let params = OptimizationParameters {
            max_consecutive_work_days: 0,
            ..OptimizationParameters::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SchedError::InvalidParameter(_))
        ));
    }

    #[test]
    fn validate_rejects_oversized_split() {
        let params = OptimizationParameters {
            split: ShiftSplit {
                morning: 0.6,
                afternoon: 0.3,
                night: 0.2,
            },
            ..OptimizationParameters::default()
        };
        assert!(params.validate().is_err());
    }
}

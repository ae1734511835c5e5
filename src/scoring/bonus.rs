use super::activation::to_activation;
use super::f1::Confusion;
use crate::config::{ScoringConfig, StudyShape};
use crate::error::{BonusError, Result};
use crate::reshape::RuleRow;
use crate::rule::ComboCounts;
use crate::study::ParticipantRecord;
use crate::table::{CSV, TableWriter};
use std::collections::BTreeMap;
use std::path::Path;

/// A rule row with the rule's probability and the prediction derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRow {
    pub session_id: String,
    pub form: String,
    pub probability: f64,
    pub predicted: bool,
    pub observed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormScore {
    pub session_id: String,
    pub form: String,
    pub f1: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionBonus {
    pub session_id: String,
    pub bonus: f64,
}

/// One payout line for the bulk bonus upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Payout {
    pub participant_id: Option<String>,
    pub session_id: String,
    pub bonus: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonusSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; NaN for fewer than two payouts.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Evaluate each row's rule on its teaching combo and map it to a prediction.
pub fn score_rows(rows: &[RuleRow], scoring: &ScoringConfig) -> Result<Vec<ScoredRow>> {
    rows.iter()
        .map(|row| {
            let probability = row
                .branches
                .probability(ComboCounts::of(&row.teaching_combo))?;
            let predicted = to_activation(
                probability,
                row.teaching_activation,
                scoring.noise_reliability,
            )?;
            Ok(ScoredRow {
                session_id: row.session_id.clone(),
                form: row.form.clone(),
                probability,
                predicted,
                observed: row.teaching_activation,
            })
        })
        .collect()
}

/// F1 of each (session, form) group, ordered by session then form.
pub fn form_scores(
    scored: &[ScoredRow],
    shape: &StudyShape,
    sessions: usize,
) -> Result<Vec<FormScore>> {
    let mut groups: BTreeMap<(&str, &str), Vec<(bool, bool)>> = BTreeMap::new();
    for row in scored {
        groups
            .entry((row.session_id.as_str(), row.form.as_str()))
            .or_default()
            .push((row.observed, row.predicted));
    }

    let expected = sessions * shape.forms_per_session;
    if groups.len() != expected {
        return Err(BonusError::shape("scored forms", expected, groups.len()));
    }

    Ok(groups
        .into_iter()
        .map(|((session_id, form), pairs)| FormScore {
            session_id: session_id.to_string(),
            form: form.to_string(),
            f1: Confusion::from_pairs(pairs).f1(),
        })
        .collect())
}

/// Sum of `f1 * bonus_per_q` per session, rounded half to even.
pub fn session_bonuses(
    scores: &[FormScore],
    bonus_per_q: f64,
    scoring: &ScoringConfig,
) -> Vec<SessionBonus> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for score in scores {
        *totals.entry(score.session_id.as_str()).or_default() += score.f1 * bonus_per_q;
    }

    let factor = 10f64.powi(scoring.bonus_decimals as i32);
    totals
        .into_iter()
        .map(|(session_id, total)| SessionBonus {
            session_id: session_id.to_string(),
            bonus: (total * factor).round_ties_even() / factor,
        })
        .collect()
}

/// Inner join of bonuses with participant records on the session id. A session
/// recorded under several participant rows pays out once per row.
pub fn payouts(bonuses: &[SessionBonus], records: &[ParticipantRecord]) -> Vec<Payout> {
    bonuses
        .iter()
        .flat_map(|bonus| {
            records
                .iter()
                .filter(|record| record.session_id.as_deref() == Some(bonus.session_id.as_str()))
                .map(|record| Payout {
                    participant_id: record.participant_id.clone(),
                    session_id: bonus.session_id.clone(),
                    bonus: bonus.bonus,
                })
        })
        .collect()
}

impl BonusSummary {
    pub fn of(payouts: &[Payout]) -> Option<Self> {
        if payouts.is_empty() {
            return None;
        }

        let count = payouts.len();
        let amounts = payouts.iter().map(|p| p.bonus);
        let mean = amounts.clone().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let squares: f64 = amounts.clone().map(|b| (b - mean).powi(2)).sum();
            (squares / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        Some(Self {
            count,
            mean,
            std,
            min: amounts.clone().fold(f64::INFINITY, f64::min),
            max: amounts.fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Shortest round-trip text for an amount; integral amounts keep a trailing
/// `.0` so the column always reads back as decimal.
fn bonus_cell(bonus: f64) -> String {
    format!("{bonus:?}")
}

/// Write the ID list and the ID/amount list used for bulk bonusing.
pub fn write_bonus_files(
    ids_path: impl AsRef<Path>,
    amounts_path: impl AsRef<Path>,
    payouts: &[Payout],
) -> Result<()> {
    let mut ids = TableWriter::create(ids_path.as_ref(), CSV)?;
    let mut amounts = TableWriter::create(amounts_path.as_ref(), CSV)?;
    ids.write_record(["participant_id"])?;
    amounts.write_record(["participant_id", "bonus"])?;

    for payout in payouts {
        let participant_id = payout.participant_id.as_deref().unwrap_or_default();
        ids.write_record([participant_id])?;
        amounts.write_record([participant_id, bonus_cell(payout.bonus).as_str()])?;
    }
    ids.finish()?;
    amounts.finish()?;

    tracing::info!(
        "Saved {} payouts to {} and {}",
        payouts.len(),
        ids_path.as_ref().display(),
        amounts_path.as_ref().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Branch, Comparator, Rule, Threshold};

    fn row(session: &str, form: &str, rule: &Rule, combo: &str, observed: bool) -> RuleRow {
        RuleRow {
            session_id: session.to_string(),
            form: form.to_string(),
            branches: rule.clone(),
            teaching_combo: combo.to_string(),
            teaching_activation: observed,
        }
    }

    fn scored_row(session: &str, form: &str, predicted: bool, observed: bool) -> ScoredRow {
        ScoredRow {
            session_id: session.to_string(),
            form: form.to_string(),
            probability: if predicted { 1.0 } else { 0.0 },
            predicted,
            observed,
        }
    }

    fn two_or_more() -> Rule {
        Rule::new(vec![
            Branch::always(1.0).with_blicket(Comparator::Ge, Threshold::Fixed(2)),
        ])
    }

    #[test]
    fn test_score_rows() {
        let noisy = Rule::new(vec![Branch::always(0.75)]);
        let rows = vec![
            row("s", "q", &two_or_more(), "**.", true),
            row("s", "q", &two_or_more(), "*", true),
            row("s", "q", &noisy, "*", false),
            row("s", "q", &Rule::default(), "***", true),
        ];

        let scored = score_rows(&rows, &ScoringConfig::default()).unwrap();
        let predicted: Vec<_> = scored.iter().map(|r| r.predicted).collect();
        assert_eq!(predicted, vec![true, false, false, false]);
        assert_eq!(scored[2].probability, 0.75);
    }

    #[test]
    fn test_score_rows_rejects_partial_reliability() {
        let rule = Rule::new(vec![Branch::always(0.5)]);
        let rows = vec![row("s", "q", &rule, "*", true)];
        assert!(score_rows(&rows, &ScoringConfig::default()).is_err());
    }

    #[test]
    fn test_form_scores_grouped_and_sorted() {
        let scored = vec![
            scored_row("b", "q1", true, true),
            scored_row("a", "q2", true, false),
            scored_row("a", "q1", true, true),
            scored_row("b", "q2", false, true),
        ];

        let scores = form_scores(&scored, &StudyShape::new(2, 1), 2).unwrap();
        let keys: Vec<_> = scores
            .iter()
            .map(|s| (s.session_id.as_str(), s.form.as_str(), s.f1))
            .collect();
        assert_eq!(
            keys,
            vec![("a", "q1", 1.0), ("a", "q2", 0.0), ("b", "q1", 1.0), ("b", "q2", 0.0)]
        );

        assert!(form_scores(&scored, &StudyShape::default(), 2).is_err());
    }

    #[test]
    fn test_session_bonus_for_perfect_forms() {
        let scores: Vec<_> = (0..7)
            .map(|i| FormScore {
                session_id: "s".to_string(),
                form: format!("q{i}"),
                f1: 1.0,
            })
            .collect();

        let bonuses = session_bonuses(&scores, 0.1, &ScoringConfig::default());
        assert_eq!(
            bonuses,
            vec![SessionBonus {
                session_id: "s".to_string(),
                bonus: 0.7
            }]
        );
    }

    #[test]
    fn test_payouts_inner_join() {
        let bonuses = vec![
            SessionBonus {
                session_id: "s1".into(),
                bonus: 0.5,
            },
            SessionBonus {
                session_id: "s2".into(),
                bonus: 0.2,
            },
        ];
        let records = vec![
            ParticipantRecord::new("p1", "s1"),
            ParticipantRecord::new("p1-retry", "s1"),
            ParticipantRecord::new("p3", "s3"),
        ];

        let payouts = payouts(&bonuses, &records);
        assert_eq!(payouts.len(), 2);
        assert_eq!(payouts[1].participant_id.as_deref(), Some("p1-retry"));
        assert_eq!(payouts[1].bonus, 0.5);
    }

    #[test]
    fn test_summary() {
        let payouts: Vec<_> = [0.2, 0.4, 0.6]
            .iter()
            .map(|&bonus| Payout {
                participant_id: None,
                session_id: "s".into(),
                bonus,
            })
            .collect();

        let summary = BonusSummary::of(&payouts).unwrap();
        assert_eq!(summary.count, 3);
        assert!((summary.mean - 0.4).abs() < 1e-12);
        assert!((summary.std - 0.2).abs() < 1e-12);
        assert_eq!(summary.min, 0.2);
        assert_eq!(summary.max, 0.6);
        assert!(BonusSummary::of(&[]).is_none());
    }

    #[test]
    fn test_bonus_files_keep_decimal_amounts() {
        let dir = tempfile::tempdir().unwrap();
        let ids_path = dir.path().join("bonus/ids.csv");
        let amounts_path = dir.path().join("bonus/amounts.csv");
        let payouts: Vec<_> = [("p1", 1.0), ("p2", 0.0), ("p3", 0.35)]
            .iter()
            .map(|&(id, bonus)| Payout {
                participant_id: Some(id.to_string()),
                session_id: "s".into(),
                bonus,
            })
            .collect();

        write_bonus_files(&ids_path, &amounts_path, &payouts).unwrap();

        assert_eq!(
            std::fs::read_to_string(&amounts_path).unwrap(),
            "participant_id,bonus\np1,1.0\np2,0.0\np3,0.35\n"
        );
        assert_eq!(
            std::fs::read_to_string(&ids_path).unwrap(),
            "participant_id\np1\np2\np3\n"
        );
    }
}

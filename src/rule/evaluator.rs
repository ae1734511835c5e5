//! Probability that a rule predicts detector activation for a combo.

use super::{Branch, ComboCounts, Comparator, Rule, Side, Threshold};
use crate::error::{BonusError, Result};

impl Branch {
    /// Probability this branch fires for the given counts: the branch
    /// reliability when both clauses hold, otherwise zero.
    pub fn probability(&self, counts: ComboCounts) -> Result<f64> {
        let nonblicket_threshold = self.nonblicket_num.value();
        let nonblicket_holds = match self.nonblicket_comparator {
            Comparator::Any => true,
            comparator => {
                let threshold = nonblicket_threshold.ok_or_else(|| {
                    BonusError::malformed(
                        Side::Nonblicket,
                        format!("uses '{comparator}' without a threshold"),
                    )
                })?;
                comparator.compare(counts.nonblickets, threshold)
            }
        };

        let blicket_threshold = match self.blicket_num {
            Threshold::SameAsOther => nonblicket_threshold,
            threshold => threshold.value(),
        };
        let blicket_holds = match (self.blicket_comparator, blicket_threshold) {
            (Comparator::Any, _) => true,
            (comparator, Some(threshold)) => comparator.compare(counts.blickets, threshold),
            // "as many blickets as non-blickets" with any number of non-blickets.
            // A non-`any` nonblicket clause without a threshold already failed above.
            (_, None) if self.blicket_num == Threshold::SameAsOther => true,
            (comparator, None) => {
                return Err(BonusError::malformed(
                    Side::Blicket,
                    format!("uses '{comparator}' without a threshold"),
                ));
            }
        };

        Ok(if blicket_holds && nonblicket_holds {
            self.reliability
        } else {
            0.0
        })
    }
}

impl Rule {
    /// Disjunction of the branches, taken as the maximum branch probability.
    /// This is not the probabilistic union `1 - Π(1 - p)`.
    pub fn probability(&self, counts: ComboCounts) -> Result<f64> {
        disjunction(&self.branches, counts)
    }
}

fn disjunction(branches: &[Branch], counts: ComboCounts) -> Result<f64> {
    branches.iter().try_fold(0.0_f64, |best, branch| {
        Ok(best.max(branch.probability(counts)?))
    })
}

/// Evaluate a single branch on a combo string of `*` and `.` markers.
pub fn evaluate_branch(branch: &Branch, combo: &str) -> Result<f64> {
    branch.probability(ComboCounts::of(combo))
}

/// Evaluate the disjunction of `branches` on a combo string. An empty slice
/// yields zero.
pub fn evaluate_rule(branches: &[Branch], combo: &str) -> Result<f64> {
    disjunction(branches, ComboCounts::of(combo))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_blickets_one_nonblicket() -> Branch {
        Branch::always(1.0)
            .with_blicket(Comparator::Ge, Threshold::Fixed(3))
            .with_nonblicket(Comparator::Eq, Threshold::Fixed(1))
    }

    fn at_most_two_blickets() -> Branch {
        Branch::always(0.75).with_blicket(Comparator::Le, Threshold::Fixed(2))
    }

    #[test]
    fn test_deterministic_branch() {
        let branch = three_blickets_one_nonblicket();
        for (combo, expected) in [
            ("***.", 1.0),
            ("*.**", 1.0),
            ("*****.", 1.0),
            ("***...", 0.0),
            ("***", 0.0),
            ("**.", 0.0),
            ("", 0.0),
            (".", 0.0),
        ] {
            assert_eq!(evaluate_branch(&branch, combo).unwrap(), expected, "{combo:?}");
        }
    }

    #[test]
    fn test_noisy_branch_with_any_nonblickets() {
        let branch = at_most_two_blickets();
        for combo in ["**..", "**....", "**", "*.....", "......", ""] {
            assert_eq!(evaluate_branch(&branch, combo).unwrap(), 0.75, "{combo:?}");
        }
        for combo in ["***", "***..", "******"] {
            assert_eq!(evaluate_branch(&branch, combo).unwrap(), 0.0, "{combo:?}");
        }
    }

    #[test]
    fn test_same_as_other_threshold() {
        let branch = Branch::always(1.0)
            .with_blicket(Comparator::Eq, Threshold::SameAsOther)
            .with_nonblicket(Comparator::Eq, Threshold::Fixed(2));

        assert_eq!(evaluate_branch(&branch, "**..").unwrap(), 1.0);
        assert_eq!(evaluate_branch(&branch, "*..").unwrap(), 0.0);
    }

    #[test]
    fn test_same_as_other_with_any_nonblickets_is_vacuous() {
        let branch = Branch::always(0.75).with_blicket(Comparator::Ge, Threshold::SameAsOther);

        for combo in ["", "*", "....", "*.*.*"] {
            assert_eq!(evaluate_branch(&branch, combo).unwrap(), 0.75);
        }
    }

    #[test]
    fn test_missing_nonblicket_threshold_is_malformed() {
        let branch = Branch::always(1.0)
            .with_blicket(Comparator::Ge, Threshold::SameAsOther)
            .with_nonblicket(Comparator::Ge, Threshold::Unbounded);

        let err = evaluate_branch(&branch, "**").unwrap_err();
        assert!(matches!(
            err,
            BonusError::MalformedBranch {
                side: Side::Nonblicket,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_blicket_threshold_is_malformed() {
        let branch = Branch::always(1.0).with_blicket(Comparator::Lt, Threshold::Unbounded);

        let err = evaluate_branch(&branch, "").unwrap_err();
        assert!(matches!(
            err,
            BonusError::MalformedBranch {
                side: Side::Blicket,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_rule_never_fires() {
        assert_eq!(evaluate_rule(&[], "***").unwrap(), 0.0);
        assert_eq!(Rule::default().probability(ComboCounts::default()).unwrap(), 0.0);
    }

    #[test]
    fn test_rule_takes_maximum_not_union() {
        let rule = Rule::new(vec![
            at_most_two_blickets(),
            Branch::always(0.5).with_nonblicket(Comparator::Gt, Threshold::Fixed(0)),
        ]);

        // both fire: max(0.75, 0.5), not 1 - 0.25 * 0.5
        assert_eq!(rule.probability(ComboCounts::of("*.")).unwrap(), 0.75);
        assert_eq!(rule.probability(ComboCounts::of("***.")).unwrap(), 0.5);
        assert_eq!(rule.probability(ComboCounts::of("***")).unwrap(), 0.0);
    }

    #[test]
    fn test_rule_fails_on_any_malformed_branch() {
        let rule = vec![
            Branch::always(1.0),
            Branch::always(1.0).with_nonblicket(Comparator::Eq, Threshold::Unbounded),
        ];
        assert!(evaluate_rule(&rule, "*").is_err());
    }

    #[test]
    fn test_real_thresholds_compare_numerically() {
        let branch = Branch::always(1.0)
            .with_blicket(Comparator::Ge, Threshold::Real(1.5))
            .with_nonblicket(Comparator::Gt, Threshold::Real(-1.0));

        assert_eq!(evaluate_branch(&branch, "**").unwrap(), 1.0);
        assert_eq!(evaluate_branch(&branch, "*..").unwrap(), 0.0);
    }
}

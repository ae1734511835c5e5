//! # blicket-bonus
//!
//! Data pipeline for the blicket detector teaching study: filters participant
//! data, reshapes participants' rules into tables, and computes bonus payments
//! from how well each participant's rule reproduces the detector activations
//! they were taught.
//!
//! ## Features
//!
//! - **Rule evaluation**: a participant's rule is a disjunction of branches,
//!   each a pair of comparator/threshold clauses over blicket and non-blicket
//!   counts with a reliability weight
//! - **Filtering**: drops test accounts, failed sessions and trouble endings
//! - **Reshaping**: per-branch and per-example CSV tables
//! - **Scoring**: F1 per quiz form, summed into a per-session bonus
//!
//! ## Quick Start
//!
//! ```rust
//! use blicket_bonus::*;
//!
//! # fn example() -> Result<()> {
//! let rule: Rule = serde_json::from_str(
//!     r#"[{"reliability": 1, "blicket_comparator": ">=", "blicket_num": 3,
//!          "nonblicket_comparator": "=", "nonblicket_num": 1}]"#,
//! )?;
//!
//! assert_eq!(evaluate_rule(&rule.branches, "*.**")?, 1.0);
//! assert_eq!(evaluate_rule(&rule.branches, "***...")?, 0.0);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod reshape;
pub mod rule;
pub mod scoring;
pub mod study;
pub mod table;

pub use crate::config::{FilterConfig, PathsConfig, PipelineConfig, ScoringConfig, StudyShape};
pub use error::{BonusError, Result};
pub use pipeline::{BonusPipeline, BonusReport};
pub use reshape::{BranchRow, RuleRow, branch_rows, rule_rows};
pub use rule::{
    Branch, ComboCounts, Comparator, Rule, Side, Threshold, evaluate_branch, evaluate_rule,
};
pub use scoring::{BonusSummary, Payout, SessionBonus, f1_score, to_activation};
pub use study::{DataChunk, ParticipantFilter, ParticipantRecord, QuizForm, TeachingExample};

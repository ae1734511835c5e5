//! Bonus scoring: rule probability, predicted activation, per-form F1 and
//! per-session bonus.

pub mod activation;
pub mod bonus;
pub mod f1;

pub use activation::to_activation;
pub use bonus::{
    BonusSummary, FormScore, Payout, ScoredRow, SessionBonus, form_scores, payouts, score_rows,
    session_bonuses, write_bonus_files,
};
pub use f1::{Confusion, f1_score};

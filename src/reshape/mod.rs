//! Flatten ending chunks into per-branch and per-example tables.

pub mod branches;
pub mod rules;

pub use branches::{BRANCH_COLUMNS, BranchRow, branch_rows, write_branch_table};
pub use rules::{RULE_COLUMNS, RuleRow, rule_rows, write_rule_table};

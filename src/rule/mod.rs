//! Participant-authored decision rules.
//!
//! A [`Rule`] is a disjunction of [`Branch`]es. Each branch pairs a comparator
//! and threshold for the blicket count with one for the non-blicket count,
//! and carries the reliability reported when both clauses hold.

pub mod combo;
pub mod evaluator;

use crate::error::{BonusError, Result};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub use combo::{BLICKET_MARKER, ComboCounts, NONBLICKET_MARKER};
pub use evaluator::{evaluate_branch, evaluate_rule};

/// Wire value of `blicket_num` meaning "same as the non-blicket threshold".
pub const SAME_AS_OTHER_SENTINEL: &str = "nonblicket_num";

/// Which clause of a branch an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Blicket,
    Nonblicket,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Blicket => write!(f, "blicket"),
            Side::Nonblicket => write!(f, "nonblicket"),
        }
    }
}

/// Closed set of count comparators a participant can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    /// Matches every count; the paired threshold is ignored.
    Any,
}

impl Comparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Eq => "==",
            Comparator::Ge => ">=",
            Comparator::Gt => ">",
            Comparator::Any => "any",
        }
    }

    /// Apply the comparator as `count <op> threshold`.
    pub fn compare(&self, count: u32, threshold: f64) -> bool {
        let count = f64::from(count);
        match self {
            Comparator::Lt => count < threshold,
            Comparator::Le => count <= threshold,
            Comparator::Eq => count == threshold,
            Comparator::Ge => count >= threshold,
            Comparator::Gt => count > threshold,
            Comparator::Any => true,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Comparator::Any)
    }
}

impl FromStr for Comparator {
    type Err = BonusError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "<" => Ok(Comparator::Lt),
            "<=" => Ok(Comparator::Le),
            // single `=` is how the study UI spells equality
            "=" | "==" => Ok(Comparator::Eq),
            ">=" => Ok(Comparator::Ge),
            ">" => Ok(Comparator::Gt),
            "any" => Ok(Comparator::Any),
            other => Err(BonusError::InvalidComparator {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Comparator {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Comparator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Threshold paired with a comparator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Threshold {
    Fixed(u32),
    /// Negative or fractional thresholds, compared numerically like any other.
    Real(f64),
    /// Use whatever the non-blicket threshold resolves to.
    SameAsOther,
    /// No threshold recorded; only meaningful next to [`Comparator::Any`].
    #[default]
    Unbounded,
}

impl Threshold {
    /// Numeric value of the threshold, if it has one of its own.
    pub fn value(&self) -> Option<f64> {
        match self {
            Threshold::Fixed(n) => Some(f64::from(*n)),
            Threshold::Real(f) => Some(*f),
            _ => None,
        }
    }

    /// Parse the JSON form: integer, null, or the cross-reference sentinel.
    pub fn from_value(field: &str, value: &Value) -> Result<Self> {
        let invalid = || BonusError::InvalidThreshold {
            field: field.to_string(),
            value: value.to_string(),
        };

        match value {
            Value::Null => Ok(Threshold::Unbounded),
            Value::Number(n) => n.as_f64().map(Threshold::from_number).ok_or_else(invalid),
            Value::String(s) if s == SAME_AS_OTHER_SENTINEL => Ok(Threshold::SameAsOther),
            Value::String(s) if s.trim().is_empty() => Ok(Threshold::Unbounded),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Threshold::from_number)
                .ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }

    fn from_number(f: f64) -> Self {
        // integral floats such as 3.0 show up after tabular round trips
        if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) {
            Threshold::Fixed(f as u32)
        } else {
            Threshold::Real(f)
        }
    }

    /// Cell text used in exported tables.
    pub fn to_cell(&self) -> String {
        match self {
            Threshold::Fixed(n) => n.to_string(),
            Threshold::Real(f) => f.to_string(),
            Threshold::SameAsOther => SAME_AS_OTHER_SENTINEL.to_string(),
            Threshold::Unbounded => String::new(),
        }
    }
}

impl Serialize for Threshold {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Threshold::Fixed(n) => serializer.serialize_u32(*n),
            Threshold::Real(f) => serializer.serialize_f64(*f),
            Threshold::SameAsOther => serializer.serialize_str(SAME_AS_OTHER_SENTINEL),
            Threshold::Unbounded => serializer.serialize_none(),
        }
    }
}

/// One disjunct of a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBranch")]
pub struct Branch {
    pub reliability: f64,
    pub blicket_comparator: Comparator,
    pub blicket_num: Threshold,
    pub nonblicket_comparator: Comparator,
    pub nonblicket_num: Threshold,
}

#[derive(Deserialize)]
struct RawBranch {
    reliability: f64,
    blicket_comparator: Comparator,
    #[serde(default)]
    blicket_num: Value,
    nonblicket_comparator: Comparator,
    #[serde(default)]
    nonblicket_num: Value,
}

impl TryFrom<RawBranch> for Branch {
    type Error = BonusError;

    fn try_from(raw: RawBranch) -> Result<Self> {
        let nonblicket_num = Threshold::from_value("nonblicket_num", &raw.nonblicket_num)?;
        if nonblicket_num == Threshold::SameAsOther {
            return Err(BonusError::InvalidThreshold {
                field: "nonblicket_num".to_string(),
                value: raw.nonblicket_num.to_string(),
            });
        }

        // a threshold next to `any` is kept for export and ignored when evaluating
        let branch = Branch {
            reliability: raw.reliability,
            blicket_comparator: raw.blicket_comparator,
            blicket_num: Threshold::from_value("blicket_num", &raw.blicket_num)?,
            nonblicket_comparator: raw.nonblicket_comparator,
            nonblicket_num,
        };
        branch.check_reliability()?;
        Ok(branch)
    }
}

impl Branch {
    pub fn new(
        reliability: f64,
        blicket_comparator: Comparator,
        blicket_num: Threshold,
        nonblicket_comparator: Comparator,
        nonblicket_num: Threshold,
    ) -> Self {
        Self {
            reliability,
            blicket_comparator,
            blicket_num,
            nonblicket_comparator,
            nonblicket_num,
        }
    }

    /// Branch that fires on every combo with the given reliability.
    pub fn always(reliability: f64) -> Self {
        Self::new(
            reliability,
            Comparator::Any,
            Threshold::Unbounded,
            Comparator::Any,
            Threshold::Unbounded,
        )
    }

    pub fn with_reliability(mut self, reliability: f64) -> Self {
        self.reliability = reliability;
        self
    }

    pub fn with_blicket(mut self, comparator: Comparator, threshold: Threshold) -> Self {
        self.blicket_comparator = comparator;
        self.blicket_num = threshold;
        self
    }

    pub fn with_nonblicket(mut self, comparator: Comparator, threshold: Threshold) -> Self {
        self.nonblicket_comparator = comparator;
        self.nonblicket_num = threshold;
        self
    }

    fn check_reliability(&self) -> Result<()> {
        if (0.0..=1.0).contains(&self.reliability) {
            Ok(())
        } else {
            Err(BonusError::InvalidReliability {
                value: self.reliability,
            })
        }
    }
}

/// Disjunction of branches. An empty rule never predicts activation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rule {
    pub branches: Vec<Branch>,
}

impl Rule {
    pub fn new(branches: Vec<Branch>) -> Self {
        Self { branches }
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }
}

impl From<Vec<Branch>> for Rule {
    fn from(branches: Vec<Branch>) -> Self {
        Self::new(branches)
    }
}

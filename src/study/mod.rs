//! Typed views over the study's raw exports.
//!
//! The experiment server dumps every recorded chunk of every session into one
//! JSON array, and the recruiting platform exports a tab-separated participant
//! ID file. Chunks are kept as raw JSON so they can be re-exported verbatim;
//! the accessors here read the fields the pipeline needs.

pub mod filter;
pub mod io;

use crate::error::{BonusError, Result};
use crate::rule::{Branch, Rule};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use filter::{FilterOutcome, FilterStats, ParticipantFilter};
pub use io::{read_chunks, read_participant_records, write_chunks};

/// One row of the participant ID file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub participant_id: Option<String>,
    pub session_id: Option<String>,
}

impl ParticipantRecord {
    pub fn new(participant_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            participant_id: Some(participant_id.into()),
            session_id: Some(session_id.into()),
        }
    }
}

/// A single recorded chunk of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataChunk(pub Value);

impl DataChunk {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.0.get("sessionId").and_then(Value::as_str)
    }

    pub fn seq_key(&self) -> Option<&str> {
        self.0.get("seq_key").and_then(Value::as_str)
    }

    /// Whether the session ended in a trouble route (failed comprehension or
    /// captcha). Absent or null counts as not trouble.
    pub fn is_trouble(&self) -> bool {
        self.0.get("is_trouble").is_some_and(is_truthy)
    }

    pub fn bonus_per_q(&self) -> Result<f64> {
        self.0
            .get("bonus_per_q")
            .and_then(Value::as_f64)
            .ok_or_else(|| BonusError::missing_field("bonus_per_q"))
    }

    /// Quiz forms in recorded order.
    pub fn quiz_forms(&self) -> Result<Vec<(String, QuizForm)>> {
        let quiz = self
            .0
            .get("quiz_data")
            .and_then(Value::as_object)
            .ok_or_else(|| BonusError::missing_field("quiz_data"))?;

        quiz.iter()
            .map(|(name, form)| {
                if form.get("teaching_ex").is_none() {
                    return Err(BonusError::missing_field(format!(
                        "quiz_data.{name}.teaching_ex"
                    )));
                }
                let form = QuizForm::deserialize(form)?;
                Ok((name.clone(), form))
            })
            .collect()
    }
}

/// Truthiness of a JSON value: null, false, empty strings and empty
/// containers are false; everything else, including `0`, is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(_) => true,
    }
}

/// One quiz question: the teaching examples shown and the rule the
/// participant wrote down for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizForm {
    pub teaching_ex: Vec<TeachingExample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<Vec<RuleEntry>>,
}

impl QuizForm {
    /// The participant's rule; a form without one yields the empty rule.
    pub fn rule(&self) -> Rule {
        self.rule
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|entry| entry.branch.clone())
            .collect::<Vec<_>>()
            .into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub branch: Branch,
}

/// A combo shown to the participant and whether the detector lit up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeachingExample {
    pub blicket_nonblicket_combo: String,
    pub detector_state: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TeachingExample {
    pub fn new(combo: impl Into<String>, detector_state: bool) -> Self {
        Self {
            blicket_nonblicket_combo: combo.into(),
            detector_state,
            extra: Map::new(),
        }
    }
}

use crate::config::StudyShape;
use crate::error::{BonusError, Result};
use crate::rule::Rule;
use crate::study::DataChunk;
use crate::table::{CSV, TableWriter};
use std::path::Path;

pub const RULE_COLUMNS: [&str; 5] = [
    "session_id",
    "form",
    "branches",
    "teaching_combo",
    "teaching_activation",
];

/// One teaching example paired with the rule the participant gave for its form.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleRow {
    pub session_id: String,
    pub form: String,
    pub branches: Rule,
    pub teaching_combo: String,
    pub teaching_activation: bool,
}

impl RuleRow {
    fn to_record(&self) -> Result<[String; 5]> {
        Ok([
            self.session_id.clone(),
            self.form.clone(),
            serde_json::to_string(&self.branches)?,
            self.teaching_combo.clone(),
            // pandas spelling, so the table reads back as booleans
            if self.teaching_activation { "True" } else { "False" }.to_string(),
        ])
    }
}

/// One row per teaching example across every ending chunk and quiz form.
/// The row count must match the study design.
pub fn rule_rows(endings: &[DataChunk], shape: &StudyShape) -> Result<Vec<RuleRow>> {
    let mut rows = Vec::with_capacity(endings.len() * shape.rows_per_session());
    let mut empty_rules = 0;

    for chunk in endings {
        let session_id = chunk.session_id().unwrap_or_default();
        for (form_name, form) in chunk.quiz_forms()? {
            let rule = form.rule();
            if rule.is_empty() {
                empty_rules += 1;
                tracing::warn!(
                    "Session {} gave no rule for form {}; it scores as a rule that never fires",
                    session_id,
                    form_name
                );
            }

            rows.extend(form.teaching_ex.iter().map(|ex| RuleRow {
                session_id: session_id.to_string(),
                form: form_name.clone(),
                branches: rule.clone(),
                teaching_combo: ex.blicket_nonblicket_combo.clone(),
                teaching_activation: ex.detector_state,
            }));
        }
    }

    let expected = endings.len() * shape.rows_per_session();
    if rows.len() != expected {
        return Err(BonusError::shape("rule rows", expected, rows.len()));
    }

    tracing::debug!(
        "Reshaped {} ending chunks into {} rule rows ({} empty rules)",
        endings.len(),
        rows.len(),
        empty_rules
    );
    Ok(rows)
}

pub fn write_rule_table(path: impl AsRef<Path>, rows: &[RuleRow]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = TableWriter::create(path, CSV)?;
    writer.write_record(RULE_COLUMNS)?;
    for row in rows {
        writer.write_record(row.to_record()?)?;
    }
    writer.finish()?;

    tracing::info!("Saved rule table ({} rows) to {}", rows.len(), path.display());
    Ok(())
}

use crate::error::Result;
use crate::rule::{Branch, Comparator, Threshold};
use crate::study::{DataChunk, TeachingExample};
use crate::table::{CSV, TableWriter};
use std::path::Path;

pub const BRANCH_COLUMNS: [&str; 9] = [
    "session_id",
    "form",
    "branch_dex",
    "reliability",
    "blicket_comparator",
    "blicket_num",
    "nonblicket_comparator",
    "nonblicket_num",
    "exs",
];

/// One branch of one participant's rule for one form.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchRow {
    pub session_id: String,
    pub form: String,
    pub branch_dex: usize,
    pub reliability: f64,
    pub blicket_comparator: Comparator,
    pub blicket_num: Threshold,
    pub nonblicket_comparator: Comparator,
    pub nonblicket_num: Threshold,
    /// Teaching examples of the form, kept whole.
    pub exs: Vec<TeachingExample>,
}

impl BranchRow {
    fn new(
        session_id: &str,
        form: &str,
        branch_dex: usize,
        branch: &Branch,
        exs: &[TeachingExample],
    ) -> Self {
        Self {
            session_id: session_id.to_string(),
            form: form.to_string(),
            branch_dex,
            reliability: branch.reliability,
            blicket_comparator: branch.blicket_comparator,
            blicket_num: branch.blicket_num,
            nonblicket_comparator: branch.nonblicket_comparator,
            nonblicket_num: branch.nonblicket_num,
            exs: exs.to_vec(),
        }
    }

    fn to_record(&self) -> Result<[String; 9]> {
        Ok([
            self.session_id.clone(),
            self.form.clone(),
            self.branch_dex.to_string(),
            self.reliability.to_string(),
            self.blicket_comparator.to_string(),
            self.blicket_num.to_cell(),
            self.nonblicket_comparator.to_string(),
            self.nonblicket_num.to_cell(),
            serde_json::to_string(&self.exs)?,
        ])
    }
}

/// One row per branch, across every ending chunk and quiz form. Forms without
/// a rule contribute no rows.
pub fn branch_rows(endings: &[DataChunk]) -> Result<Vec<BranchRow>> {
    let mut rows = Vec::new();
    for chunk in endings {
        let session_id = chunk.session_id().unwrap_or_default();
        for (form_name, form) in chunk.quiz_forms()? {
            let rule = form.rule();
            rows.extend(rule.branches.iter().enumerate().map(|(dex, branch)| {
                BranchRow::new(session_id, &form_name, dex, branch, &form.teaching_ex)
            }));
        }
    }

    tracing::debug!(
        "Reshaped {} ending chunks into {} branch rows",
        endings.len(),
        rows.len()
    );
    Ok(rows)
}

pub fn write_branch_table(path: impl AsRef<Path>, rows: &[BranchRow]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = TableWriter::create(path, CSV)?;
    writer.write_record(BRANCH_COLUMNS)?;
    for row in rows {
        writer.write_record(row.to_record()?)?;
    }
    writer.finish()?;

    tracing::info!("Saved branch table ({} rows) to {}", rows.len(), path.display());
    Ok(())
}

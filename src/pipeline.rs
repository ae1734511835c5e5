//! File-to-file batch pipeline: filter, reshape, score, export.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::reshape::{
    BranchRow, RuleRow, branch_rows, rule_rows, write_branch_table, write_rule_table,
};
use crate::scoring::{
    BonusSummary, FormScore, Payout, SessionBonus, form_scores, payouts, score_rows,
    session_bonuses, write_bonus_files,
};
use crate::study::{
    DataChunk, FilterOutcome, ParticipantFilter, read_chunks, read_participant_records,
    write_chunks,
};
use std::time::Instant;

/// Everything the scoring stage produced for one batch.
#[derive(Debug, Clone, Default)]
pub struct BonusReport {
    pub form_scores: Vec<FormScore>,
    pub bonuses: Vec<SessionBonus>,
    pub payouts: Vec<Payout>,
    pub summary: Option<BonusSummary>,
}

pub struct BonusPipeline {
    config: PipelineConfig,
}

impl BonusPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Filter the raw chunk dump down to valid ending chunks and save them.
    pub fn filter(&self) -> Result<FilterOutcome> {
        let paths = &self.config.paths;
        let records = read_participant_records(paths.ids_file())?;
        let chunks = read_chunks(paths.chunks_file())?;

        let outcome = ParticipantFilter::new(self.config.filter.clone()).run(&records, &chunks);

        let save_path = paths.valid_endings_file();
        write_chunks(&save_path, &outcome.endings)?;
        tracing::info!(
            "Saved {} good ending chunks to {}",
            outcome.endings.len(),
            save_path.display()
        );
        Ok(outcome)
    }

    /// Ending chunks saved by [`BonusPipeline::filter`].
    pub fn load_endings(&self) -> Result<Vec<DataChunk>> {
        let endings = read_chunks(self.config.paths.valid_endings_file())?;
        let ending_key = self.config.filter.ending_seq_key.as_str();
        Ok(endings
            .into_iter()
            .filter(|chunk| chunk.seq_key() == Some(ending_key))
            .collect())
    }

    pub fn reshape_branches(&self, endings: &[DataChunk]) -> Result<Vec<BranchRow>> {
        let rows = branch_rows(endings)?;
        write_branch_table(self.config.paths.branches_file(), &rows)?;
        Ok(rows)
    }

    pub fn reshape_rules(&self, endings: &[DataChunk]) -> Result<Vec<RuleRow>> {
        let rows = rule_rows(endings, &self.config.shape)?;
        write_rule_table(self.config.paths.rules_file(), &rows)?;
        Ok(rows)
    }

    /// Score rule rows, compute bonuses and write the bulk bonus files.
    pub fn score(&self, endings: &[DataChunk], rows: &[RuleRow]) -> Result<BonusReport> {
        let Some(first) = endings.first() else {
            tracing::warn!("No ending chunks to score; no bonus files written");
            return Ok(BonusReport::default());
        };
        let bonus_per_q = first.bonus_per_q()?;

        let scored = score_rows(rows, &self.config.scoring)?;
        let form_scores = form_scores(&scored, &self.config.shape, endings.len())?;
        let bonuses = session_bonuses(&form_scores, bonus_per_q, &self.config.scoring);

        // bonuses are joined against every recorded ID, not just the filtered ones
        let records = read_participant_records(self.config.paths.ids_file())?;
        let payouts = payouts(&bonuses, &records);
        let summary = BonusSummary::of(&payouts);
        if let Some(s) = &summary {
            tracing::info!(
                "Bonus summary: count={} mean={:.4} std={:.4} min={:.2} max={:.2}",
                s.count,
                s.mean,
                s.std,
                s.min,
                s.max
            );
        }

        let paths = &self.config.paths;
        write_bonus_files(paths.bonus_ids_file(), paths.bonus_amounts_file(), &payouts)?;

        Ok(BonusReport {
            form_scores,
            bonuses,
            payouts,
            summary,
        })
    }

    /// Run every stage for the configured batch.
    pub fn run(&self) -> Result<BonusReport> {
        let start = Instant::now();
        tracing::info!("Running bonus pipeline for batch {}", self.config.paths.batch);

        let outcome = self.filter()?;
        self.reshape_branches(&outcome.endings)?;
        let rows = self.reshape_rules(&outcome.endings)?;
        let report = self.score(&outcome.endings, &rows)?;

        tracing::info!(
            "Batch {} done in {}ms: {} payouts",
            self.config.paths.batch,
            start.elapsed().as_millis(),
            report.payouts.len()
        );
        Ok(report)
    }
}

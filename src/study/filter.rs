//! Keep only real participants who reached a good ending.

use super::{DataChunk, ParticipantRecord};
use crate::config::FilterConfig;
use std::collections::HashSet;

/// Counts after each filtering step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub raw_records: usize,
    pub valid_records: usize,
    pub unique_valid_participants: usize,
    pub matched_chunks: usize,
    pub valid_endings: usize,
}

#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub valid_records: Vec<ParticipantRecord>,
    pub endings: Vec<DataChunk>,
    pub stats: FilterStats,
}

pub struct ParticipantFilter {
    config: FilterConfig,
    test_marker: String,
}

impl ParticipantFilter {
    pub fn new(config: FilterConfig) -> Self {
        let test_marker = config.test_marker.to_lowercase();
        Self {
            config,
            test_marker,
        }
    }

    /// Whether a record belongs to a real participant with a usable session.
    pub fn is_valid(&self, record: &ParticipantRecord) -> bool {
        let Some(participant_id) = record.participant_id.as_deref() else {
            return false;
        };

        !participant_id.to_lowercase().contains(&self.test_marker)
            && participant_id.chars().count() > self.config.min_participant_id_len
            && record.session_id.as_deref() != Some(self.config.missing_session_marker.as_str())
    }

    pub fn filter_participants(&self, records: &[ParticipantRecord]) -> Vec<ParticipantRecord> {
        records
            .iter()
            .filter(|record| self.is_valid(record))
            .cloned()
            .collect()
    }

    /// Chunks whose session matches a valid record, in input order.
    pub fn matching_chunks(
        &self,
        chunks: &[DataChunk],
        valid_records: &[ParticipantRecord],
    ) -> Vec<DataChunk> {
        let sessions: Vec<&str> = valid_records
            .iter()
            .filter_map(|r| r.session_id.as_deref())
            .collect();

        chunks
            .iter()
            .filter(|chunk| {
                chunk
                    .session_id()
                    .is_some_and(|id| sessions.iter().any(|session| session.contains(id)))
            })
            .cloned()
            .collect()
    }

    pub fn is_good_ending(&self, chunk: &DataChunk) -> bool {
        chunk.seq_key() == Some(self.config.ending_seq_key.as_str()) && !chunk.is_trouble()
    }

    /// Ending chunks of valid sessions that did not end in trouble.
    pub fn select_valid_endings(
        &self,
        chunks: &[DataChunk],
        valid_records: &[ParticipantRecord],
    ) -> Vec<DataChunk> {
        self.matching_chunks(chunks, valid_records)
            .into_iter()
            .filter(|chunk| self.is_good_ending(chunk))
            .collect()
    }

    pub fn run(&self, records: &[ParticipantRecord], chunks: &[DataChunk]) -> FilterOutcome {
        tracing::info!("Number of rows in the raw participant ID file: {}", records.len());

        let valid_records = self.filter_participants(records);
        let unique_valid_participants = valid_records
            .iter()
            .filter_map(|r| r.participant_id.as_deref())
            .collect::<HashSet<_>>()
            .len();
        tracing::info!("Number unique valid participant IDs: {}", unique_valid_participants);
        tracing::info!("Number total valid participant IDs: {}", valid_records.len());

        let matched = self.matching_chunks(chunks, &valid_records);
        tracing::info!(
            "Number of chunks that match to the valid participant IDs: {}",
            matched.len()
        );

        let matched_chunks = matched.len();
        let endings: Vec<_> = matched
            .into_iter()
            .filter(|chunk| self.is_good_ending(chunk))
            .collect();
        tracing::info!(
            "Final number of ending chunks that are also not trouble: {}",
            endings.len()
        );

        let stats = FilterStats {
            raw_records: records.len(),
            valid_records: valid_records.len(),
            unique_valid_participants,
            matched_chunks,
            valid_endings: endings.len(),
        };

        FilterOutcome {
            valid_records,
            endings,
            stats,
        }
    }
}

impl Default for ParticipantFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

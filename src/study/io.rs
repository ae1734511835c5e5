use super::{DataChunk, ParticipantRecord};
use crate::error::Result;
use crate::table::{TSV, Table};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Read the tab-separated participant ID file. Only the `participant_id` and
/// `session_id` columns are used.
pub fn read_participant_records(path: impl AsRef<Path>) -> Result<Vec<ParticipantRecord>> {
    let path = path.as_ref();
    let table = Table::from_file(path, TSV)?;
    let participant_col = table.require_column("participant_id")?;
    let session_col = table.require_column("session_id")?;

    let records: Vec<_> = table
        .rows
        .iter()
        .map(|row| ParticipantRecord {
            participant_id: Table::cell(row, participant_col).map(str::to_string),
            session_id: Table::cell(row, session_col).map(str::to_string),
        })
        .collect();

    tracing::debug!("Read {} participant records from {}", records.len(), path.display());
    Ok(records)
}

pub fn read_chunks(path: impl AsRef<Path>) -> Result<Vec<DataChunk>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let chunks: Vec<DataChunk> = serde_json::from_reader(reader)?;

    tracing::debug!("Read {} chunks from {}", chunks.len(), path.display());
    Ok(chunks)
}

pub fn write_chunks(path: impl AsRef<Path>, chunks: &[DataChunk]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, chunks)?;
    writer.flush()?;

    tracing::debug!("Saved {} chunks to {}", chunks.len(), path.display());
    Ok(())
}

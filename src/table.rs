//! Delimited text tables (CSV/TSV) with quote handling.

use crate::error::{BonusError, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub const CSV: char = ',';
pub const TSV: char = '\t';

/// A parsed table: one header row followed by data rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_file(path: impl AsRef<Path>, delimiter: char) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, delimiter)
    }

    pub fn parse(content: &str, delimiter: char) -> Result<Self> {
        let mut records = parse_records(content, delimiter)?.into_iter();
        let headers = records.next().unwrap_or_default();
        Ok(Self {
            headers,
            rows: records.collect(),
        })
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column(name)
            .ok_or_else(|| BonusError::missing_field(format!("column '{name}'")))
    }

    /// Cell at `column` of `row`, `None` when the row is short or the cell empty.
    pub fn cell<'a>(row: &'a [String], column: usize) -> Option<&'a str> {
        row.get(column).map(String::as_str).filter(|c| !c.is_empty())
    }
}

fn parse_records(content: &str, delimiter: char) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut quote_line = 0;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_line = line;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                line += 1;
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            c if c == delimiter => record.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(BonusError::Table {
            line: quote_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    // blank lines carry no record
    records.retain(|r| !(r.len() == 1 && r[0].is_empty()));
    Ok(records)
}

/// Writes delimited records, quoting fields where needed.
pub struct TableWriter<W: Write> {
    out: W,
    delimiter: char,
}

impl TableWriter<BufWriter<File>> {
    /// Create `path` (and its parent directories) for writing.
    pub fn create(path: impl AsRef<Path>, delimiter: char) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self::new(BufWriter::new(File::create(path)?), delimiter))
    }
}

impl<W: Write> TableWriter<W> {
    pub fn new(out: W, delimiter: char) -> Self {
        Self { out, delimiter }
    }

    pub fn write_record<I, S>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut line = String::new();
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                line.push(self.delimiter);
            }
            self.push_field(&mut line, field.as_ref());
        }
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    fn push_field(&self, line: &mut String, field: &str) {
        let needs_quotes = field
            .chars()
            .any(|c| c == self.delimiter || c == '"' || c == '\n' || c == '\r');
        if needs_quotes {
            line.push('"');
            line.push_str(&field.replace('"', "\"\""));
            line.push('"');
        } else {
            line.push_str(field);
        }
    }

    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

use crate::error::ReadError;

use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use anyhow::Result;
use bytelines::ByteLines;
use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use tracing::{debug, info};

/// Records not headed by the source-language code start with this.
pub const EXTERNAL_PREFIX: &str = "<http:";

/// Returns an iterator over the raw lines of the dump at the given path,
/// decompressing by file extension.
///
/// # Errors
///
/// This function will return an error if the file at the given path cannot be opened.
pub fn dump_lines(path: &Path) -> Result<impl Iterator<Item = io::Result<Vec<u8>>>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let extension = path.extension().and_then(|ext| ext.to_str());
    let uncompressed: Box<dyn Read> = match extension {
        Some("bz2") => Box::new(MultiBzDecoder::new(reader)),
        Some("gz") => Box::new(MultiGzDecoder::new(reader)),
        _ => Box::new(reader),
    };
    let lines = ByteLines::new(BufReader::new(uncompressed));
    Ok(lines.into_iter())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Headed by the source-language code; the builders read these.
    Source,
    /// Headed by an external reference.
    External,
}

/// The trimmed lines of one blank-line-delimited record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordBuffer {
    pub kind: RecordKind,
    pub first_line: usize,
    pub lines: Vec<String>,
}

impl RecordBuffer {
    /// Moves a property fused onto the subject line onto its own line, so that
    /// line 0 is always the bare identifier and line 1 the type statement.
    #[must_use]
    pub fn reorganized(self) -> Self {
        let Some(first) = self.lines.first() else {
            debug!("record buffer at line {}+ is empty", self.first_line);
            return self;
        };
        let mut tokens = first.split_whitespace();
        let subject = tokens.next().unwrap_or_default().to_string();
        let rest = tokens.collect::<Vec<_>>().join(" ");
        if rest.is_empty() {
            return self;
        }
        let mut lines = Vec::with_capacity(self.lines.len() + 1);
        lines.push(subject);
        lines.push(rest);
        lines.extend(self.lines.into_iter().skip(1));
        Self { lines, ..self }
    }

    pub fn key(&self) -> &str {
        self.lines.first().map_or("", |line| line.trim())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReadStats {
    pub lines_read: usize,
    pub records: usize,
    pub source_records: usize,
    pub external_records: usize,
    pub skipped_lines: usize,
}

impl ReadStats {
    pub fn log(&self) {
        info!("lines read from dump: {}", self.lines_read);
        info!("records grouped: {}", self.records);
        info!("records headed by source language code: {}", self.source_records);
        info!("records headed by {EXTERNAL_PREFIX}: {}", self.external_records);
        info!("stray lines skipped: {}", self.skipped_lines);
    }
}

/// Groups a line stream into records: a record starts at a line beginning
/// with the source-language prefix or [`EXTERNAL_PREFIX`] and runs until the
/// next blank line.
pub struct RecordReader<L> {
    lines: L,
    prefix: String,
    limit: Option<usize>,
    line_number: usize,
    stats: ReadStats,
    done: bool,
}

impl<L> RecordReader<L>
where
    L: Iterator<Item = io::Result<Vec<u8>>>,
{
    pub fn new(lines: L, prefix: &str, limit: Option<usize>) -> Self {
        Self {
            lines,
            prefix: prefix.to_string(),
            limit,
            line_number: 0,
            stats: ReadStats::default(),
            done: false,
        }
    }

    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }

    fn next_line(&mut self) -> Option<Result<String, ReadError>> {
        let bytes = self.lines.next()?;
        self.line_number += 1;
        self.stats.lines_read += 1;
        let line = match bytes {
            Ok(bytes) => String::from_utf8(bytes).map_err(|source| ReadError::Decode {
                line: self.line_number,
                source,
            }),
            Err(e) => Err(ReadError::Io(e)),
        };
        Some(line)
    }

    fn kind_of(&self, line: &str) -> Option<RecordKind> {
        if line.starts_with(&self.prefix) {
            Some(RecordKind::Source)
        } else if line.starts_with(EXTERNAL_PREFIX) {
            Some(RecordKind::External)
        } else {
            None
        }
    }

    fn fail(&mut self, e: ReadError) -> Option<Result<RecordBuffer, ReadError>> {
        self.done = true;
        Some(Err(e))
    }
}

impl<L> Iterator for RecordReader<L>
where
    L: Iterator<Item = io::Result<Vec<u8>>>,
{
    type Item = Result<RecordBuffer, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done || self.limit.map_or(false, |limit| self.line_number >= limit) {
                return None;
            }
            let line = match self.next_line() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => return self.fail(e),
                Some(Ok(line)) => line,
            };
            let Some(kind) = self.kind_of(&line) else {
                if !line.trim().is_empty() {
                    info!("line {} not processed as record: {line}", self.line_number);
                    self.stats.skipped_lines += 1;
                }
                continue;
            };
            let first_line = self.line_number;
            let mut lines = vec![line.trim().to_string()];
            loop {
                match self.next_line() {
                    None => break,
                    Some(Err(e)) => return self.fail(e),
                    Some(Ok(line)) if line.trim().is_empty() => break,
                    Some(Ok(line)) => lines.push(line.trim().to_string()),
                }
            }
            self.stats.records += 1;
            match kind {
                RecordKind::Source => self.stats.source_records += 1,
                RecordKind::External => self.stats.external_records += 1,
            }
            return Some(Ok(RecordBuffer {
                kind,
                first_line,
                lines,
            }));
        }
    }
}

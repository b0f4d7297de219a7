//! Record splitter
//!
//! Turns the line stream of a lineage export into per-record text blocks.
//! The first `header_lines` lines are skipped; after that every line starting
//! with the record separator closes the block accumulated so far.

use crate::config::ParserConfig;

/// The raw text of one cell record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordBlock {
    /// Position of the record in the file (0-based)
    pub ordinal: usize,
    /// Line number (1-based) of the first line of the block
    pub line_number: usize,
    pub lines: Vec<String>,
}

impl RecordBlock {
    /// The block as one newline-joined string, for diagnostics
    pub fn raw(&self) -> String {
        self.lines.join("\n")
    }
}

/// Iterator over the record blocks of a line stream
///
/// Separator lines with nothing accumulated before them are ignored. Lines
/// after the final separator do not form a record; they are logged and
/// dropped.
pub struct RecordSplitter<'c, I> {
    lines: I,
    config: &'c ParserConfig,
    /// Number of lines consumed so far
    line_number: usize,
    ordinal: usize,
    skipped_header: bool,
}

impl<'c, I, S> RecordSplitter<'c, I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    pub fn new(lines: I, config: &'c ParserConfig) -> Self {
        Self {
            lines,
            config,
            line_number: 0,
            ordinal: 0,
            skipped_header: false,
        }
    }

    fn skip_header(&mut self) {
        for _ in 0..self.config.header_lines {
            if self.lines.next().is_none() {
                break;
            }
            self.line_number += 1;
        }
        self.skipped_header = true;
    }
}

impl<'c, I, S> Iterator for RecordSplitter<'c, I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = RecordBlock;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.skipped_header {
            self.skip_header();
        }

        let mut buffer: Vec<String> = Vec::new();
        let mut start = self.line_number + 1;

        while let Some(line) = self.lines.next() {
            self.line_number += 1;
            let line = line.as_ref();

            if self.config.is_separator(line) {
                if buffer.is_empty() {
                    start = self.line_number + 1;
                    continue;
                }
                let block = RecordBlock {
                    ordinal: self.ordinal,
                    line_number: start,
                    lines: buffer,
                };
                self.ordinal += 1;
                return Some(block);
            }

            buffer.push(line.to_string());
        }

        if !buffer.is_empty() {
            log::warn!(
                "Dropping {} line(s) after the last record separator (line {})",
                buffer.len(),
                start
            );
        }
        None
    }
}

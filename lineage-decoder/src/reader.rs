//! Main reader API
//!
//! This module provides the primary interface for the library. The
//! [`LineageReader`] drives the whole pipeline: split the export into record
//! blocks, parse each block into a cell, and link the cells into a forest.

use crate::config::ParserConfig;
use crate::lineage::{LineageForest, TreeBuilder};
use crate::parser::{parse_record, RecordSplitter};
use crate::types::Result;
use std::path::Path;

/// Entry point for reading lineage exports
#[derive(Debug, Clone, Default)]
pub struct LineageReader {
    config: ParserConfig,
}

impl LineageReader {
    /// Create a reader with the given configuration
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Read and parse a lineage export file
    ///
    /// # Example
    /// ```no_run
    /// use lineage_decoder::{LineageReader, ParserConfig};
    /// use std::path::Path;
    ///
    /// let reader = LineageReader::new(ParserConfig::new());
    /// let forest = reader.read_file(Path::new("embryo.sbd")).unwrap();
    /// println!("{} cells up to frame {}", forest.cells().len(), forest.last_frame());
    /// ```
    pub fn read_file(&self, path: &Path) -> Result<LineageForest> {
        log::info!("Reading lineage file: {:?}", path);
        self.config.validate()?;

        let text = read_text(path)?;
        let forest = self.parse_str(&text);

        log::info!(
            "Lineage file loaded: {} cells ({} valid, {} rejected)",
            forest.cells().len(),
            forest.valid_cells().len(),
            forest.invalid_cells().len()
        );
        Ok(forest)
    }

    /// Parse lineage export text that is already in memory
    ///
    /// Malformed records never abort the scan; they end up in
    /// [`LineageForest::invalid_cells`] with a diagnostic attached.
    pub fn parse_str(&self, text: &str) -> LineageForest {
        self.parse_lines(text.lines())
    }

    /// Parse a stream of lines
    pub fn parse_lines<I, S>(&self, lines: I) -> LineageForest
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = TreeBuilder::new();
        for block in RecordSplitter::new(lines.into_iter(), &self.config) {
            let cell = parse_record(&block);
            log::debug!(
                "Record {} at line {}: {} ({})",
                block.ordinal,
                block.line_number,
                cell,
                if cell.valid { "valid" } else { "invalid" }
            );
            builder.push(cell);
        }
        builder.finish()
    }
}

/// Read a text file, falling back to Latin-1 when it is not UTF-8
///
/// The tracking tool writes files in the Windows code page of the machine it
/// runs on; user names and comments are the usual offenders.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            log::warn!("{:?} is not UTF-8, trying Latin-1 encoding", path);
            Ok(e.into_bytes().iter().map(|&b| b as char).collect())
        }
    }
}

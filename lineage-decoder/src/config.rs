//! Parser configuration types
//!
//! This module defines the small amount of configuration the record parser
//! needs. Everything about export (scaling, interpolation density, filtering)
//! belongs to the application layer.

use crate::types::{LineageError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the lineage reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Number of file header lines skipped before the first record
    #[serde(default = "default_header_lines")]
    pub header_lines: usize,

    /// Prefix of the line that terminates a record
    #[serde(default = "default_record_separator")]
    pub record_separator: String,
}

fn default_header_lines() -> usize {
    7
}

fn default_record_separator() -> String {
    "---".to_string()
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            header_lines: default_header_lines(),
            record_separator: default_record_separator(),
        }
    }
}

impl ParserConfig {
    /// Create a new parser configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the number of skipped header lines
    pub fn with_header_lines(mut self, lines: usize) -> Self {
        self.header_lines = lines;
        self
    }

    /// Builder method: set the record separator prefix
    pub fn with_record_separator(mut self, separator: impl Into<String>) -> Self {
        self.record_separator = separator.into();
        self
    }

    /// Check that the configuration can split a file at all
    pub fn validate(&self) -> Result<()> {
        if self.record_separator.is_empty() {
            return Err(LineageError::InvalidConfig(
                "record_separator must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Check if a line terminates the current record
    pub fn is_separator(&self, line: &str) -> bool {
        line.starts_with(self.record_separator.as_str())
    }
}

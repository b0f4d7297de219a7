//! Core types for the lineage decoder library
//!
//! This module defines the data model shared by every stage of the pipeline:
//! spots, cells, the per-record diagnostics and the library error type. The
//! record parser produces these values; the tree builder only links them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for library operations
pub type Result<T> = std::result::Result<T, LineageError>;

/// Errors that abort an operation (I/O, settings, configuration)
///
/// Malformed records never produce a `LineageError`; they are reported through
/// [`RecordDiagnostic`] on the rejected cell instead.
#[derive(Debug, thiserror::Error)]
pub enum LineageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed settings line {line}: {reason}")]
    SettingsParseError { line: usize, reason: String },

    #[error("Missing setting {section}.{key}")]
    MissingSetting { section: String, key: String },

    #[error("Invalid setting {section}.{key} = {value:?}")]
    InvalidSetting {
        section: String,
        key: String,
        value: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Index of a cell inside a [`LineageForest`](crate::LineageForest) arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellId(pub usize);

impl CellId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single tracked observation of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spot {
    /// Frame number (1-based, 0 is the "unset" sentinel of the format)
    pub frame: u32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// True if produced by interpolation or division synthesis
    #[serde(default)]
    pub synthetic: bool,
}

impl Spot {
    /// Create a parsed (non-synthetic) spot
    pub fn new(frame: u32, x: i32, y: i32, z: i32) -> Self {
        Self {
            frame,
            x,
            y,
            z,
            synthetic: false,
        }
    }

    /// Create a spot that does not come from the source file
    pub fn synthetic(frame: u32, x: i32, y: i32, z: i32) -> Self {
        Self {
            frame,
            x,
            y,
            z,
            synthetic: true,
        }
    }
}

/// Whether a cell is known to divide into a left or right daughter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DaughterFlag {
    /// `-1` in the source file
    #[default]
    Unknown,
    /// `0` in the source file
    Absent,
    /// `1` in the source file
    Present,
}

impl DaughterFlag {
    /// Decode the raw sentinel value (-1, 0, 1)
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            -1 => Some(DaughterFlag::Unknown),
            0 => Some(DaughterFlag::Absent),
            1 => Some(DaughterFlag::Present),
            _ => None,
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            DaughterFlag::Unknown => -1,
            DaughterFlag::Absent => 0,
            DaughterFlag::Present => 1,
        }
    }
}

impl fmt::Display for DaughterFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_raw())
    }
}

/// The four fixed header lines of a cell record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderLine {
    /// Division flags and generic name
    Flags,
    /// Generation birth time, level, wildtype, color, name
    Generation,
    /// Birth frame, level, wildtype, size, shape, color, name
    Birth,
    /// Spot count and comment
    Summary,
}

impl HeaderLine {
    /// 1-based position of the line inside the record
    pub fn number(self) -> usize {
        match self {
            HeaderLine::Flags => 1,
            HeaderLine::Generation => 2,
            HeaderLine::Birth => 3,
            HeaderLine::Summary => 4,
        }
    }
}

impl fmt::Display for HeaderLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "header line {}", self.number())
    }
}

/// Why a single trajectory line was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpotError {
    #[error("expected 4 fields (frame x y z), found {0}")]
    MissingField(usize),

    #[error("field {field} is not an integer: {token:?}")]
    NotAnInteger { field: &'static str, token: String },

    #[error("frame 0 is the unset sentinel")]
    UnsetFrame,
}

/// One failure inside a cell record, tagged with the field group it came from
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("{0} is missing")]
    MissingLine(HeaderLine),

    #[error("{line}: field {field} is malformed: {token:?}")]
    MalformedHeader {
        line: HeaderLine,
        field: &'static str,
        token: String,
    },

    #[error("record has no spots")]
    EmptyTrajectory,

    #[error("record declares {expected} spots but only {found} lines follow")]
    TruncatedTrajectory { expected: usize, found: usize },

    #[error("spot {index}: {source}")]
    MalformedSpot {
        index: usize,
        #[source]
        source: SpotError,
    },
}

/// Everything that went wrong while parsing one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDiagnostic {
    /// Line number (1-based, in the source file) where the record starts
    pub line_number: usize,
    /// The record block exactly as it was read
    pub raw: String,
    pub errors: Vec<RecordError>,
}

impl fmt::Display for RecordDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record at line {}: ", self.line_number)?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

/// One lineage node as parsed from a record
///
/// Header fields that could not be parsed keep their default value; such a
/// cell is always invalid and carries a [`RecordDiagnostic`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    // Header line 1
    pub cells_left: DaughterFlag,
    pub cells_right: DaughterFlag,
    pub active_cells_left: i32,
    pub active_cells_right: i32,
    pub generic_name: String,

    // Header line 2
    /// `None` when line 2 could not be parsed
    pub generation_birth_time: Option<i64>,
    pub generation_level: i32,
    pub generation_wildtype: i32,
    pub generation_color: i64,
    pub generation_name: String,

    // Header line 3
    pub birth_frame: u32,
    /// Level (z) at mitosis
    pub birth_level: i32,
    /// Fate code, see the settings file for the list
    pub wildtype: i32,
    pub size: i32,
    pub shape: i32,
    /// Decimal color value as written by the tracking tool
    pub color: i64,
    pub name: String,

    // Header line 4
    pub n_spots: usize,
    pub comment: String,

    /// Time-ordered trajectory
    pub spots: Vec<Spot>,
    /// Highest spot frame, 0 if there are no spots
    pub last_frame: u32,

    pub valid: bool,
    pub diagnostic: Option<RecordDiagnostic>,
}

impl Cell {
    /// Append a spot and keep `last_frame` current
    pub fn push_spot(&mut self, spot: Spot) {
        self.last_frame = self.last_frame.max(spot.frame);
        self.spots.push(spot);
    }

    pub fn first_spot(&self) -> Option<&Spot> {
        self.spots.first()
    }

    pub fn last_spot(&self) -> Option<&Spot> {
        self.spots.last()
    }

    /// Render the cell back into the record layout read by the parser
    ///
    /// Empty trailing names are omitted, matching how the tracking tool
    /// writes records without a user name.
    pub fn render_record(&self) -> String {
        let mut lines = Vec::with_capacity(4 + self.spots.len());

        lines.push(format!(
            "{} {} {} {} {}",
            self.cells_left,
            self.cells_right,
            self.active_cells_left,
            self.active_cells_right,
            self.generic_name
        ));

        let mut generation = format!(
            "{} {} {} {}",
            self.generation_birth_time.unwrap_or_default(),
            self.generation_level,
            self.generation_wildtype,
            self.generation_color
        );
        if !self.generation_name.is_empty() {
            generation.push(' ');
            generation.push_str(&self.generation_name);
        }
        lines.push(generation);

        let mut birth = format!(
            "{} {} {} {} {} {}",
            self.birth_frame, self.birth_level, self.wildtype, self.size, self.shape, self.color
        );
        if !self.name.is_empty() {
            birth.push(' ');
            birth.push_str(&self.name);
        }
        lines.push(birth);

        if self.comment.is_empty() {
            lines.push(self.n_spots.to_string());
        } else {
            lines.push(format!("{} {}", self.n_spots, self.comment));
        }

        for spot in self.spots.iter().filter(|s| !s.synthetic) {
            lines.push(format!("{} {} {} {}", spot.frame, spot.x, spot.y, spot.z));
        }

        lines.join("\n")
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CELL={}", self.generic_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daughter_flag_raw_values() {
        assert_eq!(DaughterFlag::from_raw(-1), Some(DaughterFlag::Unknown));
        assert_eq!(DaughterFlag::from_raw(0), Some(DaughterFlag::Absent));
        assert_eq!(DaughterFlag::from_raw(1), Some(DaughterFlag::Present));
        assert_eq!(DaughterFlag::from_raw(2), None);
        assert_eq!(DaughterFlag::Present.as_raw(), 1);
        assert_eq!(format!("{}", DaughterFlag::Unknown), "-1");
    }

    #[test]
    fn test_push_spot_tracks_last_frame() {
        let mut cell = Cell::default();
        cell.push_spot(Spot::new(12, 0, 0, 0));
        cell.push_spot(Spot::new(30, 1, 1, 1));
        cell.push_spot(Spot::new(20, 2, 2, 2));
        assert_eq!(cell.last_frame, 30);
        assert_eq!(cell.spots.len(), 3);
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = RecordDiagnostic {
            line_number: 42,
            raw: String::new(),
            errors: vec![
                RecordError::MissingLine(HeaderLine::Summary),
                RecordError::EmptyTrajectory,
            ],
        };
        assert_eq!(
            diagnostic.to_string(),
            "record at line 42: header line 4 is missing; record has no spots"
        );
    }
}

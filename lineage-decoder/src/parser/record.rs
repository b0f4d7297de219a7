//! Cell record parser
//!
//! A record is four header lines followed by `n_spots` trajectory lines:
//!
//! ```text
//! cells_left cells_right active_left active_right generic_name
//! generation_birth_time generation_level generation_wildtype generation_color [generation_name]
//! birth_frame birth_level wildtype size shape color [name]
//! n_spots [comment ...]
//! frame x y z            (n_spots times)
//! ```
//!
//! Parsing never fails: every problem is collected into a
//! [`RecordDiagnostic`] and the cell is marked invalid. Header lines are
//! parsed independently so that the division flags of a record survive a
//! broken line further down.

use crate::parser::spot::parse_spot;
use crate::parser::splitter::RecordBlock;
use crate::types::{Cell, DaughterFlag, HeaderLine, RecordDiagnostic, RecordError};
use std::str::FromStr;

/// Parse a record block into a cell
pub fn parse_record(block: &RecordBlock) -> Cell {
    let mut cell = Cell::default();
    let mut errors = Vec::new();

    let line = |header: HeaderLine| block.lines.get(header.number() - 1);

    match line(HeaderLine::Flags) {
        Some(text) => {
            if let Err(e) = parse_flags_line(text, &mut cell) {
                errors.push(e);
            }
        }
        None => errors.push(RecordError::MissingLine(HeaderLine::Flags)),
    }

    match line(HeaderLine::Generation) {
        Some(text) => {
            if let Err(e) = parse_generation_line(text, &mut cell) {
                errors.push(e);
            }
        }
        None => errors.push(RecordError::MissingLine(HeaderLine::Generation)),
    }

    match line(HeaderLine::Birth) {
        Some(text) => {
            if let Err(e) = parse_birth_line(text, &mut cell) {
                errors.push(e);
            }
        }
        None => errors.push(RecordError::MissingLine(HeaderLine::Birth)),
    }

    let summary_ok = match line(HeaderLine::Summary) {
        Some(text) => match parse_summary_line(text, &mut cell) {
            Ok(()) => true,
            Err(e) => {
                errors.push(e);
                false
            }
        },
        None => {
            errors.push(RecordError::MissingLine(HeaderLine::Summary));
            false
        }
    };

    if summary_ok {
        if cell.n_spots == 0 {
            errors.push(RecordError::EmptyTrajectory);
        } else {
            parse_trajectory(&block.lines[4..], &mut cell, &mut errors);
        }
    }

    if errors.is_empty() {
        cell.valid = true;
    } else {
        // No partial trajectories
        cell.spots.clear();
        cell.last_frame = 0;
        cell.diagnostic = Some(RecordDiagnostic {
            line_number: block.line_number,
            raw: block.raw(),
            errors,
        });
    }

    cell
}

fn parse_trajectory(lines: &[String], cell: &mut Cell, errors: &mut Vec<RecordError>) {
    if lines.len() < cell.n_spots {
        errors.push(RecordError::TruncatedTrajectory {
            expected: cell.n_spots,
            found: lines.len(),
        });
        return;
    }

    for (index, text) in lines.iter().take(cell.n_spots).enumerate() {
        match parse_spot(text) {
            Ok(spot) => cell.push_spot(spot),
            Err(source) => errors.push(RecordError::MalformedSpot { index, source }),
        }
    }
}

/// Token cursor over one header line
struct Fields<'a> {
    line: HeaderLine,
    tokens: std::str::SplitWhitespace<'a>,
}

impl<'a> Fields<'a> {
    fn new(text: &'a str, line: HeaderLine) -> Self {
        Self {
            line,
            tokens: text.split_whitespace(),
        }
    }

    fn number<T: FromStr>(&mut self, field: &'static str) -> Result<T, RecordError> {
        let token = self.tokens.next().unwrap_or_default();
        token.parse().map_err(|_| RecordError::MalformedHeader {
            line: self.line,
            field,
            token: token.to_string(),
        })
    }

    /// Division flag; integers outside {-1, 0, 1} are read as unknown
    fn flag(&mut self, field: &'static str) -> Result<DaughterFlag, RecordError> {
        let raw: i32 = self.number(field)?;
        Ok(DaughterFlag::from_raw(raw).unwrap_or_else(|| {
            log::debug!("{} = {} is not a division flag, treating it as unknown", field, raw);
            DaughterFlag::Unknown
        }))
    }

    fn word(&mut self, field: &'static str) -> Result<String, RecordError> {
        self.tokens
            .next()
            .map(str::to_string)
            .ok_or(RecordError::MalformedHeader {
                line: self.line,
                field,
                token: String::new(),
            })
    }

    fn optional_word(&mut self) -> String {
        self.tokens.next().map(str::to_string).unwrap_or_default()
    }

    fn rest(self) -> String {
        self.tokens.collect::<Vec<_>>().join(" ")
    }
}

// Each line parser assigns its fields only after the whole line succeeded.
// The generic name is the exception: it identifies rejected records too.

fn parse_flags_line(text: &str, cell: &mut Cell) -> Result<(), RecordError> {
    if let Some(name) = text.split_whitespace().nth(4) {
        cell.generic_name = name.to_string();
    }

    let mut fields = Fields::new(text, HeaderLine::Flags);
    let cells_left = fields.flag("cells_left")?;
    let cells_right = fields.flag("cells_right")?;
    let active_cells_left = fields.number("active_cells_left")?;
    let active_cells_right = fields.number("active_cells_right")?;
    let generic_name = fields.word("generic_name")?;

    cell.cells_left = cells_left;
    cell.cells_right = cells_right;
    cell.active_cells_left = active_cells_left;
    cell.active_cells_right = active_cells_right;
    cell.generic_name = generic_name;
    Ok(())
}

fn parse_generation_line(text: &str, cell: &mut Cell) -> Result<(), RecordError> {
    let mut fields = Fields::new(text, HeaderLine::Generation);
    let birth_time = fields.number("generation_birth_time")?;
    let level = fields.number("generation_level")?;
    let wildtype = fields.number("generation_wildtype")?;
    let color = fields.number("generation_color")?;

    cell.generation_birth_time = Some(birth_time);
    cell.generation_level = level;
    cell.generation_wildtype = wildtype;
    cell.generation_color = color;
    cell.generation_name = fields.optional_word();
    Ok(())
}

fn parse_birth_line(text: &str, cell: &mut Cell) -> Result<(), RecordError> {
    let mut fields = Fields::new(text, HeaderLine::Birth);
    let birth_frame = fields.number("birth_frame")?;
    let birth_level = fields.number("birth_level")?;
    let wildtype = fields.number("wildtype")?;
    let size = fields.number("size")?;
    let shape = fields.number("shape")?;
    let color = fields.number("color")?;

    cell.birth_frame = birth_frame;
    cell.birth_level = birth_level;
    cell.wildtype = wildtype;
    cell.size = size;
    cell.shape = shape;
    cell.color = color;
    cell.name = fields.optional_word();
    Ok(())
}

fn parse_summary_line(text: &str, cell: &mut Cell) -> Result<(), RecordError> {
    let mut fields = Fields::new(text, HeaderLine::Summary);
    let n_spots = fields.number("n_spots")?;

    cell.n_spots = n_spots;
    cell.comment = fields.rest();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Spot, SpotError};

    fn block(text: &str) -> RecordBlock {
        RecordBlock {
            ordinal: 0,
            line_number: 8,
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    const RECORD: &str = "\
1 0 1 0 1b1
1530 0 0 255
198 12 3 40 2 16711680 Nick
3 ventral side
198 310 245 12
199 312 244 12
201 318 240 13";

    #[test]
    fn test_parse_complete_record() {
        let cell = parse_record(&block(RECORD));

        assert!(cell.valid);
        assert!(cell.diagnostic.is_none());
        assert_eq!(cell.cells_left, DaughterFlag::Present);
        assert_eq!(cell.cells_right, DaughterFlag::Absent);
        assert_eq!(cell.generic_name, "1b1");
        assert_eq!(cell.generation_birth_time, Some(1530));
        assert_eq!(cell.generation_color, 255);
        assert_eq!(cell.generation_name, "");
        assert_eq!(cell.birth_frame, 198);
        assert_eq!(cell.color, 16711680);
        assert_eq!(cell.name, "Nick");
        assert_eq!(cell.n_spots, 3);
        assert_eq!(cell.comment, "ventral side");
        assert_eq!(cell.spots[2], Spot::new(201, 318, 240, 13));
        assert_eq!(cell.last_frame, 201);
    }

    #[test]
    fn test_render_and_reparse_header() {
        let cell = parse_record(&block(RECORD));
        let reparsed = parse_record(&block(&cell.render_record()));
        assert_eq!(reparsed, cell);
    }

    #[test]
    fn test_zero_spots_is_invalid() {
        let cell = parse_record(&block("0 0 0 0 AB\n10 0 0 1 AB\n1 0 0 0 0 0\n0"));

        assert!(!cell.valid);
        assert_eq!(cell.generic_name, "AB");
        let diagnostic = cell.diagnostic.unwrap();
        assert_eq!(diagnostic.errors, vec![RecordError::EmptyTrajectory]);
        assert_eq!(diagnostic.line_number, 8);
    }

    #[test]
    fn test_malformed_header_keeps_earlier_lines() {
        let cell = parse_record(&block("1 1 0 0 P\n77 0 0 1\nx 0 0 0 0 0\n1\n5 1 1 1"));

        assert!(!cell.valid);
        // Flags survive so the tree builder can still use them
        assert_eq!(cell.cells_left, DaughterFlag::Present);
        assert_eq!(cell.cells_right, DaughterFlag::Present);
        assert_eq!(cell.generation_birth_time, Some(77));
        assert!(cell.spots.is_empty());

        let errors = cell.diagnostic.unwrap().errors;
        assert_eq!(
            errors,
            vec![RecordError::MalformedHeader {
                line: HeaderLine::Birth,
                field: "birth_frame",
                token: "x".to_string(),
            }]
        );
    }

    #[test]
    fn test_out_of_range_flag_is_unknown() {
        let cell = parse_record(&block("2 0 0 0 P\n77 0 0 1\n1 0 0 0 0 0\n1\n5 1 1 1"));
        assert!(cell.valid);
        assert_eq!(cell.cells_left, DaughterFlag::Unknown);
        assert_eq!(cell.cells_right, DaughterFlag::Absent);
        assert_eq!(cell.generic_name, "P");
    }

    #[test]
    fn test_malformed_flags_line_keeps_name() {
        let cell = parse_record(&block("0 x 0 0 P2\n77 0 0 1\n1 0 0 0 0 0\n1\n5 1 1 1"));

        assert!(!cell.valid);
        assert_eq!(cell.generic_name, "P2");
        assert_eq!(cell.cells_left, DaughterFlag::default());
        assert_eq!(
            cell.diagnostic.unwrap().errors,
            vec![RecordError::MalformedHeader {
                line: HeaderLine::Flags,
                field: "cells_right",
                token: "x".to_string(),
            }]
        );
    }

    #[test]
    fn test_bad_spot_invalidates_record() {
        let cell = parse_record(&block("0 0 0 0 C\n1 0 0 1\n1 0 0 0 0 0\n2\n5 1 1 1\n0 2 2 2"));

        assert!(!cell.valid);
        assert!(cell.spots.is_empty());
        assert_eq!(cell.last_frame, 0);
        assert_eq!(
            cell.diagnostic.unwrap().errors,
            vec![RecordError::MalformedSpot {
                index: 1,
                source: SpotError::UnsetFrame,
            }]
        );
    }

    #[test]
    fn test_truncated_trajectory_and_missing_lines() {
        let truncated = parse_record(&block("0 0 0 0 C\n1 0 0 1\n1 0 0 0 0 0\n3\n5 1 1 1"));
        assert_eq!(
            truncated.diagnostic.unwrap().errors,
            vec![RecordError::TruncatedTrajectory {
                expected: 3,
                found: 1
            }]
        );

        let short = parse_record(&block("0 0 0 0 C"));
        assert_eq!(
            short.diagnostic.unwrap().errors,
            vec![
                RecordError::MissingLine(HeaderLine::Generation),
                RecordError::MissingLine(HeaderLine::Birth),
                RecordError::MissingLine(HeaderLine::Summary),
            ]
        );
    }
}

//! Spot line parser
//!
//! A trajectory line holds four whitespace-separated integers:
//! `frame x y z`. Extra trailing tokens are ignored.

use crate::types::{Spot, SpotError};

const FIELDS: [&str; 4] = ["frame", "x", "y", "z"];

/// Parse one trajectory line into a spot
pub fn parse_spot(line: &str) -> Result<Spot, SpotError> {
    let tokens: Vec<&str> = line.split_whitespace().take(FIELDS.len()).collect();
    if tokens.len() < FIELDS.len() {
        return Err(SpotError::MissingField(tokens.len()));
    }

    let frame: u32 = parse_field(tokens[0], FIELDS[0])?;
    let x: i32 = parse_field(tokens[1], FIELDS[1])?;
    let y: i32 = parse_field(tokens[2], FIELDS[2])?;
    let z: i32 = parse_field(tokens[3], FIELDS[3])?;

    if frame == 0 {
        return Err(SpotError::UnsetFrame);
    }

    Ok(Spot::new(frame, x, y, z))
}

fn parse_field<T: std::str::FromStr>(token: &str, field: &'static str) -> Result<T, SpotError> {
    token.parse().map_err(|_| SpotError::NotAnInteger {
        field,
        token: token.to_string(),
    })
}

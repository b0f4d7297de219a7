//! Lexical lineage classification
//!
//! Founder lineages are named with a leading quadrant letter (A/B/C/D);
//! upper-case names belong to one sub-lineage family and lower-case names to
//! the other. Both classifiers look at the generic name only.

use serde::{Deserialize, Serialize};
use std::fmt;

const FOUNDERS: [&str; 2] = ["ab", "cd"];

/// Quadrant of a generic name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    /// One of the two founder cells, which precede the quadrant split
    Founder,
    A,
    B,
    C,
    D,
}

impl Quadrant {
    /// Label used in exports; founders have an empty label
    pub fn label(self) -> &'static str {
        match self {
            Quadrant::Founder => "",
            Quadrant::A => "A",
            Quadrant::B => "B",
            Quadrant::C => "C",
            Quadrant::D => "D",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn is_founder(name: &str) -> bool {
    FOUNDERS.iter().any(|founder| name.eq_ignore_ascii_case(founder))
}

/// Classify a generic name into its quadrant
///
/// Any `d` wins over the other letters; otherwise the first of a, b, c found
/// in the name decides. Names without a quadrant letter yield `None`.
pub fn quadrant(name: &str) -> Option<Quadrant> {
    if is_founder(name) {
        return Some(Quadrant::Founder);
    }

    let lower = name.to_ascii_lowercase();
    if lower.contains('d') {
        return Some(Quadrant::D);
    }

    [('a', Quadrant::A), ('b', Quadrant::B), ('c', Quadrant::C)]
        .into_iter()
        .find(|(letter, _)| lower.contains(*letter))
        .map(|(_, quadrant)| quadrant)
}

/// Collapse quartet-mates to a single label
///
/// Every quadrant letter is replaced by `q` in lower-case names and by `Q` in
/// upper-case names. Founders, mixed-case names and names without letters
/// yield an empty string.
pub fn quartet(name: &str) -> String {
    if is_founder(name) {
        return String::new();
    }

    let mut letters = name.chars().filter(|c| c.is_alphabetic()).peekable();
    if letters.peek().is_none() {
        return String::new();
    }

    let (from, placeholder) = if letters.clone().all(char::is_lowercase) {
        (['a', 'b', 'c', 'd'], 'q')
    } else if letters.all(char::is_uppercase) {
        (['A', 'B', 'C', 'D'], 'Q')
    } else {
        return String::new();
    };

    name.chars()
        .map(|c| if from.contains(&c) { placeholder } else { c })
        .collect()
}

//! Lineage Decoder Library
//!
//! Reads the fixed-format text export of a cell-lineage tracking tool and
//! reconstructs the cell-division forest with per-frame 3D positions.
//!
//! # Architecture
//!
//! Data flows strictly downward through one sequential pass:
//! - The record splitter cuts the line stream into per-cell text blocks
//! - The record parser turns each block into a typed [`Cell`]
//! - The tree builder resolves parents from record order and division flags
//! - Descendants, quadrant/quartet labels and dense trajectories are derived
//!   on demand from the finished, read-only [`LineageForest`]
//!
//! The library does NOT:
//! - Validate the biological plausibility of a lineage
//! - Parse growing files incrementally
//! - Write any export format
//!
//! Export and command-line handling live in the application layer (lineage-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use lineage_decoder::{LineageReader, ParserConfig, Settings};
//! use std::path::Path;
//!
//! let settings = Settings::from_file(Path::new("embryo.sbc")).unwrap();
//! let scale = settings.calibration_factor(512.0).unwrap();
//!
//! let reader = LineageReader::new(ParserConfig::new());
//! let forest = reader.read_file(Path::new("embryo.sbd")).unwrap();
//!
//! for (name, id) in forest.valid_cells().iter() {
//!     let track = forest.interpolate(id, 1.0);
//!     println!("{} ({:?}): {} spots, x scale {}", name, forest.quadrant(id), track.len(), scale);
//! }
//!
//! for diagnostic in forest.rejected() {
//!     eprintln!("{}", diagnostic);
//! }
//! ```

// Public modules
pub mod classify;
pub mod config;
pub mod interpolate;
pub mod lineage;
pub mod parser;
pub mod reader;
pub mod settings;
pub mod types;

// Re-export main types for convenience
pub use classify::{quadrant, quartet, Quadrant};
pub use config::ParserConfig;
pub use lineage::{
    CellNode, DescendantIndex, Descendants, ForestStats, LineageForest, LinkKind, LinkState,
    SiblingAmbiguity, TreeBuilder,
};
pub use reader::LineageReader;
pub use settings::Settings;
pub use types::{
    Cell, CellId, DaughterFlag, HeaderLine, LineageError, RecordDiagnostic, RecordError, Result,
    Spot, SpotError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an empty export yields an empty forest
        let reader = LineageReader::default();
        let stats = reader.parse_str("").stats();
        assert_eq!(stats.num_cells, 0);
        assert_eq!(stats.num_roots, 0);
    }
}

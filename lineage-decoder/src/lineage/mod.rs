//! Lineage forest reconstruction and traversal

pub mod builder;
pub mod descendants;
pub mod forest;

// Re-export key types for convenience
pub use builder::{Link, LinkKind, LinkState, SiblingAmbiguity, TreeBuilder};
pub use descendants::{DescendantIndex, Descendants};
pub use forest::{CellNode, ForestStats, LineageForest, NameIndex};

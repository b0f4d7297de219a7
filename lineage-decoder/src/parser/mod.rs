//! Record-level parsing of the lineage export
//!
//! The splitter cuts the line stream into record blocks, the record parser
//! turns each block into a [`Cell`](crate::types::Cell), and the spot parser
//! handles the individual trajectory lines.

pub mod record;
pub mod splitter;
pub mod spot;

// Re-export parser entry points
pub use record::parse_record;
pub use splitter::{RecordBlock, RecordSplitter};
pub use spot::parse_spot;

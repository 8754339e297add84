//! rsdstats: discourse structure counts for RST dependency annotations
//!
//! Reads documents annotated as rhetorical-structure dependency forests
//! and counts two local configurations, partially-independent and
//! fully-embedded structures, per directory of documents.

pub mod bytes; // Tab-separated field helpers
pub mod corpus; // Directory enumeration and summation
pub mod rsd; // Record parsing
pub mod shape; // Pattern templates and matching
pub mod stats; // Per-document traversal and counts
pub mod tree; // Forest construction

// Re-exports for convenience
pub use corpus::{Corpus, CorpusError, DirectorySummary, ErrorPolicy, Options, analyze_file};
pub use rsd::{Record, parse_records, read_records};
pub use shape::{Match, Pattern, Shape};
pub use stats::Statistics;
pub use tree::{Forest, ForestError, Head, Node, NodeId};

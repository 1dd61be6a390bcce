//! Retrieval over the index
//!
//! - `keywords`: free text to substring keywords, shared by the entry points below
//! - `duplicates`: "does something like this already exist?"
//! - `pack`: budgeted context selection for a task
//! - `drift`: public API against the approved snapshot

pub mod keywords;
pub mod duplicates;
pub mod pack;
pub mod drift;

pub use keywords::expand_keywords;
pub use duplicates::{find_duplicates, DuplicateReport, MATCH_LIMIT};
pub use pack::{Pack, PackMode, PackRequest, PackStats, PackedFile, PackedSymbol, Packer};
pub use drift::{check_drift, DriftResult, DriftStatus};

//! # Atlas - Local Code Intelligence Index
//!
//! Atlas scans a source tree and keeps a best-effort symbol/import model of it
//! in SQLite, then answers two questions against that model:
//! - "what looks like a duplicate of X?" (`retriever::find_duplicates`)
//! - "which files matter for task T, within a size budget?" (`retriever::Packer`)
//!
//! Components, leaf-first:
//! - `parser`: line-oriented heuristic extraction for TypeScript/JavaScript and Python
//! - `storage`: the relational schema behind the `IndexStore` interface
//! - `indexer`: hash-gated incremental sync of the store with the filesystem
//! - `retriever`: keyword expansion, duplicate search, context packing, drift check

pub mod symbol;
pub mod parser;
pub mod storage;
pub mod ignore;
pub mod indexer;
pub mod manifest;
pub mod retriever;
pub mod diagnostics;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use symbol::{ImportDef, Language, SymbolDef, SymbolKind};
pub use parser::{parse, ParseResult};
pub use storage::{IndexStore, SqliteStore};
pub use indexer::{IndexReport, Indexer};
pub use retriever::{
    check_drift, find_duplicates, DriftResult, DriftStatus, DuplicateReport, Pack, PackMode,
    PackRequest, Packer,
};
pub use diagnostics::{Diagnostics, MemoryDiagnostics, TracingDiagnostics};
pub use config::{AtlasConfig, ProjectLayout};

/// Result type alias for Atlas operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Atlas operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write {path}: {source}")]
    Artifact {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Ignore rules error: {0}")]
    Ignore(#[from] ::ignore::Error),

    #[error("Unknown symbol kind: {0}")]
    UnknownSymbolKind(String),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Unknown pack mode: {0} (expected bugfix, feature or refactor)")]
    UnknownPackMode(String),
}

/// Status of a file during indexing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    New,
    Modified,
    Unchanged,
}

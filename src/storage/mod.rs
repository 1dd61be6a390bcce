//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - files(id, path UNIQUE, language, hash, last_seen_marker)
//! - symbols(id, file_id, kind, name, signature, start_line, end_line, exported_bool)
//! - imports(id, file_id, imported_path, resolved_file_id)
//! - refs(id, from_symbol_id, to_symbol_id, file_id, kind, line), reserved
//!
//! Child rows cascade-delete with their file. The indexer and retriever only
//! talk to the `IndexStore` / `BatchWriter` traits.

pub mod schema;
pub mod store;
pub mod sqlite;

pub use store::{
    ApiEntry, BatchWriter, DuplicateGroup, FileRecord, ImportRecord, IndexStore, LanguageCount,
    StoreStats, StoredSymbol, SymbolMatch,
};
pub use sqlite::SqliteStore;

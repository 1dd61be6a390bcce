//! Storage interface used by the indexer, retriever and drift checker
//!
//! `IndexStore` is the read side plus an all-or-nothing batch entry point;
//! `BatchWriter` is what a batch sees while it is open. Any embedded relational
//! engine can stand behind these traits; `SqliteStore` is the shipped one.

use crate::Result;
use crate::symbol::{ImportDef, Language, SymbolDef, SymbolKind};
use serde::{Deserialize, Serialize};

/// One row of `files`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub id: i64,
    pub path: String,
    pub language: Language,
    pub hash: String,
    pub last_seen_marker: Option<String>,
}

/// One row of `symbols`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredSymbol {
    pub id: i64,
    pub file_id: i64,
    pub kind: SymbolKind,
    pub name: String,
    pub signature: String,
    pub start_line: u32,
    pub end_line: u32,
    pub exported: bool,
}

/// One row of `imports`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRecord {
    pub id: i64,
    pub file_id: i64,
    pub imported_path: String,
    pub resolved_file_id: Option<i64>,
}

/// A symbol joined with the path of the file that owns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolMatch {
    #[serde(skip)]
    pub file_id: i64,
    pub name: String,
    pub kind: SymbolKind,
    pub path: String,
    pub signature: String,
}

/// Symbols sharing a `(name, kind)` pair across more than one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub name: String,
    pub kind: SymbolKind,
    pub count: usize,
    /// Owning file of every row in the group; a path repeats if the file
    /// holds the pair more than once
    pub files: Vec<String>,
}

/// One entry of the public-API manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEntry {
    pub path: String,
    pub name: String,
    pub signature: String,
}

/// File count for one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCount {
    pub language: String,
    pub count: usize,
}

/// Row counts per table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub files: usize,
    pub symbols: usize,
    pub imports: usize,
    pub refs: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Index Statistics:")?;
        writeln!(f, "  Files: {}", self.files)?;
        writeln!(f, "  Symbols: {}", self.symbols)?;
        writeln!(f, "  Imports: {}", self.imports)?;
        write!(f, "  Refs: {}", self.refs)
    }
}

/// Writes available inside one open batch
pub trait BatchWriter {
    /// Look up a file row by exact path
    fn find_file(&self, path: &str) -> Result<Option<FileRecord>>;

    /// Insert a new file row and return its id
    fn insert_file(&mut self, path: &str, language: Language, hash: &str, marker: &str) -> Result<i64>;

    /// Update fingerprint and marker of an existing file in place
    fn update_file(&mut self, file_id: i64, hash: &str, marker: &str) -> Result<()>;

    /// Delete every symbol and import owned by a file
    fn clear_file_contents(&mut self, file_id: i64) -> Result<()>;

    fn insert_symbol(&mut self, file_id: i64, symbol: &SymbolDef) -> Result<()>;

    fn insert_import(&mut self, file_id: i64, import: &ImportDef) -> Result<()>;

    /// Delete a file row; its symbols, imports and refs go with it
    fn delete_file(&mut self, file_id: i64) -> Result<()>;
}

/// Read access plus batched writes
pub trait IndexStore {
    /// Run `work` inside one transaction. Everything it wrote is committed if
    /// it returns `Ok`, and nothing is if it returns `Err`.
    fn write_batch(&mut self, work: &mut dyn FnMut(&mut dyn BatchWriter) -> Result<()>) -> Result<()>;

    fn find_file(&self, path: &str) -> Result<Option<FileRecord>>;

    /// All file rows in insertion order
    fn list_files(&self) -> Result<Vec<FileRecord>>;

    /// Up to `limit` symbols whose name contains any keyword
    fn symbols_matching(&self, keywords: &[String], limit: usize) -> Result<Vec<SymbolMatch>>;

    /// Up to `limit` files whose path contains any keyword
    fn files_matching(&self, keywords: &[String], limit: usize) -> Result<Vec<FileRecord>>;

    /// Every `(name, kind)` pair that appears in more than one symbol row
    fn duplicate_groups(&self) -> Result<Vec<DuplicateGroup>>;

    fn symbols_in_file(&self, file_id: i64) -> Result<Vec<StoredSymbol>>;

    fn imports_in_file(&self, file_id: i64) -> Result<Vec<ImportRecord>>;

    /// Exported symbols joined with their file path
    fn exported_symbols(&self) -> Result<Vec<ApiEntry>>;

    /// File count grouped by language
    fn language_stats(&self) -> Result<Vec<LanguageCount>>;

    fn stats(&self) -> Result<StoreStats>;
}

//! Context packing
//!
//! A pack is the set of files most likely to matter for a task, cut off at a
//! character budget. Selection is keyword driven:
//! 1. symbols whose name contains a keyword seed their owning file
//! 2. files whose path contains a keyword are added after them
//! 3. candidates are read in discovery order until the next one would not fit

use super::keywords::expand_keywords;
use crate::config::ProjectLayout;
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::manifest;
use crate::storage::{IndexStore, SqliteStore};
use crate::symbol::SymbolKind;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

/// Symbol seeds taken from the store
pub const SYMBOL_SEED_LIMIT: usize = 30;

/// Path seeds taken from the store
pub const PATH_SEED_LIMIT: usize = 20;

pub const PATH_REASON: &str = "matched keyword in file path";

/// What the caller is about to do. Recorded but not used for selection yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackMode {
    Bugfix,
    #[default]
    Feature,
    Refactor,
}

impl PackMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackMode::Bugfix => "bugfix",
            PackMode::Feature => "feature",
            PackMode::Refactor => "refactor",
        }
    }
}

impl FromStr for PackMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bugfix" => Ok(PackMode::Bugfix),
            "feature" => Ok(PackMode::Feature),
            "refactor" => Ok(PackMode::Refactor),
            other => Err(Error::UnknownPackMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for PackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackRequest {
    pub task: String,
    /// Ceiling on the summed character count of included files
    pub budget: usize,
    pub mode: PackMode,
}

impl PackRequest {
    pub fn new(task: impl Into<String>, budget: usize) -> Self {
        Self {
            task: task.into(),
            budget,
            mode: PackMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: PackMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedFile {
    pub path: String,
    pub reason: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub file: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackStats {
    pub total_files: usize,
    pub total_symbols: usize,
    pub total_chars: usize,
    pub budget: usize,
}

/// The pack artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pack {
    pub task: String,
    pub created_at: String,
    pub files: Vec<PackedFile>,
    pub symbols: Vec<PackedSymbol>,
    pub stats: PackStats,
}

/// A file selected by one of the seed queries, not yet read
#[derive(Debug, Clone)]
struct Candidate {
    file_id: i64,
    path: String,
    reason: String,
}

#[derive(Debug, Default)]
struct CandidateSet {
    seen: HashSet<String>,
    ordered: Vec<Candidate>,
}

impl CandidateSet {
    /// The first reason recorded for a path wins
    fn offer(&mut self, file_id: i64, path: &str, reason: impl FnOnce() -> String) {
        if self.seen.insert(path.to_string()) {
            self.ordered.push(Candidate {
                file_id,
                path: path.to_string(),
                reason: reason(),
            });
        }
    }
}

fn symbol_reason(name: &str) -> String {
    format!("matched keyword in symbol: {}", name)
}

pub struct Packer<S: IndexStore = SqliteStore> {
    layout: ProjectLayout,
    store: S,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Packer<SqliteStore> {
    pub fn open(layout: ProjectLayout) -> Result<Self> {
        layout.ensure_data_dir()?;
        let store = SqliteStore::open(&layout.database_path())?;
        Ok(Self::with_store(layout, store))
    }
}

impl<S: IndexStore> Packer<S> {
    pub fn with_store(layout: ProjectLayout, store: S) -> Self {
        Self {
            layout,
            store,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Build the pack for `request` and write it to the configured artifact path
    pub fn pack(&self, request: &PackRequest) -> Result<Pack> {
        let pack = self.build(request)?;
        let output = self.layout.pack_output_path();
        manifest::write_json(&output, &pack)?;
        self.diagnostics.info(&format!(
            "Packed {} files ({} chars) into {}",
            pack.stats.total_files,
            pack.stats.total_chars,
            output.display()
        ));
        Ok(pack)
    }

    /// Build the pack for `request` without writing it anywhere
    pub fn build(&self, request: &PackRequest) -> Result<Pack> {
        let keywords = expand_keywords(&request.task);
        self.diagnostics.debug(&format!(
            "Packing for {:?} ({} mode) with keywords {:?}",
            request.task, request.mode, keywords
        ));

        let mut candidates = CandidateSet::default();

        let seeds = self.store.symbols_matching(&keywords, SYMBOL_SEED_LIMIT)?;
        for seed in &seeds {
            candidates.offer(seed.file_id, &seed.path, || symbol_reason(&seed.name));
        }

        for file in self.store.files_matching(&keywords, PATH_SEED_LIMIT)? {
            candidates.offer(file.id, &file.path, || PATH_REASON.to_string());
        }

        self.expand_dependencies(&candidates.ordered);

        let (files, total_chars) = self.materialize(candidates.ordered, request.budget);

        let symbols: Vec<PackedSymbol> = seeds
            .into_iter()
            .map(|seed| PackedSymbol {
                name: seed.name,
                kind: seed.kind,
                file: seed.path,
                signature: seed.signature,
            })
            .collect();

        Ok(Pack {
            task: request.task.clone(),
            created_at: manifest::timestamp(),
            stats: PackStats {
                total_files: files.len(),
                total_symbols: symbols.len(),
                total_chars,
                budget: request.budget,
            },
            files,
            symbols,
        })
    }

    /// Import paths are never resolved back to files, so this only reports
    /// what a resolver would have to work with. It adds no candidates.
    fn expand_dependencies(&self, candidates: &[Candidate]) {
        for candidate in candidates {
            match self.store.imports_in_file(candidate.file_id) {
                Ok(imports) => {
                    let unresolved = imports.iter().filter(|i| i.resolved_file_id.is_none()).count();
                    if unresolved > 0 {
                        self.diagnostics
                            .debug(&format!("{}: {} unresolved imports", candidate.path, unresolved));
                    }
                }
                Err(err) => self
                    .diagnostics
                    .warn(&format!("Could not load imports of {}: {}", candidate.path, err)),
            }
        }
    }

    /// Read candidates in order until the next one would overflow `budget`.
    /// Unreadable files are skipped; an overflowing file ends the pack.
    fn materialize(&self, candidates: Vec<Candidate>, budget: usize) -> (Vec<PackedFile>, usize) {
        let mut files = Vec::new();
        let mut total_chars = 0;

        for candidate in candidates {
            let full_path = self.layout.root().join(&candidate.path);
            let content = match std::fs::read(&full_path) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(err) => {
                    self.diagnostics.warn(&format!("Skipping {}: {}", candidate.path, err));
                    continue;
                }
            };

            let chars = content.chars().count();
            if total_chars + chars > budget {
                self.diagnostics.debug(&format!(
                    "Budget reached at {} ({} + {} > {})",
                    candidate.path, total_chars, chars, budget
                ));
                break;
            }

            total_chars += chars;
            files.push(PackedFile {
                path: candidate.path,
                reason: candidate.reason,
                content,
            });
        }

        (files, total_chars)
    }
}

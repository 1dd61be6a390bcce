use super::keywords::expand_keywords;
use crate::Result;
use crate::storage::{DuplicateGroup, IndexStore, SymbolMatch};
use serde::Serialize;

/// Cap on keyword matches; the duplicate-group listing is uncapped
pub const MATCH_LIMIT: usize = 20;

/// Result of a duplicate search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DuplicateReport {
    /// Symbols whose name contains one of the intent's keywords
    Matches(Vec<SymbolMatch>),
    /// `(name, kind)` pairs defined more than once
    Groups(Vec<DuplicateGroup>),
}

impl DuplicateReport {
    pub fn len(&self) -> usize {
        match self {
            DuplicateReport::Matches(rows) => rows.len(),
            DuplicateReport::Groups(groups) => groups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Look for existing code that overlaps with `intent`.
///
/// With usable keywords this is a substring search over symbol names;
/// otherwise it lists every `(name, kind)` pair that occurs more than once.
pub fn find_duplicates(store: &dyn IndexStore, intent: &str) -> Result<DuplicateReport> {
    let keywords = expand_keywords(intent);
    if keywords.is_empty() {
        return Ok(DuplicateReport::Groups(store.duplicate_groups()?));
    }
    Ok(DuplicateReport::Matches(store.symbols_matching(&keywords, MATCH_LIMIT)?))
}

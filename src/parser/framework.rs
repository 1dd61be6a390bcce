//! Core parser framework
//!
//! Defines the trait each language parser implements and the registry that
//! dispatches a file to its parser by extension.

use crate::symbol::{ImportDef, Language, SymbolDef};
use std::path::Path;

/// Result of parsing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub symbols: Vec<SymbolDef>,
    pub imports: Vec<ImportDef>,
    pub language: Language,
}

impl ParseResult {
    /// Empty result for files no parser understands
    pub fn unknown() -> Self {
        Self::empty(Language::Unknown)
    }

    pub fn empty(language: Language) -> Self {
        Self {
            symbols: Vec::new(),
            imports: Vec::new(),
            language,
        }
    }
}

/// Trait for language parsers
///
/// Implementations must be total: any input text yields a result.
pub trait LanguageParser: Send + Sync {
    /// Language tag recorded for files this parser handles
    fn language(&self) -> Language;

    /// File extensions (without the dot) this parser handles
    fn file_extensions(&self) -> &[&str];

    /// Check if this parser can handle a file
    fn can_handle(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            self.file_extensions().contains(&ext)
        } else {
            false
        }
    }

    /// Extract symbols and imports from file content
    fn parse(&self, content: &str) -> ParseResult;
}

/// Registry of language parsers
#[derive(Default)]
pub struct ParserRegistry {
    parsers: Vec<Box<dyn LanguageParser>>,
}

impl ParserRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parser
    pub fn register(&mut self, parser: impl LanguageParser + 'static) {
        self.parsers.push(Box::new(parser));
    }

    /// Find a parser for a file
    pub fn find_parser(&self, path: &Path) -> Option<&dyn LanguageParser> {
        self.parsers
            .iter()
            .find(|p| p.can_handle(path))
            .map(|p| p.as_ref())
    }

    /// Parse a file with the matching parser, or return an unknown result
    pub fn parse(&self, path: &Path, content: &str) -> ParseResult {
        match self.find_parser(path) {
            Some(parser) => parser.parse(content),
            None => ParseResult::unknown(),
        }
    }
}

/// Create a default registry with all built-in parsers
pub fn default_registry() -> ParserRegistry {
    let mut registry = ParserRegistry::new();
    registry.register(super::typescript::TypeScriptParser);
    registry.register(super::python::PythonParser);
    registry
}

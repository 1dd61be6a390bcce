//! Symbol model - what the heuristic parsers extract from a file
//!
//! Every parsed file yields:
//! - a `Language` tag chosen from the file extension
//! - zero or more `SymbolDef`s (functions, classes, variables, exports, ...)
//! - zero or more `ImportDef`s (raw, unresolved import paths)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of a discovered symbol.
///
/// `Const`, `Let` and `Var` only appear as the specific half of an
/// `export const|let|var` declaration, which records the declaration
/// keyword verbatim next to its generic `Export` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Class,
    Variable,
    /// Generic marker for anything reachable through an `export` statement
    Export,
    Interface,
    Type,
    Const,
    Let,
    Var,
}

impl SymbolKind {
    /// Get the string representation stored in the `symbols.kind` column
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Class => "class",
            SymbolKind::Variable => "variable",
            SymbolKind::Export => "export",
            SymbolKind::Interface => "interface",
            SymbolKind::Type => "type",
            SymbolKind::Const => "const",
            SymbolKind::Let => "let",
            SymbolKind::Var => "var",
        }
    }

    /// Get all symbol kinds
    pub fn all() -> &'static [SymbolKind] {
        &[
            SymbolKind::Function,
            SymbolKind::Class,
            SymbolKind::Variable,
            SymbolKind::Export,
            SymbolKind::Interface,
            SymbolKind::Type,
            SymbolKind::Const,
            SymbolKind::Let,
            SymbolKind::Var,
        ]
    }
}

impl FromStr for SymbolKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SymbolKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownSymbolKind(s.to_string()))
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Language tag assigned to a file by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// TypeScript and JavaScript family (`.ts`, `.tsx`, `.js`, `.jsx`)
    TypeScript,
    Python,
    Unknown,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Unknown => "unknown",
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "typescript" => Ok(Language::TypeScript),
            "python" => Ok(Language::Python),
            "unknown" => Ok(Language::Unknown),
            other => Err(Error::UnknownLanguage(other.to_string())),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named construct found on a single source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolDef {
    pub kind: SymbolKind,
    /// Symbol name, dotted as `Owner.member` for methods
    pub name: String,
    /// The trimmed source line the symbol was matched on
    pub signature: String,
    /// 1-based line number
    pub start_line: u32,
    /// Always equal to `start_line`; multi-line declarations are not tracked
    pub end_line: u32,
    pub exported: bool,
}

impl SymbolDef {
    /// Create a symbol spanning a single line
    pub fn on_line(
        kind: SymbolKind,
        name: impl Into<String>,
        signature: impl Into<String>,
        line: u32,
        exported: bool,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            signature: signature.into(),
            start_line: line,
            end_line: line,
            exported,
        }
    }
}

/// A raw import reference, never resolved to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDef {
    pub path: String,
}

impl ImportDef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_kind_roundtrip() {
        for kind in SymbolKind::all() {
            let parsed: SymbolKind = kind.as_str().parse().unwrap();
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(SymbolKind::from_str("callable").is_err());
        assert!(SymbolKind::from_str("Function").is_err());
    }

    #[test]
    fn test_language_tags() {
        assert_eq!(Language::TypeScript.as_str(), "typescript");
        assert_eq!("python".parse::<Language>().unwrap(), Language::Python);
        assert!("rust".parse::<Language>().is_err());
    }

    #[test]
    fn test_single_line_symbol() {
        let sym = SymbolDef::on_line(SymbolKind::Class, "Foo", "class Foo {", 7, false);
        assert_eq!(sym.start_line, 7);
        assert_eq!(sym.end_line, 7);
    }
}

//! Heuristic symbol/import extraction
//!
//! This is deliberately not a real parser: each supported language is scanned
//! line by line against an ordered table of regex rules (see `rules`). The
//! only state carried between lines is the name of the enclosing class.
//!
//! Files whose extension no parser claims produce an empty `ParseResult`
//! tagged `Language::Unknown`.

pub mod framework;
pub mod rules;
pub mod typescript;
pub mod python;

pub use framework::{default_registry, LanguageParser, ParseResult, ParserRegistry};

use std::path::Path;
use std::sync::LazyLock;

static REGISTRY: LazyLock<ParserRegistry> = LazyLock::new(default_registry);

/// Parse `content` using the parser selected by the extension of `path`.
///
/// Pure and total: never fails and never touches the filesystem.
pub fn parse(path: &str, content: &str) -> ParseResult {
    REGISTRY.parse(Path::new(path), content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Language;

    #[test]
    fn test_dispatch_by_extension() {
        assert_eq!(parse("a.ts", "").language, Language::TypeScript);
        assert_eq!(parse("a.tsx", "").language, Language::TypeScript);
        assert_eq!(parse("a.js", "").language, Language::TypeScript);
        assert_eq!(parse("a.jsx", "").language, Language::TypeScript);
        assert_eq!(parse("pkg/mod.py", "").language, Language::Python);
    }

    #[test]
    fn test_unknown_extension_is_empty() {
        let result = parse("README.md", "export class Foo {}\ndef bar():\n");
        assert_eq!(result.language, Language::Unknown);
        assert!(result.symbols.is_empty());
        assert!(result.imports.is_empty());

        let result = parse("Makefile", "class Foo:");
        assert_eq!(result.language, Language::Unknown);
    }

    #[test]
    fn test_extension_match_is_case_sensitive() {
        assert_eq!(parse("LEGACY.TS", "export class Foo {}").language, Language::Unknown);
    }
}

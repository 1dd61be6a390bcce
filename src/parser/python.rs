//! Python heuristic parser
//!
//! Python has no export keyword, so every class and def is recorded as
//! exported. The enclosing class ends at the first non-blank line with no
//! indentation that is not itself a `class` line.

use super::framework::{LanguageParser, ParseResult};
use super::rules::{self, Extract, Hit, Line, LineRule, Scan, Subject};
use crate::symbol::{Language, SymbolDef, SymbolKind};
use regex::Captures;
use std::sync::LazyLock;

/// Path recorded for a bare `import x` statement. The imported name itself
/// is not captured.
pub const BARE_IMPORT_PATH: &str = "module";

pub struct PythonParser;

impl LanguageParser for PythonParser {
    fn language(&self) -> Language {
        Language::Python
    }

    fn file_extensions(&self) -> &[&str] {
        &["py"]
    }

    fn parse(&self, content: &str) -> ParseResult {
        rules::scan(content, &RULES, reset_at_top_level).into_result(Language::Python)
    }
}

fn reset_at_top_level(scan: Scan, line: &Line<'_>) -> Scan {
    let indented = line.raw.starts_with(char::is_whitespace);
    if !indented && !line.trimmed.starts_with("class ") {
        scan.leave_class()
    } else {
        scan
    }
}

static RULES: LazyLock<Vec<LineRule>> = LazyLock::new(|| {
    let table: [(&'static str, &str, Extract); 3] = [
        ("import", r"^(?:from\s+([a-zA-Z0-9_.]+)\s+)?import", import),
        ("class", r"class\s+([a-zA-Z0-9_]+)(?:\(.*?\))?\s*:", class),
        ("def", r"(?:async\s+)?def\s+([a-zA-Z0-9_]+)\s*\(", def),
    ];

    table
        .into_iter()
        .map(|(name, pattern, extract)| LineRule::new(name, pattern, Subject::Trimmed, extract))
        .collect()
});

fn import(caps: &Captures<'_>, _line: &Line<'_>, _class: Option<&str>) -> Option<Hit> {
    let path = caps.get(1).map_or(BARE_IMPORT_PATH, |m| m.as_str());
    Some(Hit::import(path))
}

fn class(caps: &Captures<'_>, line: &Line<'_>, _class: Option<&str>) -> Option<Hit> {
    let name = &caps[1];
    Some(
        Hit::symbol(SymbolDef::on_line(SymbolKind::Class, name, line.trimmed, line.number, true))
            .entering_class(name),
    )
}

fn def(caps: &Captures<'_>, line: &Line<'_>, class: Option<&str>) -> Option<Hit> {
    let name = match class {
        Some(owner) => format!("{}.{}", owner, &caps[1]),
        None => caps[1].to_string(),
    };
    Some(Hit::symbol(SymbolDef::on_line(
        SymbolKind::Function,
        name,
        line.trimmed,
        line.number,
        true,
    )))
}

//! TypeScript / JavaScript heuristic parser
//!
//! Rule precedence per line, highest first:
//! import, export declaration, default export, class, in-class method,
//! arrow function, variable, plain function.

use super::framework::{LanguageParser, ParseResult};
use super::rules::{self, Extract, Hit, Line, LineRule, Scan, Subject};
use crate::symbol::{Language, SymbolDef, SymbolKind};
use regex::Captures;
use std::sync::LazyLock;

pub struct TypeScriptParser;

impl LanguageParser for TypeScriptParser {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn file_extensions(&self) -> &[&str] {
        &["ts", "js", "tsx", "jsx"]
    }

    fn parse(&self, content: &str) -> ParseResult {
        rules::scan(content, &RULES, keep_scan).into_result(Language::TypeScript)
    }
}

fn keep_scan(scan: Scan, _line: &Line<'_>) -> Scan {
    scan
}

static RULES: LazyLock<Vec<LineRule>> = LazyLock::new(|| {
    let table: [(&'static str, &str, Extract); 8] = [
        ("import", r#"import\s+.*from\s+['"]([^'"]+)['"]"#, import),
        (
            "export-declaration",
            r"export\s+(?:async\s+)?(const|let|var|function|class|interface|type)\s+([a-zA-Z0-9_]+)",
            export_declaration,
        ),
        (
            "default-export",
            r"export\s+default\s+(?:(?:function|class)\s+)?([a-zA-Z0-9_]+)",
            default_export,
        ),
        ("class", r"class\s+([a-zA-Z0-9_]+)", class),
        (
            "method",
            r"^\s+(?:async\s+)?(?:static\s+)?([a-zA-Z0-9_]+)\s*\(.*\)\s*[:{]",
            method,
        ),
        (
            "arrow-function",
            r"(?:const|let|var)\s+([a-zA-Z0-9_]+)\s*=\s*(?:async\s+)?\(?.*?\)?\s*=>",
            local_function,
        ),
        ("variable", r"(?:const|let|var)\s+([a-zA-Z0-9_]+)\s*=", variable),
        ("function", r"(?:async\s+)?function\s+([a-zA-Z0-9_]+)\s*\(", local_function),
    ];

    table
        .into_iter()
        .map(|(name, pattern, extract)| LineRule::new(name, pattern, Subject::Raw, extract))
        .collect()
});

fn import(caps: &Captures<'_>, _line: &Line<'_>, _class: Option<&str>) -> Option<Hit> {
    Some(Hit::import(&caps[1]))
}

/// `export [async] <keyword> <Name>` yields two symbols on purpose: a generic
/// `export` marker and one whose kind is the declaration keyword. Duplicate
/// search and the public-API manifest both rely on seeing both rows.
fn export_declaration(caps: &Captures<'_>, line: &Line<'_>, _class: Option<&str>) -> Option<Hit> {
    let keyword = &caps[1];
    let name = &caps[2];
    let kind = keyword.parse::<SymbolKind>().ok()?;

    let hit = Hit {
        symbols: vec![
            SymbolDef::on_line(SymbolKind::Export, name, line.trimmed, line.number, true),
            SymbolDef::on_line(kind, name, line.trimmed, line.number, true),
        ],
        ..Hit::default()
    };

    if kind == SymbolKind::Class {
        Some(hit.entering_class(name))
    } else {
        Some(hit)
    }
}

fn default_export(caps: &Captures<'_>, line: &Line<'_>, _class: Option<&str>) -> Option<Hit> {
    Some(Hit::symbol(SymbolDef::on_line(
        SymbolKind::Export,
        &caps[1],
        line.trimmed,
        line.number,
        true,
    )))
}

fn class(caps: &Captures<'_>, line: &Line<'_>, _class: Option<&str>) -> Option<Hit> {
    let name = &caps[1];
    Some(
        Hit::symbol(SymbolDef::on_line(SymbolKind::Class, name, line.trimmed, line.number, false))
            .entering_class(name),
    )
}

fn method(caps: &Captures<'_>, line: &Line<'_>, class: Option<&str>) -> Option<Hit> {
    let owner = class?;
    Some(Hit::symbol(SymbolDef::on_line(
        SymbolKind::Function,
        format!("{}.{}", owner, &caps[1]),
        line.trimmed,
        line.number,
        false,
    )))
}

fn local_function(caps: &Captures<'_>, line: &Line<'_>, _class: Option<&str>) -> Option<Hit> {
    Some(Hit::symbol(SymbolDef::on_line(
        SymbolKind::Function,
        &caps[1],
        line.trimmed,
        line.number,
        false,
    )))
}

fn variable(caps: &Captures<'_>, line: &Line<'_>, _class: Option<&str>) -> Option<Hit> {
    Some(Hit::symbol(SymbolDef::on_line(
        SymbolKind::Variable,
        &caps[1],
        line.trimmed,
        line.number,
        false,
    )))
}

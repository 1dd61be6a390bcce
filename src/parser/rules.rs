//! Ordered line-rule tables
//!
//! A language parser is a list of `LineRule`s tried top to bottom against each
//! non-blank line. The first rule that produces a `Hit` wins and the rest are
//! skipped for that line. The enclosing-class name is the only state carried
//! from one line to the next, threaded through a fold as part of `Scan`.

use crate::parser::ParseResult;
use crate::symbol::{ImportDef, Language, SymbolDef};
use regex::{Captures, Regex};

/// One non-blank source line
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    /// 1-based line number
    pub number: u32,
    pub raw: &'a str,
    pub trimmed: &'a str,
}

/// Which form of the line a rule's pattern is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Raw,
    Trimmed,
}

/// Output of a rule that fired
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Hit {
    pub symbols: Vec<SymbolDef>,
    pub imports: Vec<ImportDef>,
    /// New enclosing-class context, if this line opened a class
    pub enter_class: Option<String>,
}

impl Hit {
    pub fn symbol(symbol: SymbolDef) -> Self {
        Self {
            symbols: vec![symbol],
            ..Self::default()
        }
    }

    pub fn import(path: impl Into<String>) -> Self {
        Self {
            imports: vec![ImportDef::new(path)],
            ..Self::default()
        }
    }

    pub fn entering_class(mut self, name: impl Into<String>) -> Self {
        self.enter_class = Some(name.into());
        self
    }
}

/// Builds a `Hit` from a regex match. `None` means the rule declines the line
/// and the next rule is tried.
pub type Extract = fn(&Captures<'_>, &Line<'_>, Option<&str>) -> Option<Hit>;

pub struct LineRule {
    pub name: &'static str,
    pattern: Regex,
    subject: Subject,
    extract: Extract,
}

impl LineRule {
    /// Patterns are compile-time constants; an invalid one is a programming error.
    pub fn new(name: &'static str, pattern: &str, subject: Subject, extract: Extract) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("line rule pattern must compile"),
            subject,
            extract,
        }
    }

    pub fn apply(&self, line: &Line<'_>, current_class: Option<&str>) -> Option<Hit> {
        let text = match self.subject {
            Subject::Raw => line.raw,
            Subject::Trimmed => line.trimmed,
        };
        let caps = self.pattern.captures(text)?;
        (self.extract)(&caps, line, current_class)
    }
}

/// First rule (in table order) that fires for `line`
pub fn first_hit<'r>(
    rules: &'r [LineRule],
    line: &Line<'_>,
    current_class: Option<&str>,
) -> Option<(&'r LineRule, Hit)> {
    rules
        .iter()
        .find_map(|rule| rule.apply(line, current_class).map(|hit| (rule, hit)))
}

/// Accumulator threaded through the fold over lines
#[derive(Debug, Default)]
pub struct Scan {
    pub current_class: Option<String>,
    pub symbols: Vec<SymbolDef>,
    pub imports: Vec<ImportDef>,
}

impl Scan {
    fn absorb(mut self, hit: Hit) -> Self {
        self.symbols.extend(hit.symbols);
        self.imports.extend(hit.imports);
        if hit.enter_class.is_some() {
            self.current_class = hit.enter_class;
        }
        self
    }

    pub fn leave_class(mut self) -> Self {
        self.current_class = None;
        self
    }

    pub fn into_result(self, language: Language) -> ParseResult {
        ParseResult {
            symbols: self.symbols,
            imports: self.imports,
            language,
        }
    }
}

/// Non-blank lines of `content`, numbered from 1. Blank and
/// whitespace-only lines are dropped before any rule or hook sees them.
pub fn source_lines(content: &str) -> impl Iterator<Item = Line<'_>> {
    content
        .split('\n')
        .enumerate()
        .map(|(index, raw)| Line {
            number: index as u32 + 1,
            raw,
            trimmed: raw.trim(),
        })
        .filter(|line| !line.trimmed.is_empty())
}

/// Fold `rules` over the lines of `content`. `prepare` runs before the rules
/// on every non-blank line and may adjust the scan state.
pub fn scan(content: &str, rules: &[LineRule], prepare: fn(Scan, &Line<'_>) -> Scan) -> Scan {
    source_lines(content).fold(Scan::default(), |scan, line| {
        let scan = prepare(scan, &line);
        match first_hit(rules, &line, scan.current_class.as_deref()) {
            Some((_, hit)) => scan.absorb(hit),
            None => scan,
        }
    })
}

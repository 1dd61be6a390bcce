use crate::retriever::PackedFile;
use crate::storage::{DuplicateGroup, StoreStats, SymbolMatch};
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct MatchRow<'a> {
    #[tabled(rename = "Name")]
    name: &'a str,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "File")]
    path: &'a str,
    #[tabled(rename = "Signature")]
    signature: &'a str,
}

#[derive(Tabled)]
struct GroupRow<'a> {
    #[tabled(rename = "Name")]
    name: &'a str,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Files")]
    files: String,
}

#[derive(Tabled)]
struct PackRow<'a> {
    #[tabled(rename = "File")]
    path: &'a str,
    #[tabled(rename = "Chars")]
    chars: usize,
    #[tabled(rename = "Reason")]
    reason: &'a str,
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn stats_table(stats: &StoreStats) -> String {
    render(vec![
        MetricRow { metric: "Files", value: stats.files.to_string() },
        MetricRow { metric: "Symbols", value: stats.symbols.to_string() },
        MetricRow { metric: "Imports", value: stats.imports.to_string() },
        MetricRow { metric: "Refs", value: stats.refs.to_string() },
    ])
}

pub fn matches_table(matches: &[SymbolMatch]) -> String {
    render(
        matches
            .iter()
            .map(|m| MatchRow {
                name: &m.name,
                kind: m.kind.as_str(),
                path: &m.path,
                signature: &m.signature,
            })
            .collect(),
    )
}

pub fn groups_table(groups: &[DuplicateGroup]) -> String {
    render(
        groups
            .iter()
            .map(|g| GroupRow {
                name: &g.name,
                kind: g.kind.as_str(),
                count: g.count,
                files: g.files.join(", "),
            })
            .collect(),
    )
}

pub fn pack_table(files: &[PackedFile]) -> String {
    render(
        files
            .iter()
            .map(|f| PackRow {
                path: &f.path,
                chars: f.content.chars().count(),
                reason: &f.reason,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolKind;

    #[test]
    fn test_empty_tables_render_nothing() {
        assert!(matches_table(&[]).is_empty());
        assert!(groups_table(&[]).is_empty());
        assert!(pack_table(&[]).is_empty());
    }

    #[test]
    fn test_groups_table_lists_files() {
        let table = groups_table(&[DuplicateGroup {
            name: "helper".to_string(),
            kind: SymbolKind::Function,
            count: 2,
            files: vec!["a.ts".to_string(), "b.ts".to_string()],
        }]);
        assert!(table.contains("helper"));
        assert!(table.contains("function"));
        assert!(table.contains("a.ts, b.ts"));
    }

    #[test]
    fn test_stats_table() {
        let table = stats_table(&StoreStats { files: 3, symbols: 7, imports: 1, refs: 0 });
        assert!(table.contains("Symbols"));
        assert!(table.contains('7'));
    }
}

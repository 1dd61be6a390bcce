//! SQLite storage implementation

use std::path::Path;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Transaction};
use crate::{Result, Error};
use crate::symbol::{ImportDef, Language, SymbolDef, SymbolKind};
use super::schema;
use super::store::{
    ApiEntry, BatchWriter, DuplicateGroup, FileRecord, ImportRecord, IndexStore, LanguageCount,
    StoreStats, StoredSymbol, SymbolMatch,
};

/// Separator used when SQLite concatenates the paths of a duplicate group
const PATH_SEPARATOR: char = '\u{1f}';

/// SQLite-backed index store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates it and its parent directory if needed)
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Names of the tables present in the database
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn count(&self, table: &str) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// An open write batch; dropping it without `commit` rolls everything back
struct SqliteBatch<'conn> {
    tx: Transaction<'conn>,
}

impl BatchWriter for SqliteBatch<'_> {
    fn find_file(&self, path: &str) -> Result<Option<FileRecord>> {
        query_file(&self.tx, path)
    }

    fn insert_file(&mut self, path: &str, language: Language, hash: &str, marker: &str) -> Result<i64> {
        self.tx.execute(
            "INSERT INTO files (path, language, hash, last_seen_marker) VALUES (?1, ?2, ?3, ?4)",
            params![path, language.as_str(), hash, marker],
        )?;
        Ok(self.tx.last_insert_rowid())
    }

    fn update_file(&mut self, file_id: i64, hash: &str, marker: &str) -> Result<()> {
        self.tx.execute(
            "UPDATE files SET hash = ?1, last_seen_marker = ?2 WHERE id = ?3",
            params![hash, marker, file_id],
        )?;
        Ok(())
    }

    fn clear_file_contents(&mut self, file_id: i64) -> Result<()> {
        self.tx.execute("DELETE FROM symbols WHERE file_id = ?1", [file_id])?;
        self.tx.execute("DELETE FROM imports WHERE file_id = ?1", [file_id])?;
        Ok(())
    }

    fn insert_symbol(&mut self, file_id: i64, symbol: &SymbolDef) -> Result<()> {
        let mut stmt = self.tx.prepare_cached(
            r#"
            INSERT INTO symbols (file_id, kind, name, signature, start_line, end_line, exported_bool)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )?;
        stmt.execute(params![
            file_id,
            symbol.kind.as_str(),
            symbol.name,
            symbol.signature,
            symbol.start_line,
            symbol.end_line,
            symbol.exported,
        ])?;
        Ok(())
    }

    fn insert_import(&mut self, file_id: i64, import: &ImportDef) -> Result<()> {
        let mut stmt = self
            .tx
            .prepare_cached("INSERT INTO imports (file_id, imported_path) VALUES (?1, ?2)")?;
        stmt.execute(params![file_id, import.path])?;
        Ok(())
    }

    fn delete_file(&mut self, file_id: i64) -> Result<()> {
        self.tx.execute("DELETE FROM files WHERE id = ?1", [file_id])?;
        Ok(())
    }
}

impl IndexStore for SqliteStore {
    fn write_batch(&mut self, work: &mut dyn FnMut(&mut dyn BatchWriter) -> Result<()>) -> Result<()> {
        let tx = self.conn.transaction()?;
        let mut batch = SqliteBatch { tx };
        work(&mut batch)?;
        batch.tx.commit()?;
        Ok(())
    }

    fn find_file(&self, path: &str) -> Result<Option<FileRecord>> {
        query_file(&self.conn, path)
    }

    fn list_files(&self) -> Result<Vec<FileRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, path, language, hash, last_seen_marker FROM files ORDER BY id",
        )?;
        let files = stmt
            .query_map([], row_to_file)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(files)
    }

    fn symbols_matching(&self, keywords: &[String], limit: usize) -> Result<Vec<SymbolMatch>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            r#"
            SELECT s.file_id, s.name, s.kind, f.path, s.signature
            FROM symbols s
            JOIN files f ON s.file_id = f.id
            WHERE {}
            ORDER BY s.id
            LIMIT ?{}
            "#,
            like_any("s.name", keywords.len()),
            keywords.len() + 1
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let matches = stmt
            .query_map(params_from_iter(like_params(keywords, limit)), |row| {
                Ok(SymbolMatch {
                    file_id: row.get(0)?,
                    name: row.get(1)?,
                    kind: parse_column(row, 2)?,
                    path: row.get(3)?,
                    signature: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(matches)
    }

    fn files_matching(&self, keywords: &[String], limit: usize) -> Result<Vec<FileRecord>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, path, language, hash, last_seen_marker FROM files WHERE {} ORDER BY id LIMIT ?{}",
            like_any("path", keywords.len()),
            keywords.len() + 1
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let files = stmt
            .query_map(params_from_iter(like_params(keywords, limit)), row_to_file)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(files)
    }

    fn duplicate_groups(&self) -> Result<Vec<DuplicateGroup>> {
        let sql = format!(
            r#"
            SELECT s.name, s.kind, COUNT(*) AS count, GROUP_CONCAT(f.path, char({})) AS files
            FROM symbols s
            JOIN files f ON s.file_id = f.id
            GROUP BY s.name, s.kind
            HAVING count > 1
            ORDER BY s.name, s.kind
            "#,
            PATH_SEPARATOR as u32
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let groups = stmt
            .query_map([], |row| {
                let count: i64 = row.get(2)?;
                let files: String = row.get(3)?;
                Ok(DuplicateGroup {
                    name: row.get(0)?,
                    kind: parse_column(row, 1)?,
                    count: count as usize,
                    files: files.split(PATH_SEPARATOR).map(str::to_string).collect(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(groups)
    }

    fn symbols_in_file(&self, file_id: i64) -> Result<Vec<StoredSymbol>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, file_id, kind, name, signature, start_line, end_line, exported_bool
            FROM symbols WHERE file_id = ?1 ORDER BY id
            "#,
        )?;
        let symbols = stmt
            .query_map([file_id], |row| {
                Ok(StoredSymbol {
                    id: row.get(0)?,
                    file_id: row.get(1)?,
                    kind: parse_column(row, 2)?,
                    name: row.get(3)?,
                    signature: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    start_line: row.get(5)?,
                    end_line: row.get(6)?,
                    exported: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(symbols)
    }

    fn imports_in_file(&self, file_id: i64) -> Result<Vec<ImportRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, file_id, imported_path, resolved_file_id FROM imports WHERE file_id = ?1 ORDER BY id",
        )?;
        let imports = stmt
            .query_map([file_id], |row| {
                Ok(ImportRecord {
                    id: row.get(0)?,
                    file_id: row.get(1)?,
                    imported_path: row.get(2)?,
                    resolved_file_id: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(imports)
    }

    fn exported_symbols(&self) -> Result<Vec<ApiEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT f.path, s.name, s.signature
            FROM symbols s
            JOIN files f ON s.file_id = f.id
            WHERE s.exported_bool = 1
            ORDER BY s.id
            "#,
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(ApiEntry {
                    path: row.get(0)?,
                    name: row.get(1)?,
                    signature: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    fn language_stats(&self) -> Result<Vec<LanguageCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT language, COUNT(*) AS count FROM files GROUP BY language ORDER BY language",
        )?;
        let stats = stmt
            .query_map([], |row| {
                let count: i64 = row.get(1)?;
                Ok(LanguageCount {
                    language: row.get(0)?,
                    count: count as usize,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(stats)
    }

    fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            files: self.count("files")?,
            symbols: self.count("symbols")?,
            imports: self.count("imports")?,
            refs: self.count("refs")?,
        })
    }
}

fn query_file(conn: &Connection, path: &str) -> Result<Option<FileRecord>> {
    conn.query_row(
        "SELECT id, path, language, hash, last_seen_marker FROM files WHERE path = ?1",
        [path],
        row_to_file,
    )
    .optional()
    .map_err(Into::into)
}

/// Helper to convert a row to a FileRecord
fn row_to_file(row: &rusqlite::Row) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        id: row.get(0)?,
        path: row.get(1)?,
        language: parse_column(row, 2)?,
        hash: row.get(3)?,
        last_seen_marker: row.get(4)?,
    })
}

/// Read a text column and parse it into one of the crate's enums
fn parse_column<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = Error>,
{
    let text: String = row.get(idx)?;
    text.parse().map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// `col LIKE ?1 ESCAPE '\' OR col LIKE ?2 ESCAPE '\' ...`
fn like_any(column: &str, count: usize) -> String {
    (1..=count)
        .map(|i| format!("{} LIKE ?{} ESCAPE '\\'", column, i))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// One `%keyword%` pattern per keyword, followed by the row limit
fn like_params(keywords: &[String], limit: usize) -> Vec<Value> {
    let mut values: Vec<Value> = keywords
        .iter()
        .map(|k| Value::Text(format!("%{}%", escape_like(k))))
        .collect();
    values.push(Value::Integer(limit as i64));
    values
}

/// Keywords are matched as literal substrings, so LIKE wildcards are escaped
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    /// Insert one file with the given symbols in its own batch
    fn seed(store: &mut SqliteStore, path: &str, symbols: &[SymbolDef]) -> i64 {
        let mut file_id = 0;
        store
            .write_batch(&mut |batch| {
                file_id = batch.insert_file(path, Language::TypeScript, "h1", "HEAD")?;
                for symbol in symbols {
                    batch.insert_symbol(file_id, symbol)?;
                }
                batch.insert_import(file_id, &ImportDef::new("./dep"))?;
                Ok(())
            })
            .unwrap();
        file_id
    }

    fn function(name: &str, line: u32) -> SymbolDef {
        SymbolDef::on_line(SymbolKind::Function, name, format!("function {}() {{", name), line, false)
    }

    #[test]
    fn test_schema_tables() {
        let store = SqliteStore::open_in_memory().unwrap();
        let tables = store.table_names().unwrap();
        for table in schema::TABLES {
            assert!(tables.iter().any(|t| t == table), "missing table {}", table);
        }
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("symbols.sqlite");
        SqliteStore::open(&db_path).unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn test_file_crud() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let id = seed(&mut store, "src/a.ts", &[function("alpha", 1)]);

        let file = store.find_file("src/a.ts").unwrap().unwrap();
        assert_eq!(file.id, id);
        assert_eq!(file.language, Language::TypeScript);
        assert_eq!(file.last_seen_marker.as_deref(), Some("HEAD"));

        store
            .write_batch(&mut |batch| batch.update_file(id, "h2", "rev-2"))
            .unwrap();
        let file = store.find_file("src/a.ts").unwrap().unwrap();
        assert_eq!(file.hash, "h2");
        assert_eq!(file.last_seen_marker.as_deref(), Some("rev-2"));
        assert!(store.find_file("src/missing.ts").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_path_is_rejected() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        seed(&mut store, "a.ts", &[]);
        let result = store.write_batch(&mut |batch| {
            batch.insert_file("a.ts", Language::TypeScript, "other", "HEAD")?;
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(store.stats().unwrap().files, 1);
    }

    #[test]
    fn test_failed_batch_rolls_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let result = store.write_batch(&mut |batch| {
            let id = batch.insert_file("a.ts", Language::TypeScript, "h", "HEAD")?;
            batch.insert_symbol(id, &function("alpha", 1))?;
            Err(Error::UnknownPackMode("boom".to_string()))
        });
        assert!(result.is_err());
        let stats = store.stats().unwrap();
        assert_eq!(stats.files, 0);
        assert_eq!(stats.symbols, 0);
    }

    #[test]
    fn test_clear_and_cascade_delete() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let id = seed(&mut store, "a.ts", &[function("alpha", 1), function("beta", 2)]);
        assert_eq!(store.symbols_in_file(id).unwrap().len(), 2);
        assert_eq!(store.imports_in_file(id).unwrap().len(), 1);

        store.write_batch(&mut |batch| batch.clear_file_contents(id)).unwrap();
        assert!(store.symbols_in_file(id).unwrap().is_empty());
        assert!(store.imports_in_file(id).unwrap().is_empty());
        assert_eq!(store.stats().unwrap().files, 1);

        let id = seed(&mut store, "b.ts", &[function("gamma", 1)]);
        store.write_batch(&mut |batch| batch.delete_file(id)).unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.files, 1);
        assert_eq!(stats.symbols, 0);
        assert_eq!(stats.imports, 0);
    }

    #[test]
    fn test_symbols_matching_any_keyword_with_limit() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        seed(&mut store, "a.ts", &[function("loadUser", 1), function("saveUser", 2), function("render", 3)]);

        let hits = store.symbols_matching(&keywords(&["load", "render"]), 20).unwrap();
        let names: Vec<_> = hits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["loadUser", "render"]);
        assert_eq!(hits[0].path, "a.ts");

        let hits = store.symbols_matching(&keywords(&["user"]), 1).unwrap();
        assert_eq!(hits.len(), 1);

        assert!(store.symbols_matching(&[], 20).unwrap().is_empty());
    }

    #[test]
    fn test_like_wildcards_are_literal() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        seed(&mut store, "a.ts", &[function("snake_case", 1), function("snakeXcase", 2)]);

        let hits = store.symbols_matching(&keywords(&["e_c"]), 20).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "snake_case");
        assert!(store.symbols_matching(&keywords(&["100%"]), 20).unwrap().is_empty());
    }

    #[test]
    fn test_files_matching_path() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        seed(&mut store, "src/auth/login.ts", &[]);
        seed(&mut store, "src/main.ts", &[]);

        let files = store.files_matching(&keywords(&["auth"]), 20).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "src/auth/login.ts");
    }

    #[test]
    fn test_duplicate_groups() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        seed(&mut store, "dup1.ts", &[function("duplicate", 1), function("unique1", 2)]);
        seed(&mut store, "dup2.ts", &[function("duplicate", 1), function("unique2", 2)]);

        let groups = store.duplicate_groups().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "duplicate");
        assert_eq!(groups[0].kind, SymbolKind::Function);
        assert_eq!(groups[0].count, 2);
        let mut files = groups[0].files.clone();
        files.sort();
        assert_eq!(files, vec!["dup1.ts".to_string(), "dup2.ts".to_string()]);
    }

    #[test]
    fn test_exported_symbols_and_language_stats() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        seed(
            &mut store,
            "a.ts",
            &[
                SymbolDef::on_line(SymbolKind::Export, "Foo", "export class Foo {}", 1, true),
                SymbolDef::on_line(SymbolKind::Class, "Foo", "export class Foo {}", 1, true),
                function("helper", 2),
            ],
        );

        let api = store.exported_symbols().unwrap();
        assert_eq!(api.len(), 2);
        assert!(api.iter().all(|e| e.path == "a.ts" && e.name == "Foo"));

        let stats = store.language_stats().unwrap();
        assert_eq!(stats, vec![LanguageCount { language: "typescript".to_string(), count: 1 }]);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("a_b%c\\d"), "a\\_b\\%c\\\\d");
        assert_eq!(like_any("name", 2), "name LIKE ?1 ESCAPE '\\' OR name LIKE ?2 ESCAPE '\\'");
    }
}

//! Database schema definitions

/// SQL to create the files table
pub const CREATE_FILES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path TEXT UNIQUE NOT NULL,
    language TEXT NOT NULL,
    hash TEXT NOT NULL,
    last_seen_marker TEXT
)
"#;

/// SQL to create the symbols table
pub const CREATE_SYMBOLS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS symbols (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id INTEGER NOT NULL,
    kind TEXT NOT NULL,
    name TEXT NOT NULL,
    signature TEXT,
    start_line INTEGER,
    end_line INTEGER,
    exported_bool INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY(file_id) REFERENCES files(id) ON DELETE CASCADE
)
"#;

/// SQL to create the imports table
/// `resolved_file_id` is reserved; nothing populates it yet
pub const CREATE_IMPORTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id INTEGER NOT NULL,
    imported_path TEXT NOT NULL,
    resolved_file_id INTEGER,
    FOREIGN KEY(file_id) REFERENCES files(id) ON DELETE CASCADE
)
"#;

/// SQL to create the refs table
/// Reserved for call/import edges between symbols; never written
pub const CREATE_REFS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS refs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_symbol_id INTEGER,
    to_symbol_id INTEGER,
    file_id INTEGER NOT NULL,
    kind TEXT,
    line INTEGER,
    FOREIGN KEY(file_id) REFERENCES files(id) ON DELETE CASCADE
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_symbols_file ON symbols(file_id)",
    "CREATE INDEX IF NOT EXISTS idx_symbols_name ON symbols(name)",
    "CREATE INDEX IF NOT EXISTS idx_imports_file ON imports(file_id)",
    "CREATE INDEX IF NOT EXISTS idx_refs_file ON refs(file_id)",
];

/// Table names, in creation order
pub const TABLES: &[&str] = &["files", "symbols", "imports", "refs"];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_FILES_TABLE,
        CREATE_SYMBOLS_TABLE,
        CREATE_IMPORTS_TABLE,
        CREATE_REFS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

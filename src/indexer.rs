//! Incremental indexing pipeline
//!
//! An index run walks the project, fingerprints every surviving file and only
//! re-parses files whose fingerprint moved. All writes of one run go through a
//! single store batch; the manifests are regenerated after it commits.

use crate::config::ProjectLayout;
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::ignore::IgnoreFilter;
use crate::manifest;
use crate::parser;
use crate::storage::{BatchWriter, IndexStore, SqliteStore};
use crate::{FileStatus, Result};
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Outcome of one `Indexer::index` run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub new: usize,
    pub modified: usize,
    pub unchanged: usize,
    /// Files that could not be read, plus walk errors such as unreadable
    /// directories
    pub skipped: usize,
    /// Every file that was read, with its classification, in walk order
    pub files: Vec<(String, FileStatus)>,
}

impl IndexReport {
    fn record(&mut self, path: &str, status: FileStatus) {
        match status {
            FileStatus::New => self.new += 1,
            FileStatus::Modified => self.modified += 1,
            FileStatus::Unchanged => self.unchanged += 1,
        }
        self.files.push((path.to_string(), status));
    }

    /// Files that went through the parser
    pub fn parsed(&self) -> usize {
        self.new + self.modified
    }

    /// Every walk entry accounted for: classified files plus skipped entries
    pub fn scanned(&self) -> usize {
        self.files.len() + self.skipped
    }
}

impl std::fmt::Display for IndexReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} new, {} modified, {} unchanged, {} skipped",
            self.new, self.modified, self.unchanged, self.skipped
        )
    }
}

/// A file found by the walk
#[derive(Debug, Clone)]
struct Candidate {
    absolute: PathBuf,
    /// `/`-joined path relative to the project root; the key in `files`
    relative: String,
}

pub struct Indexer<S: IndexStore = SqliteStore> {
    layout: ProjectLayout,
    store: S,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Indexer<SqliteStore> {
    /// Open (or create) the on-disk store for `layout`
    pub fn open(layout: ProjectLayout) -> Result<Self> {
        layout.ensure_data_dir()?;
        let store = SqliteStore::open(&layout.database_path())?;
        Ok(Self::with_store(layout, store))
    }
}

impl<S: IndexStore> Indexer<S> {
    pub fn with_store(layout: ProjectLayout, store: S) -> Self {
        Self {
            layout,
            store,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn ignore_filter(&self) -> Result<IgnoreFilter> {
        let config = self.layout.config();
        IgnoreFilter::new(
            self.layout.root(),
            &config.ignore_file,
            &config.data_dir,
            &config.extra_ignores,
            self.diagnostics.as_ref(),
        )
    }

    /// Bring the store in line with the files currently under the root, then
    /// regenerate the manifests.
    ///
    /// Rows of files that disappeared are left alone; see [`Indexer::prune`].
    pub fn index(&mut self) -> Result<IndexReport> {
        let filter = Arc::new(self.ignore_filter()?);
        let Discovered { candidates, walk_errors } =
            discover_files(self.layout.root(), &filter, self.diagnostics.as_ref());
        self.diagnostics
            .info(&format!("Indexing {} files under {}", candidates.len(), self.layout.root().display()));

        let diagnostics = self.diagnostics.as_ref();
        let marker = self.layout.config().marker.as_str();
        let mut report = IndexReport {
            skipped: walk_errors,
            ..IndexReport::default()
        };

        self.store.write_batch(&mut |batch| {
            for candidate in &candidates {
                let bytes = match std::fs::read(&candidate.absolute) {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        diagnostics.warn(&format!("Skipping {}: {}", candidate.relative, err));
                        report.skipped += 1;
                        continue;
                    }
                };
                let status = sync_file(batch, &candidate.relative, &bytes, marker)?;
                if status != FileStatus::Unchanged {
                    diagnostics.debug(&format!("Parsed {} ({:?})", candidate.relative, status));
                }
                report.record(&candidate.relative, status);
            }
            Ok(())
        })?;

        manifest::write_manifests(&self.store, &self.layout)?;
        self.diagnostics.info(&format!("Indexing complete: {}", report));
        Ok(report)
    }

    /// Delete rows of files that no longer exist on disk or are now ignored.
    /// Returns the removed paths.
    pub fn prune(&mut self) -> Result<Vec<String>> {
        let filter = self.ignore_filter()?;
        let root = self.layout.root().to_path_buf();

        let stale: Vec<_> = self
            .store
            .list_files()?
            .into_iter()
            .filter(|file| !root.join(&file.path).is_file() || filter.is_ignored(Path::new(&file.path), false))
            .collect();

        if stale.is_empty() {
            return Ok(Vec::new());
        }

        self.store.write_batch(&mut |batch| {
            for file in &stale {
                batch.delete_file(file.id)?;
            }
            Ok(())
        })?;

        for file in &stale {
            self.diagnostics.info(&format!("Pruned {}", file.path));
        }
        manifest::write_manifests(&self.store, &self.layout)?;
        Ok(stale.into_iter().map(|file| file.path).collect())
    }
}

/// Hex blake3 digest of the raw bytes
pub fn fingerprint(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

fn sync_file(batch: &mut dyn BatchWriter, path: &str, bytes: &[u8], marker: &str) -> Result<FileStatus> {
    let hash = fingerprint(bytes);
    let existing = batch.find_file(path)?;
    if existing.as_ref().is_some_and(|file| file.hash == hash) {
        return Ok(FileStatus::Unchanged);
    }

    let content = String::from_utf8_lossy(bytes);
    let parsed = parser::parse(path, &content);

    let (file_id, status) = match existing {
        Some(file) => {
            batch.update_file(file.id, &hash, marker)?;
            batch.clear_file_contents(file.id)?;
            (file.id, FileStatus::Modified)
        }
        None => (batch.insert_file(path, parsed.language, &hash, marker)?, FileStatus::New),
    };

    for symbol in &parsed.symbols {
        batch.insert_symbol(file_id, symbol)?;
    }
    for import in &parsed.imports {
        batch.insert_import(file_id, import)?;
    }
    Ok(status)
}

struct Discovered {
    candidates: Vec<Candidate>,
    walk_errors: usize,
}

/// Every non-ignored file under `root`, dot-files included, sorted by path so
/// runs are deterministic. Links are not descended into, but a link whose
/// target is a regular file counts as a file.
fn discover_files(root: &Path, filter: &Arc<IgnoreFilter>, diagnostics: &dyn Diagnostics) -> Discovered {
    let walk_root = root.to_path_buf();
    let entry_filter = Arc::clone(filter);

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| match entry.path().strip_prefix(&walk_root) {
            Ok(relative) if !relative.as_os_str().is_empty() => {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !entry_filter.is_ignored(relative, is_dir)
            }
            _ => true,
        })
        .build();

    let mut candidates = Vec::new();
    let mut walk_errors = 0;
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                diagnostics.warn(&format!("Walk error: {}", err));
                walk_errors += 1;
                continue;
            }
        };
        let is_file = match entry.file_type() {
            Some(t) if t.is_symlink() => std::fs::metadata(entry.path()).is_ok_and(|m| m.is_file()),
            Some(t) => t.is_file(),
            None => false,
        };
        if !is_file {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        candidates.push(Candidate {
            absolute: entry.path().to_path_buf(),
            relative: relative_key(relative),
        });
    }
    Discovered { candidates, walk_errors }
}

fn relative_key(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AtlasConfig;
    use crate::diagnostics::MemoryDiagnostics;
    use crate::symbol::SymbolKind;
    use std::fs;

    fn project() -> (tempfile::TempDir, Indexer<SqliteStore>) {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path(), AtlasConfig::default());
        let indexer = Indexer::with_store(layout, SqliteStore::open_in_memory().unwrap());
        (dir, indexer)
    }

    #[test]
    fn test_fingerprint_is_stable_hex() {
        let a = fingerprint(b"const a = 1;");
        assert_eq!(a, fingerprint(b"const a = 1;"));
        assert_ne!(a, fingerprint(b"const a = 2;"));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_relative_key_uses_forward_slashes() {
        let path: PathBuf = ["src", "lib", "util.ts"].iter().collect();
        assert_eq!(relative_key(&path), "src/lib/util.ts");
    }

    #[test]
    fn test_index_classifies_files() {
        let (dir, mut indexer) = project();
        fs::write(dir.path().join("a.ts"), "export function a() {}\n").unwrap();
        fs::write(dir.path().join("b.py"), "def b():\n    pass\n").unwrap();

        let first = indexer.index().unwrap();
        assert_eq!(first.new, 2);
        assert_eq!(first.parsed(), 2);

        fs::write(dir.path().join("a.ts"), "export function renamed() {}\n").unwrap();
        let second = indexer.index().unwrap();
        assert_eq!(second.modified, 1);
        assert_eq!(second.unchanged, 1);
        assert_eq!(second.new, 0);
        assert_eq!(second.scanned(), 2);
        assert_eq!(
            second.files,
            vec![
                ("a.ts".to_string(), FileStatus::Modified),
                ("b.py".to_string(), FileStatus::Unchanged),
            ]
        );
    }

    #[test]
    fn test_modified_file_rows_are_replaced() {
        let (dir, mut indexer) = project();
        let path = dir.path().join("lib.ts");
        fs::write(&path, "import { x } from './x';\nexport function oldName() {}\n").unwrap();
        indexer.index().unwrap();

        fs::write(&path, "export function newName() {}\n").unwrap();
        indexer.index().unwrap();

        let store = indexer.store();
        let file = store.find_file("lib.ts").unwrap().unwrap();
        let names: Vec<_> = store
            .symbols_in_file(file.id)
            .unwrap()
            .into_iter()
            .map(|s| (s.kind, s.name))
            .collect();
        assert_eq!(
            names,
            vec![
                (SymbolKind::Export, "newName".to_string()),
                (SymbolKind::Function, "newName".to_string()),
            ]
        );
        assert!(store.imports_in_file(file.id).unwrap().is_empty());
    }

    #[test]
    fn test_metadata_and_vcs_dirs_are_not_indexed() {
        let (dir, mut indexer) = project();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git").join("config"), "[core]").unwrap();
        fs::write(dir.path().join(".env"), "KEY=1").unwrap();
        fs::write(dir.path().join("main.ts"), "const x = 1;").unwrap();

        indexer.index().unwrap();
        indexer.index().unwrap();

        let paths: Vec<_> = indexer.store().list_files().unwrap().into_iter().map(|f| f.path).collect();
        assert_eq!(paths, vec![".env".to_string(), "main.ts".to_string()]);
    }

    #[test]
    fn test_prune_removes_missing_and_ignored_files() {
        let (dir, mut indexer) = project();
        fs::write(dir.path().join("keep.ts"), "const keep = 1;").unwrap();
        fs::write(dir.path().join("gone.ts"), "const gone = 1;").unwrap();
        fs::write(dir.path().join("later.ts"), "const later = 1;").unwrap();
        indexer.index().unwrap();

        fs::remove_file(dir.path().join("gone.ts")).unwrap();
        fs::write(dir.path().join(".gitignore"), "later.ts\n").unwrap();

        // index() alone never removes rows
        indexer.index().unwrap();
        assert_eq!(indexer.store().list_files().unwrap().len(), 3);

        let mut removed = indexer.prune().unwrap();
        removed.sort();
        assert_eq!(removed, vec!["gone.ts".to_string(), "later.ts".to_string()]);
        let paths: Vec<_> = indexer.store().list_files().unwrap().into_iter().map(|f| f.path).collect();
        assert_eq!(paths, vec!["keep.ts".to_string()]);
        assert!(indexer.prune().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, indexer) = project();
        let diagnostics = Arc::new(MemoryDiagnostics::new());
        let mut indexer = indexer.with_diagnostics(diagnostics.clone());

        let locked = dir.path().join("locked.ts");
        fs::write(&locked, "const secret = 1;").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        fs::write(dir.path().join("open.ts"), "const open = 1;").unwrap();

        // Privileged users can read regardless of mode bits
        if fs::read(&locked).is_ok() {
            return;
        }

        let report = indexer.index().unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.new, 1);
        assert!(diagnostics.warnings().iter().any(|w| w.contains("locked.ts")));
        assert!(indexer.store().find_file("open.ts").unwrap().is_some());
        assert!(indexer.store().find_file("locked.ts").unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_indexed() {
        let (dir, mut indexer) = project();
        fs::create_dir_all(dir.path().join("shared")).unwrap();
        fs::write(dir.path().join("shared/real.ts"), "export function shared() {}\n").unwrap();
        std::os::unix::fs::symlink("shared/real.ts", dir.path().join("link.ts")).unwrap();
        std::os::unix::fs::symlink("shared", dir.path().join("linked_dir")).unwrap();

        let report = indexer.index().unwrap();
        assert_eq!(report.new, 2);
        let paths: Vec<_> = indexer.store().list_files().unwrap().into_iter().map(|f| f.path).collect();
        assert_eq!(paths, vec!["link.ts".to_string(), "shared/real.ts".to_string()]);
    }

    #[test]
    fn test_bad_ignore_line_is_reported() {
        let (dir, indexer) = project();
        let diagnostics = Arc::new(MemoryDiagnostics::new());
        let mut indexer = indexer.with_diagnostics(diagnostics.clone());
        fs::write(dir.path().join(".gitignore"), "a/**/[z\nskip.ts\n").unwrap();
        fs::write(dir.path().join("skip.ts"), "const a = 1;").unwrap();
        fs::write(dir.path().join("keep.ts"), "const b = 1;").unwrap();

        let report = indexer.index().unwrap();
        assert_eq!(report.new, 1);
        assert!(diagnostics.warnings().iter().any(|w| w.contains(".gitignore")));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_counts_as_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, indexer) = project();
        let diagnostics = Arc::new(MemoryDiagnostics::new());
        let mut indexer = indexer.with_diagnostics(diagnostics.clone());

        let locked = dir.path().join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("a.ts"), "const a = 1;").unwrap();
        fs::write(dir.path().join("open.ts"), "const open = 1;").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let report = indexer.index();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        let report = report.unwrap();

        assert_eq!(report.new, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.scanned(), 2);
        assert!(!diagnostics.warnings().is_empty());
    }
}

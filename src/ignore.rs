use crate::diagnostics::Diagnostics;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Paths excluded regardless of the project's ignore file
const ALWAYS_IGNORED: &[&str] = &["node_modules/", ".git/"];

/// Ignore predicate built from the project's ignore file plus fixed exclusions
/// for the index's own metadata directory, version control, the dependency
/// cache and the ignore file itself.
pub struct IgnoreFilter {
    inner: Gitignore,
}

impl IgnoreFilter {
    /// `ignore_file` and `data_dir` are relative to `root`. Unparseable lines in
    /// the ignore file are reported to `diagnostics` and otherwise dropped.
    pub fn new(
        root: &Path,
        ignore_file: &str,
        data_dir: &str,
        extra: &[String],
        diagnostics: &dyn Diagnostics,
    ) -> crate::Result<Self> {
        let mut builder = GitignoreBuilder::new(root);

        // 1. Project ignore file, if present
        let ignore_path = root.join(ignore_file);
        if ignore_path.is_file() {
            if let Some(err) = builder.add(&ignore_path) {
                diagnostics.warn(&format!("Partially invalid ignore file {}: {}", ignore_path.display(), err));
            }
        }

        // 2. Fixed exclusions
        let data_dir_rule = format!("{}/", data_dir.trim_end_matches('/'));
        for pattern in ALWAYS_IGNORED
            .iter()
            .copied()
            .chain([data_dir_rule.as_str(), ignore_file])
        {
            builder.add_line(None, pattern)?;
        }

        // 3. Configured extras
        for pattern in extra {
            builder.add_line(None, pattern)?;
        }

        Ok(Self {
            inner: builder.build()?,
        })
    }

    /// `path` is relative to the root the filter was built for
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        self.inner
            .matched_path_or_any_parents(path, is_dir)
            .is_ignore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemoryDiagnostics;

    fn filter_with(gitignore: Option<&str>, extra: &[String]) -> (tempfile::TempDir, IgnoreFilter) {
        let dir = tempfile::tempdir().unwrap();
        if let Some(contents) = gitignore {
            std::fs::write(dir.path().join(".gitignore"), contents).unwrap();
        }
        let filter = IgnoreFilter::new(dir.path(), ".gitignore", ".atlas", extra, &MemoryDiagnostics::new()).unwrap();
        (dir, filter)
    }

    #[test]
    fn test_fixed_exclusions() {
        let (_dir, filter) = filter_with(None, &[]);
        assert!(filter.is_ignored(Path::new(".atlas/symbols.sqlite"), false));
        assert!(filter.is_ignored(Path::new(".git/HEAD"), false));
        assert!(filter.is_ignored(Path::new("node_modules/pkg/index.js"), false));
        assert!(filter.is_ignored(Path::new("web/node_modules/pkg/index.js"), false));
        assert!(filter.is_ignored(Path::new(".gitignore"), false));
        assert!(filter.is_ignored(Path::new("src/.gitignore"), false));
        assert!(!filter.is_ignored(Path::new("src/main.ts"), false));
        assert!(!filter.is_ignored(Path::new(".env"), false));
    }

    #[test]
    fn test_project_patterns() {
        let (_dir, filter) = filter_with(Some("ignored.ts\ndist/\n*.log\n!keep.log\n"), &[]);
        assert!(filter.is_ignored(Path::new("ignored.ts"), false));
        assert!(filter.is_ignored(Path::new("dist/bundle.js"), false));
        assert!(filter.is_ignored(Path::new("logs/run.log"), false));
        assert!(!filter.is_ignored(Path::new("keep.log"), false));
        assert!(!filter.is_ignored(Path::new("included.ts"), false));
    }

    #[test]
    fn test_extra_patterns() {
        let (_dir, filter) = filter_with(None, &["*.generated.ts".to_string()]);
        assert!(filter.is_ignored(Path::new("src/api.generated.ts"), false));
        assert!(!filter.is_ignored(Path::new("src/api.ts"), false));
    }

    #[test]
    fn test_invalid_line_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "a/**/[z\ndist/\n").unwrap();
        let diagnostics = MemoryDiagnostics::new();

        let filter = IgnoreFilter::new(dir.path(), ".gitignore", ".atlas", &[], &diagnostics).unwrap();

        let warnings = diagnostics.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains(".gitignore"));
        assert!(filter.is_ignored(Path::new("dist/bundle.js"), false));
    }
}

//! Generated manifests
//!
//! Both files are projections of the store, rewritten wholesale after every
//! index run:
//! - `public_api.json`: `[{path, name, signature}]` for every exported symbol
//! - `repo_manifest.json`: `{generated_at, stats: [{language, count}]}`

use crate::config::ProjectLayout;
use crate::storage::{ApiEntry, IndexStore, LanguageCount};
use crate::{Error, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoManifest {
    /// ISO-8601 UTC timestamp
    pub generated_at: String,
    pub stats: Vec<LanguageCount>,
}

/// Current time as an ISO-8601 UTC timestamp with millisecond precision
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Exported symbols in store order
pub fn public_api(store: &dyn IndexStore) -> Result<Vec<ApiEntry>> {
    store.exported_symbols()
}

pub fn repo_manifest(store: &dyn IndexStore) -> Result<RepoManifest> {
    Ok(RepoManifest {
        generated_at: timestamp(),
        stats: store.language_stats()?,
    })
}

/// Regenerate both manifests in the layout's data directory
pub fn write_manifests(store: &dyn IndexStore, layout: &ProjectLayout) -> Result<()> {
    layout.ensure_data_dir()?;
    write_json(&layout.public_api_path(), &public_api(store)?)?;
    write_json(&layout.repo_manifest_path(), &repo_manifest(store)?)?;
    Ok(())
}

/// Pretty-print `value` as JSON with two-space indentation and write it to `path`
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).map_err(|source| Error::Artifact {
        path: path.to_path_buf(),
        source,
    })
}

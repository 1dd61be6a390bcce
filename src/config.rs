use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the optional project configuration file
pub const CONFIG_FILE: &str = "atlas.toml";

/// File name of the public-API manifest inside the data directory
pub const PUBLIC_API_MANIFEST: &str = "public_api.json";

/// File name of the repository manifest inside the data directory
pub const REPO_MANIFEST: &str = "repo_manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Metadata directory, relative to the project root
    pub data_dir: String,
    /// Database file name inside `data_dir`
    pub database: String,
    /// Ignore-pattern file at the project root
    pub ignore_file: String,
    /// Approved public-API snapshot at the project root
    pub approved_api: String,
    /// Pack artifact path, relative to the project root
    pub pack_output: String,
    /// Character budget used when a caller gives none
    pub default_budget: usize,
    /// Provenance tag recorded on every file written by an index run
    pub marker: String,
    /// Additional ignore globs
    pub extra_ignores: Vec<String>,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            data_dir: ".atlas".to_string(),
            database: "symbols.sqlite".to_string(),
            ignore_file: ".gitignore".to_string(),
            approved_api: "approved_api.json".to_string(),
            pack_output: "pack.json".to_string(),
            default_budget: 50_000,
            marker: "HEAD".to_string(),
            extra_ignores: Vec::new(),
        }
    }
}

/// Load `atlas.toml` from the project root, falling back to defaults when absent
pub fn load_config(root: &Path) -> crate::Result<AtlasConfig> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(AtlasConfig::default());
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: AtlasConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Every on-disk location Atlas reads or writes, resolved against a project root
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
    config: AtlasConfig,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>, config: AtlasConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Layout for `root` using its `atlas.toml`, if any
    pub fn discover(root: impl Into<PathBuf>) -> crate::Result<Self> {
        let root = root.into();
        let config = load_config(&root)?;
        Ok(Self::new(root, config))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(&self.config.data_dir)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join(&self.config.database)
    }

    pub fn public_api_path(&self) -> PathBuf {
        self.data_dir().join(PUBLIC_API_MANIFEST)
    }

    pub fn repo_manifest_path(&self) -> PathBuf {
        self.data_dir().join(REPO_MANIFEST)
    }

    pub fn approved_api_path(&self) -> PathBuf {
        self.root.join(&self.config.approved_api)
    }

    pub fn pack_output_path(&self) -> PathBuf {
        self.root.join(&self.config.pack_output)
    }

    /// Create the metadata directory if it does not exist yet
    pub fn ensure_data_dir(&self) -> crate::Result<()> {
        let dir = self.data_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}

//! Repository configuration, loaded from TOML.
//!
//! ```toml
//! root = "/srv/arbor/docs"
//! branch = "main"
//! keep_file_name = ".keep"
//! compression_level = 3
//! fsync = true
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use arbor_refs::validate_branch_name;
use arbor_store::validate_entry_name;
use serde::{Deserialize, Serialize};

use crate::error::{FsError, FsResult};

/// Config file looked up inside a repository directory.
pub const CONFIG_FILE_NAME: &str = "arbor.toml";

/// Settings for an on-disk [`crate::FileStore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileStoreConfig {
    /// Repository directory holding `HEAD`, `refs/` and `objects/`.
    pub root: PathBuf,
    /// Branch that `HEAD` points at when a repository is initialised.
    pub branch: String,
    /// Name of the empty placeholder file that keeps a created directory
    /// alive in the tree.
    pub keep_file_name: String,
    /// zstd level for loose objects.
    pub compression_level: i32,
    /// Whether object and ref writes are fsynced before being published.
    pub fsync: bool,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            branch: "main".into(),
            keep_file_name: ".keep".into(),
            compression_level: arbor_store::fs::DEFAULT_COMPRESSION_LEVEL,
            fsync: true,
        }
    }
}

impl FileStoreConfig {
    /// Default settings for a repository at `root`.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn from_toml_str(text: &str) -> FsResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| FsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> FsResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| FsError::Config(format!("{}: {e}", path.display())))
    }

    pub fn validate(&self) -> FsResult<()> {
        validate_branch_name(&self.branch)
            .map_err(|e| FsError::Config(format!("branch: {e}")))?;
        validate_entry_name(&self.keep_file_name)
            .map_err(|e| FsError::Config(format!("keep_file_name: {e}")))?;
        if !(1..=22).contains(&self.compression_level) {
            return Err(FsError::Config(format!(
                "compression_level must be between 1 and 22, got {}",
                self.compression_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = FileStoreConfig::default();
        assert_eq!(c.branch, "main");
        assert_eq!(c.keep_file_name, ".keep");
        assert_eq!(c.compression_level, 3);
        assert!(c.fsync);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn missing_keys_take_defaults() {
        let c = FileStoreConfig::from_toml_str("root = \"/tmp/repo\"\nfsync = false\n").unwrap();
        assert_eq!(c.root, PathBuf::from("/tmp/repo"));
        assert!(!c.fsync);
        assert_eq!(c.branch, "main");
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for text in [
            "branch = \"\"",
            "branch = \"a..b\"",
            "keep_file_name = \"a/b\"",
            "compression_level = 0",
            "colour = \"blue\"",
        ] {
            assert!(
                matches!(FileStoreConfig::from_toml_str(text), Err(FsError::Config(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn load_reports_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arbor.toml");
        fs::write(&path, "branch = \"trunk\"\n").unwrap();
        assert_eq!(FileStoreConfig::load(&path).unwrap().branch, "trunk");

        fs::write(&path, "branch = 7\n").unwrap();
        let err = FileStoreConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("arbor.toml"), "{err}");
    }
}

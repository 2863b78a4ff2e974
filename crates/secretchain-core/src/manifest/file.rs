//! Manifest files on disk
//!
//! Supports user-level (`<config_dir>/secretchain/secrets.yaml`) and
//! workspace-level (`.config/secretchain/secrets.yaml`) manifests.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::ManifestResult;

const APP_DIR: &str = "secretchain";
const FILE_NAME: &str = "secrets.yaml";

/// Manifest level (user or workspace)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestLevel {
    /// User-level manifest in the platform config directory
    User,
    /// Workspace-level manifest under `.config/secretchain` in the workspace root
    Workspace,
}

impl ManifestLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManifestLevel::User => "user",
            ManifestLevel::Workspace => "workspace",
        }
    }
}

/// Location of a manifest document
///
/// # Example
///
/// ```no_run
/// use secretchain_core::manifest::ManifestFile;
///
/// // User-level manifest
/// let user = ManifestFile::user();
///
/// // Workspace-level manifest
/// let workspace = ManifestFile::workspace("/path/to/workspace");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    path: PathBuf,
    level: ManifestLevel,
}

impl ManifestFile {
    pub fn new(path: impl Into<PathBuf>, level: ManifestLevel) -> Self {
        Self {
            path: path.into(),
            level,
        }
    }

    /// User-level manifest (`~/.config/secretchain/secrets.yaml` on Linux)
    pub fn user() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join(APP_DIR).join(FILE_NAME), ManifestLevel::User)
    }

    /// Workspace-level manifest (`.config/secretchain/secrets.yaml`)
    pub fn workspace(workspace_root: impl AsRef<Path>) -> Self {
        let path = workspace_root
            .as_ref()
            .join(".config")
            .join(APP_DIR)
            .join(FILE_NAME);
        Self::new(path, ManifestLevel::Workspace)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn level(&self) -> ManifestLevel {
        self.level
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the raw document; a missing file reads as an empty manifest
    pub fn read(&self) -> ManifestResult<Vec<u8>> {
        if !self.path.exists() {
            crate::debug_log!("manifest {} not found, treating as empty", self.path.display());
            return Ok(Vec::new());
        }
        Ok(fs::read(&self.path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let file = ManifestFile::new(dir.path().join("secrets.yaml"), ManifestLevel::User);

        assert!(!file.exists());
        assert!(file.read().unwrap().is_empty());
    }

    #[test]
    fn test_read_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secrets.yaml");
        fs::write(&path, "- name: token\n").unwrap();

        let file = ManifestFile::new(&path, ManifestLevel::User);
        assert!(file.exists());
        assert_eq!(file.read().unwrap(), b"- name: token\n");
    }

    #[test]
    fn test_workspace_path() {
        let dir = tempdir().unwrap();
        let file = ManifestFile::workspace(dir.path());

        assert_eq!(file.level(), ManifestLevel::Workspace);
        assert_eq!(file.level().as_str(), "workspace");
        assert!(file.path().starts_with(dir.path()));
        assert!(file.path().ends_with(".config/secretchain/secrets.yaml"));
    }

    #[test]
    fn test_user_path() {
        let file = ManifestFile::user();
        assert_eq!(file.level(), ManifestLevel::User);
        assert!(file.path().ends_with("secretchain/secrets.yaml"));
    }
}

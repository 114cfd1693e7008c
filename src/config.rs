use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Explicit path configuration for one pipeline run, constructed once by
/// the caller. No process-global state; tests build configs over temp
/// roots.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Raw snapshot source directory.
    pub dev_dir: PathBuf,
    /// Cleansed store + export directory.
    pub prod_dir: PathBuf,
    /// Operational log directory.
    pub log_dir: PathBuf,
    /// Versioned changelog document.
    pub changelog_path: PathBuf,
}

impl PipelineConfig {
    /// Derive the fixed relative layout under a project root (`dev/`,
    /// `prod/`, `logs/`, `changelog.md`), creating the directories.
    pub fn at_root<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let config = Self {
            dev_dir: root.join("dev"),
            prod_dir: root.join("prod"),
            log_dir: root.join("logs"),
            changelog_path: root.join("changelog.md"),
        };
        fs::create_dir_all(&config.dev_dir)?;
        fs::create_dir_all(&config.prod_dir)?;
        fs::create_dir_all(&config.log_dir)?;
        Ok(config)
    }

    pub fn raw_db_path(&self) -> PathBuf {
        self.dev_dir.join("subscribers.db")
    }

    pub fn cleansed_db_path(&self) -> PathBuf {
        self.prod_dir.join("subscribers_cleansed.db")
    }

    pub fn export_csv_path(&self) -> PathBuf {
        self.prod_dir.join("subscribers_cleansed.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_root_creates_the_directory_layout() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::at_root(dir.path()).unwrap();

        assert!(config.dev_dir.is_dir());
        assert!(config.prod_dir.is_dir());
        assert!(config.log_dir.is_dir());
        assert_eq!(config.changelog_path, dir.path().join("changelog.md"));
        assert_eq!(
            config.raw_db_path(),
            dir.path().join("dev").join("subscribers.db")
        );
    }
}

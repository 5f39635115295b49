use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Overrides the database location, e.g. for a shared or test database.
pub const DB_ENV_VAR: &str = "GROCER_DB";

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(DB_ENV_VAR).filter(|p| !p.is_empty()) {
            return Self::from_db_path(PathBuf::from(path));
        }

        let proj_dirs =
            ProjectDirs::from("", "", "grocer").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("grocer.db");

        Ok(Config { db_path, data_dir })
    }

    fn from_db_path(db_path: PathBuf) -> Result<Self> {
        let data_dir = match db_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        Ok(Config { db_path, data_dir })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_db_path_creates_parent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let db_path = tmp.path().join("nested").join("plan.db");
        let config = Config::from_db_path(db_path.clone()).unwrap();
        assert_eq!(config.db_path, db_path);
        assert_eq!(config.data_dir, tmp.path().join("nested"));
        assert!(config.data_dir.is_dir());
    }

    #[test]
    fn test_from_bare_file_name() {
        let config = Config::from_db_path(PathBuf::from("plan.db")).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("."));
    }
}

//! Platform-specific state directory management

use crate::CoreResult;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// File name of the persisted session inside the data directory
pub const SESSION_FILE: &str = "session.json";

/// Manages platform-specific application directories
pub struct StateDir {
    /// Project directories from the directories crate
    project_dirs: Option<ProjectDirs>,
    /// Override directory for testing or custom installations
    override_dir: Option<PathBuf>,
}

impl StateDir {
    /// Create a new StateDir instance
    pub fn new() -> Self {
        let project_dirs = ProjectDirs::from("org", "BioMentor", "biomentor");
        if project_dirs.is_none() {
            warn!("Failed to determine platform-specific directories, will use fallback");
        }
        Self {
            project_dirs,
            override_dir: None,
        }
    }

    /// Create a new StateDir with an override directory
    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        Self {
            project_dirs: None,
            override_dir: Some(path.into()),
        }
    }

    /// Resolve from an explicit directory, then `BIOMENTOR_STATE_DIR`, then the platform default
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        if let Some(dir) = explicit {
            return Self::with_override(dir);
        }
        match std::env::var("BIOMENTOR_STATE_DIR") {
            Ok(dir) if !dir.is_empty() => Self::with_override(dir),
            _ => Self::new(),
        }
    }

    /// Get the configuration directory
    pub fn config_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("config");
        }

        if let Some(project_dirs) = &self.project_dirs {
            project_dirs.config_dir().to_path_buf()
        } else {
            PathBuf::from("./config")
        }
    }

    /// Get the data directory for persistent storage
    pub fn data_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("data");
        }

        if let Some(project_dirs) = &self.project_dirs {
            project_dirs.data_dir().to_path_buf()
        } else {
            PathBuf::from("./data")
        }
    }

    /// Get the directory for log files
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    /// Get the path of the persisted session credentials
    pub fn session_path(&self) -> PathBuf {
        self.data_dir().join(SESSION_FILE)
    }

    /// Get the config path
    pub fn config_path(&self) -> PathBuf {
        self.config_dir().join("config.toml")
    }

    /// Create all required directories
    pub async fn create_directories(&self) -> CoreResult<()> {
        for dir in [self.config_dir(), self.data_dir(), self.log_dir()] {
            tokio::fs::create_dir_all(&dir).await?;
            debug!("Ensured directory exists: {}", dir.display());
        }

        debug!("Using state directories:");
        debug!("  Config: {}", self.config_dir().display());
        debug!("  Data: {}", self.data_dir().display());

        Ok(())
    }
}

impl Default for StateDir {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_override_directory() {
        let temp_dir = TempDir::new().unwrap();
        let state_dir = StateDir::with_override(temp_dir.path());

        assert_eq!(state_dir.config_dir(), temp_dir.path().join("config"));
        assert_eq!(state_dir.data_dir(), temp_dir.path().join("data"));
        assert_eq!(
            state_dir.session_path(),
            temp_dir.path().join("data").join(SESSION_FILE)
        );
    }

    #[test]
    fn test_explicit_directory_wins() {
        let temp_dir = TempDir::new().unwrap();
        let state_dir = StateDir::resolve(Some(temp_dir.path().to_path_buf()));
        assert_eq!(state_dir.config_path(), temp_dir.path().join("config/config.toml"));
    }

    #[tokio::test]
    async fn test_create_directories() {
        let temp_dir = TempDir::new().unwrap();
        let state_dir = StateDir::with_override(temp_dir.path());

        state_dir.create_directories().await.unwrap();

        assert!(state_dir.config_dir().exists());
        assert!(state_dir.data_dir().exists());
        assert!(state_dir.log_dir().exists());
    }
}

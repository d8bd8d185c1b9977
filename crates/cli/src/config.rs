//! CLI configuration utilities

use anyhow::{Context, Result, bail};
use biomentor_core::{ClientConfig, StateDir};
use std::path::{Path, PathBuf};

/// Load the client configuration
///
/// An explicit path must exist; otherwise the state directory's
/// `config.toml` is used when present, then `BIOMENTOR_*` variables.
pub fn load_client_config(state_dir: &StateDir, explicit: Option<&Path>) -> Result<ClientConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(state_dir.config_path()).filter(|path| path.exists()),
    };

    ClientConfig::load(path.as_deref()).with_context(|| match &path {
        Some(path) => format!("loading configuration from {}", path.display()),
        None => "loading configuration from the environment".to_string(),
    })
}

/// Generate a default configuration file
pub fn generate_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, ClientConfig::default().to_toml_string()?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Where `config init` writes when no output path is given
pub fn default_config_path(state_dir: &StateDir, output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| state_dir.config_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generated_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let state_dir = StateDir::with_override(dir.path());
        let path = default_config_path(&state_dir, None);

        generate_default_config(&path, false).unwrap();
        assert!(path.exists());

        let config = load_client_config(&state_dir, None).unwrap();
        assert_eq!(config.mcq_url, ClientConfig::default().mcq_url);
        assert_eq!(config.auth_url, ClientConfig::default().auth_url);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "mcq_url = \"https://mcq.example.org\"\n").unwrap();

        assert!(generate_default_config(&path, false).is_err());
        generate_default_config(&path, true).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("auth_url"));
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let state_dir = StateDir::with_override(dir.path());
        let missing = dir.path().join("missing.toml");

        assert!(load_client_config(&state_dir, Some(&missing)).is_err());
    }

    #[test]
    fn test_explicit_config_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let state_dir = StateDir::with_override(dir.path());
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "mcq_url = \"https://mcq.example.org\"\nauth_url = \"https://auth.example.org\"\ntimeout_secs = 15\n",
        )
        .unwrap();

        let config = load_client_config(&state_dir, Some(&path)).unwrap();
        assert_eq!(config.mcq_url, "https://mcq.example.org");
        assert_eq!(config.timeout_secs, 15);
    }
}

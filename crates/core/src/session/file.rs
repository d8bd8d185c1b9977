//! On-disk credential store
//!
//! The session is kept as one JSON document with three entries, `token`,
//! `refresh_token` and `user`. Nothing enforces token expiry here; the
//! backend is the authority on whether a token is still valid.

use super::{CredentialStore, Credentials, UserIdentity};
use crate::{CoreError, CoreResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<UserIdentity>,
}

impl From<&Credentials> for SessionFile {
    fn from(credentials: &Credentials) -> Self {
        Self {
            token: Some(credentials.access_token().to_string()),
            refresh_token: Some(credentials.refresh_token().to_string()),
            user: credentials.user().cloned(),
        }
    }
}

/// Persists the session in a JSON file readable only by its owner
pub struct FileCredentialStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> CoreResult<Option<Credentials>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let file: SessionFile = match serde_json::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                warn!(
                    "Discarding unreadable session file {}: {e}",
                    self.path.display()
                );
                self.remove().await?;
                return Ok(None);
            }
        };

        match (file.token, file.refresh_token) {
            (Some(access), Some(refresh)) => {
                let mut credentials = Credentials::new(access, refresh);
                if let Some(user) = file.user {
                    credentials = credentials.with_user(user);
                }
                Ok(Some(credentials))
            }
            (None, None) if file.user.is_none() => Ok(None),
            _ => {
                warn!(
                    "Session file {} holds an incomplete session, removing it",
                    self.path.display()
                );
                self.remove().await?;
                Ok(None)
            }
        }
    }

    async fn write(&self, credentials: &Credentials) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(&SessionFile::from(credentials))?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).await?;

        // On Unix, restrict to owner read/write before the file becomes visible
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            fs::set_permissions(&tmp_path, permissions).await?;
        }

        fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            CoreError::storage_error(format!(
                "failed to replace {}: {e}",
                self.path.display()
            ))
        })?;
        debug!("Session written to {}", self.path.display());
        Ok(())
    }

    async fn remove(&self) -> CoreResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> CoreResult<Option<Credentials>> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    async fn save(&self, credentials: &Credentials) -> CoreResult<()> {
        let _guard = self.lock.lock().await;
        self.write(credentials).await
    }

    async fn replace_access_token(&self, access_token: &str) -> CoreResult<bool> {
        let _guard = self.lock.lock().await;
        match self.read().await? {
            Some(current) => {
                self.write(&current.with_access_token(access_token)).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear(&self) -> CoreResult<()> {
        let _guard = self.lock.lock().await;
        self.remove().await?;
        debug!("Session cleared at {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Credentials {
        Credentials::new("access-1", "refresh-1").with_user(UserIdentity {
            user_id: "65f0c2".into(),
            username: "ada".into(),
            email: "ada@example.org".into(),
        })
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().join("data/session.json"));

        assert!(store.load().await.unwrap().is_none());

        store.save(&sample()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(sample()));
    }

    #[tokio::test]
    async fn test_layout_uses_three_entries() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().join("session.json"));
        store.save(&sample()).await.unwrap();

        let raw = fs::read_to_string(store.path()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["token"], "access-1");
        assert_eq!(value["refresh_token"], "refresh-1");
        assert_eq!(value["user"]["username"], "ada");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().join("session.json"));
        store.save(&sample()).await.unwrap();

        let mode = fs::metadata(store.path()).await.unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_replace_access_token() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().join("session.json"));

        assert!(!store.replace_access_token("access-2").await.unwrap());
        assert!(!store.path().exists());

        store.save(&sample()).await.unwrap();
        assert!(store.replace_access_token("access-2").await.unwrap());

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token(), "access-2");
        assert_eq!(loaded.refresh_token(), "refresh-1");
        assert_eq!(loaded.user().unwrap().username, "ada");
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().join("session.json"));
        store.save(&sample()).await.unwrap();

        store.clear().await.unwrap();
        assert!(!store.path().exists());
        assert!(store.load().await.unwrap().is_none());

        // clearing twice is fine
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_dangling_token_is_discarded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        fs::write(&path, r#"{"refresh_token":"orphan"}"#).await.unwrap();

        let store = FileCredentialStore::new(&path);
        assert!(store.load().await.unwrap().is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_garbage_is_discarded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        fs::write(&path, "not json").await.unwrap();

        let store = FileCredentialStore::new(&path);
        assert!(store.load().await.unwrap().is_none());
        assert!(!path.exists());
    }
}

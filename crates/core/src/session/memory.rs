//! Process-local credential store

use super::{CredentialStore, Credentials};
use crate::CoreResult;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Keeps the session in memory for the lifetime of the process
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing session
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            inner: RwLock::new(Some(credentials)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> CoreResult<Option<Credentials>> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, credentials: &Credentials) -> CoreResult<()> {
        *self.inner.write().await = Some(credentials.clone());
        Ok(())
    }

    async fn replace_access_token(&self, access_token: &str) -> CoreResult<bool> {
        let mut guard = self.inner.write().await;
        match guard.take() {
            Some(current) => {
                *guard = Some(current.with_access_token(access_token));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear(&self) -> CoreResult<()> {
        *self.inner.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replace_requires_session() {
        let store = MemoryCredentialStore::new();
        assert!(!store.replace_access_token("fresh").await.unwrap());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_and_clear() {
        let store = MemoryCredentialStore::with_credentials(Credentials::new("old", "refresh"));

        assert!(store.replace_access_token("fresh").await.unwrap());
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token(), "fresh");
        assert_eq!(loaded.refresh_token(), "refresh");

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}

//! Session credentials and the storage capability behind them
//!
//! A session is the access/refresh token pair plus a cached snapshot of the
//! user's identity. Storage is abstracted by [`CredentialStore`] so that the
//! HTTP client receives it at construction instead of reaching for ambient
//! global state.

pub mod events;
pub mod file;
pub mod memory;

use crate::CoreResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use events::{ExpiryReason, SessionEvent, SessionEvents};
pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

/// Denormalized identity cached next to the tokens for display purposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: String,
    pub username: String,
    pub email: String,
}

/// Access and refresh token pair with the cached identity
///
/// Both tokens are required to build a value, so a stored session can never
/// hold one token without the other.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    access_token: String,
    refresh_token: String,
    user: Option<UserIdentity>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            user: None,
        }
    }

    /// Attach the identity snapshot
    pub fn with_user(mut self, user: UserIdentity) -> Self {
        self.user = Some(user);
        self
    }

    /// Same session with a newly issued access token
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = access_token.into();
        self
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Storage for the session credentials
///
/// Implementations must keep the pair invariant: after `clear` nothing is
/// left, and `replace_access_token` never creates a session on its own.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Current session, if one is stored
    async fn load(&self) -> CoreResult<Option<Credentials>>;

    /// Store a complete session, replacing any previous one
    async fn save(&self, credentials: &Credentials) -> CoreResult<()>;

    /// Overwrite the access token of the stored session
    ///
    /// Returns `false` without writing when no session is stored.
    async fn replace_access_token(&self, access_token: &str) -> CoreResult<bool>;

    /// Remove the access token, the refresh token and the identity
    async fn clear(&self) -> CoreResult<()>;
}

// Mock implementation for testing
#[cfg(any(test, feature = "tests"))]
pub mod mock {
    use super::*;
    use mockall::mock;

    mock! {
        pub CredentialStore {}

        #[async_trait]
        impl CredentialStore for CredentialStore {
            async fn load(&self) -> CoreResult<Option<Credentials>>;
            async fn save(&self, credentials: &Credentials) -> CoreResult<()>;
            async fn replace_access_token(&self, access_token: &str) -> CoreResult<bool>;
            async fn clear(&self) -> CoreResult<()>;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_tokens() {
        let credentials = Credentials::new("secret-access", "secret-refresh");
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("secret-access"));
        assert!(!rendered.contains("secret-refresh"));
    }

    #[test]
    fn test_with_access_token_keeps_refresh_and_user() {
        let user = UserIdentity {
            user_id: "u1".into(),
            username: "ada".into(),
            email: "ada@example.org".into(),
        };
        let credentials = Credentials::new("old", "refresh")
            .with_user(user.clone())
            .with_access_token("new");

        assert_eq!(credentials.access_token(), "new");
        assert_eq!(credentials.refresh_token(), "refresh");
        assert_eq!(credentials.user(), Some(&user));
    }
}

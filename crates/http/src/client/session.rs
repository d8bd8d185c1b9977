//! Session lifecycle: login, registration and logout

use super::{ApiClient, ClientError};
use crate::types::{RegisterRequest, RegisterResponse};
use biomentor_core::{Credentials, SessionEvent, UserIdentity};
use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

static FULL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Za-z ]{3,50}$").expect("valid full name pattern"));
static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-zA-Z0-9_]{3,20}$").expect("valid username pattern"));

impl ApiClient {
    /// Log in and persist the token pair with the identity snapshot
    pub async fn login(&self, email: &str, password: &str) -> Result<UserIdentity, ClientError> {
        let response = self.auth.login(email, password).await?;

        let user = UserIdentity {
            user_id: response.user_id,
            username: response.username,
            email: email.to_string(),
        };
        let credentials =
            Credentials::new(response.access_token, response.refresh_token).with_user(user.clone());
        self.store.save(&credentials).await?;

        info!(user_id = %user.user_id, "Logged in");
        self.events.emit(SessionEvent::LoggedIn(user.clone()));
        Ok(user)
    }

    /// Validate locally, then create the account; does not log in
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegisterResponse, ClientError> {
        validate_registration(request)?;
        let response = self.auth.register(request).await?;
        info!(user_id = %response.user_id, "Account registered");
        Ok(response)
    }

    /// Drop the stored session
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.store.clear().await?;
        info!("Logged out");
        self.events.emit(SessionEvent::LoggedOut);
        Ok(())
    }

    /// Cached identity of the logged in user
    pub async fn current_user(&self) -> Result<Option<UserIdentity>, ClientError> {
        Ok(self
            .store
            .load()
            .await?
            .and_then(|credentials| credentials.user().cloned()))
    }

    /// Identity of the logged in user, or an error telling the caller to log in
    pub async fn require_user(&self) -> Result<UserIdentity, ClientError> {
        self.current_user()
            .await?
            .ok_or_else(|| ClientError::AuthenticationFailed("not logged in".into()))
    }

    /// Whether a token pair is stored
    pub async fn is_authenticated(&self) -> Result<bool, ClientError> {
        Ok(self.store.load().await?.is_some())
    }
}

/// Apply the same rules the backend enforces on registration
pub fn validate_registration(request: &RegisterRequest) -> Result<(), ClientError> {
    if !FULL_NAME.is_match(&request.full_name) {
        return Err(ClientError::Validation(
            "full name should contain only letters and spaces (3-50 characters)".into(),
        ));
    }
    if !USERNAME.is_match(&request.username) {
        return Err(ClientError::Validation(
            "username should be 3-20 letters, digits or underscores".into(),
        ));
    }
    let email_ok = request
        .email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !email_ok {
        return Err(ClientError::Validation("email address is not valid".into()));
    }
    if request.password.is_empty() {
        return Err(ClientError::Validation("password must not be empty".into()));
    }
    if request.education_level.trim().is_empty() {
        return Err(ClientError::Validation(
            "please select your education level".into(),
        ));
    }
    Ok(())
}

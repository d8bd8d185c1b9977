//! Client for the login/refresh authority

use super::{ClientError, decode, http_client, normalize_base_url};
use crate::types::{
    LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest,
    RegisterResponse, UserExistsResponse,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Client for public authentication endpoints
///
/// Requests made here never carry a bearer token; the refresh token travels
/// in the request body.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    /// Create a new authentication client
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ClientError> {
        Self::new_with_timeout(base_url, None)
    }

    /// Create a new authentication client with optional timeout
    pub fn new_with_timeout(
        base_url: impl AsRef<str>,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let client = http_client(timeout, super::DEFAULT_USER_AGENT)?;
        Self::with_client(client, base_url.as_ref())
    }

    pub(crate) fn with_client(client: Client, base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a request builder without authentication
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Execute a request and handle common errors
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        decode(response).await
    }

    /// Exchange email and password for a token pair
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let req = self.request(Method::POST, "/login").json(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        });
        self.execute(req).await
    }

    /// Create an account
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegisterResponse, ClientError> {
        let req = self.request(Method::POST, "/register").json(request);
        self.execute(req).await
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError> {
        let req = self
            .request(Method::POST, "/refresh")
            .json(&RefreshRequest { refresh_token });
        self.execute(req).await
    }

    /// Check whether an account exists for an email address
    pub async fn user_exists(&self, email: &str) -> Result<bool, ClientError> {
        let req = self
            .request(Method::GET, "/user_exists_by_email")
            .query(&[("email", email)]);
        let response: UserExistsResponse = self.execute(req).await?;
        Ok(response.exists)
    }
}

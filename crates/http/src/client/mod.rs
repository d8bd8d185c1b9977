//! BioMentor HTTP clients
//!
//! [`AuthClient`] talks to the login/refresh authority and never carries a
//! bearer token. [`ApiClient`] talks to the quiz resource API and runs every
//! call through two stages:
//!
//! - outbound: the current access token from the [`CredentialStore`] is set
//!   as `Authorization: Bearer <token>`;
//! - inbound: a `401 Unauthorized` triggers one refresh exchange followed by
//!   one retry of the original request with the new token. The retry is not
//!   recovered again. When no refresh token is stored or the exchange fails,
//!   the credentials are cleared and [`SessionEvent::Expired`] is published.

pub mod auth;
pub mod dashboard;
pub mod error;
pub mod explanation;
pub mod quiz;
pub mod refresh;
pub mod session;
pub mod topic;

pub use auth::AuthClient;

use biomentor_core::{
    ClientConfig, CredentialStore, MemoryCredentialStore, SessionEvent, SessionEvents,
};
use error::ClientError;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, broadcast};
use tracing::debug;
use url::Url;

use crate::types::ApiErrorBody;

const DEFAULT_USER_AGENT: &str = concat!("biomentor-client/", env!("CARGO_PKG_VERSION"));

/// Authenticated client for the quiz resource API
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: AuthClient,
    store: Arc<dyn CredentialStore>,
    events: SessionEvents,
    // held for the whole refresh cycle so concurrent 401s share one exchange
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client for the login/refresh authority
    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// The injected credential store
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Receive session lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Create a request builder against the base URL
    ///
    /// The bearer header is attached when the request is sent, so a builder
    /// created before a refresh still goes out with the current token.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Send a request through the outbound and inbound stages
    ///
    /// Only transport failures and terminal session failures are errors here;
    /// any other status is returned as a [`Response`].
    ///
    /// Recovery needs to replay the request. A request whose body cannot be
    /// cloned (a stream) skips it: a 401 comes back as a plain response, the
    /// stored credentials are left alone and no session event is published.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let mut request = request.build()?;
        let sent_token = self.attach_bearer(&mut request).await?;
        let retry = request.try_clone();

        debug!(method = %request.method(), url = %request.url(), "Sending request");
        let response = self.client.execute(request).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(mut retry) = retry else {
            debug!("Request body cannot be replayed, not attempting refresh");
            return Ok(response);
        };

        debug!("Access token rejected, attempting refresh");
        let fresh_token = self.recover(sent_token.as_deref()).await?;
        retry
            .headers_mut()
            .insert(AUTHORIZATION, bearer_value(&fresh_token)?);

        debug!(method = %retry.method(), url = %retry.url(), "Retrying request with refreshed token");
        Ok(self.client.execute(retry).await?)
    }

    /// Execute a request and decode a successful JSON response
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        decode(response).await
    }

    /// Outbound stage: set the bearer header when a session is stored
    async fn attach_bearer(
        &self,
        request: &mut reqwest::Request,
    ) -> Result<Option<String>, ClientError> {
        let token = self
            .store
            .load()
            .await?
            .map(|credentials| credentials.access_token().to_string())
            .filter(|token| !token.is_empty());

        if let Some(token) = &token {
            request
                .headers_mut()
                .insert(AUTHORIZATION, bearer_value(token)?);
        }
        Ok(token)
    }
}

/// Builder for ApiClient
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    auth_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    store: Option<Arc<dyn CredentialStore>>,
    events: Option<SessionEvents>,
}

impl ApiClientBuilder {
    /// Start from a loaded configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut builder = Self::default()
            .base_url(&config.mcq_url)
            .auth_url(&config.auth_url)
            .user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        builder
    }

    /// Set the resource API base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the login/refresh authority base URL
    pub fn auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the credential store (defaults to an in-memory store)
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Share an existing event channel
    pub fn events(mut self, events: SessionEvents) -> Self {
        self.events = Some(events);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;
        let auth_url = self
            .auth_url
            .ok_or_else(|| ClientError::Configuration("auth_url is required".into()))?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let client = http_client(self.timeout, &user_agent)?;

        Ok(ApiClient {
            auth: AuthClient::with_client(client.clone(), &auth_url)?,
            base_url: normalize_base_url(&base_url)?,
            client,
            store: self
                .store
                .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new())),
            events: self.events.unwrap_or_default(),
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }
}

fn http_client(timeout: Option<Duration>, user_agent: &str) -> Result<Client, ClientError> {
    let mut builder = ClientBuilder::new().user_agent(user_agent);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Validate once and strip the trailing slash; paths are appended verbatim
fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let url = Url::parse(raw)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::Configuration(format!(
            "unsupported scheme in base URL: {raw}"
        )));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn bearer_value(token: &str) -> Result<HeaderValue, ClientError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| ClientError::Validation("access token is not a valid header value".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Percent-encode a caller supplied path segment
pub(crate) fn segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Decode a successful response, or turn an error status into a [`ClientError`]
///
/// A success body that is not the expected JSON is a [`ClientError::Serialization`].
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    } else {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|error| error.message())
            .unwrap_or_else(|_| {
                if body.is_empty() {
                    status.to_string()
                } else {
                    body
                }
            });
        Err(ClientError::from_status(status, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("abc123"), "abc123");
        assert_eq!(segment("Unit 1: Cells"), "Unit%201%3A%20Cells");
        assert_eq!(segment("a/b"), "a%2Fb");
        assert_eq!(segment("a+b"), "a%2Bb");
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://localhost:8000/").unwrap(),
            "http://localhost:8000"
        );
        assert_eq!(
            normalize_base_url("https://api.example.org/mcq/").unwrap(),
            "https://api.example.org/mcq"
        );
        assert!(normalize_base_url("localhost:8000").is_err());
    }

    #[test]
    fn test_builder_requires_urls() {
        assert!(matches!(
            ApiClient::builder().auth_url("http://localhost:8001").build(),
            Err(ClientError::Configuration(_))
        ));
        assert!(matches!(
            ApiClient::builder().base_url("http://localhost:8000").build(),
            Err(ClientError::Configuration(_))
        ));
    }

    #[test]
    fn test_bearer_value_is_sensitive() {
        let value = bearer_value("abc").unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer abc");
        assert!(value.is_sensitive());
    }

    #[test]
    fn test_bearer_value_rejects_newlines() {
        assert!(matches!(
            bearer_value("abc\ndef"),
            Err(ClientError::Validation(_))
        ));
    }
}

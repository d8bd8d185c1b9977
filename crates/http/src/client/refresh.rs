//! Inbound stage: recovery from an expired access token

use super::{ApiClient, ClientError};
use biomentor_core::{ExpiryReason, SessionEvent};
use tracing::{debug, error, info, warn};

impl ApiClient {
    /// Obtain a usable access token after `rejected` was answered with 401
    ///
    /// Runs at most one refresh exchange at a time. A caller that waited for
    /// another cycle reuses its token instead of exchanging again, and finds
    /// an empty store if that cycle ended the session.
    pub(super) async fn recover(&self, rejected: Option<&str>) -> Result<String, ClientError> {
        let _in_flight = self.refresh_lock.lock().await;

        let refresh_token = match self.store.load().await? {
            Some(current)
                if !current.access_token().is_empty()
                    && Some(current.access_token()) != rejected =>
            {
                debug!("Access token was already refreshed, reusing it");
                return Ok(current.access_token().to_string());
            }
            Some(current) if !current.refresh_token().is_empty() => {
                current.refresh_token().to_string()
            }
            _ => return Err(self.expire(ExpiryReason::MissingRefreshToken).await),
        };

        let refreshed = match self.auth.refresh(&refresh_token).await {
            Ok(response) if !response.access_token.is_empty() => response,
            Ok(_) => {
                warn!("Refresh response carried no access token");
                return Err(self
                    .expire(ExpiryReason::RefreshFailed("empty access token".into()))
                    .await);
            }
            Err(e) => {
                warn!("Token refresh failed: {e}");
                return Err(self.expire(ExpiryReason::RefreshFailed(e.to_string())).await);
            }
        };

        if !self
            .store
            .replace_access_token(&refreshed.access_token)
            .await?
        {
            debug!("Session was cleared while refreshing, dropping new token");
            return Err(ClientError::SessionExpired(ExpiryReason::SessionEnded));
        }

        info!("Access token refreshed");
        self.events.emit(SessionEvent::Refreshed);
        Ok(refreshed.access_token)
    }

    /// Terminal failure: drop every credential entry and notify the shell
    async fn expire(&self, reason: ExpiryReason) -> ClientError {
        if let Err(e) = self.store.clear().await {
            error!("Failed to clear credentials after session expiry: {e}");
        }
        warn!("Session expired: {reason}");
        self.events.emit(SessionEvent::Expired(reason.clone()));
        ClientError::SessionExpired(reason)
    }
}

//! Session lifecycle notifications
//!
//! The HTTP client never navigates anywhere itself. When a session ends it
//! publishes a [`SessionEvent`] and the application shell decides what to do.

use super::UserIdentity;
use std::fmt;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 16;

/// Why a session was terminated by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpiryReason {
    /// A request was rejected and no refresh token was stored
    MissingRefreshToken,
    /// The refresh exchange failed
    RefreshFailed(String),
    /// The session was cleared while a refresh was in flight
    SessionEnded,
}

impl fmt::Display for ExpiryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRefreshToken => write!(f, "no refresh token available"),
            Self::RefreshFailed(reason) => write!(f, "token refresh failed: {reason}"),
            Self::SessionEnded => write!(f, "session ended during token refresh"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn(UserIdentity),
    Refreshed,
    LoggedOut,
    /// Credentials were cleared; the user has to authenticate again
    Expired(ExpiryReason),
}

/// Broadcast channel for [`SessionEvent`]s
#[derive(Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish an event; having no subscribers is not an error
    pub fn emit(&self, event: SessionEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("No session event subscribers");
        }
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let events = SessionEvents::new();
        let mut first = events.subscribe();
        let mut second = events.subscribe();

        events.emit(SessionEvent::Expired(ExpiryReason::MissingRefreshToken));

        assert_eq!(
            first.recv().await.unwrap(),
            SessionEvent::Expired(ExpiryReason::MissingRefreshToken)
        );
        assert_eq!(
            second.recv().await.unwrap(),
            SessionEvent::Expired(ExpiryReason::MissingRefreshToken)
        );
    }

    #[test]
    fn test_emit_without_subscribers() {
        SessionEvents::new().emit(SessionEvent::LoggedOut);
    }
}

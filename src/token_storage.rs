use crate::models::{CurrentUser, SessionToken};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Holder of the bearer token and the cached user.
///
/// Only two components write to it: the session-expiry interceptor (clearing)
/// and `AuthSession` (login, signup, logout). The bearer interceptor reads it.
pub trait TokenStore: Send + Sync {
    fn get_token(&self) -> Option<SessionToken>;

    fn set_token(&self, token: SessionToken);

    fn get_user(&self) -> Option<CurrentUser>;

    fn set_user(&self, user: CurrentUser);

    /// Removes both the token and the user
    fn clear_all(&self);
}

#[derive(Debug, Default)]
struct StoredSession {
    token: Option<SessionToken>,
    user: Option<CurrentUser>,
}

/// Session-scoped store kept in process memory.
///
/// Nothing is written to disk, so the token lives exactly as long as the
/// running session. Long-lived "remember me" credentials are a server-side
/// cookie and never pass through here.
#[derive(Debug, Default)]
pub struct SessionTokenStore {
    inner: Mutex<StoredSession>,
}

impl SessionTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoredSession> {
        // Plain values only, a panic mid-write cannot leave them half-updated
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for SessionTokenStore {
    fn get_token(&self) -> Option<SessionToken> {
        self.lock().token.clone()
    }

    fn set_token(&self, token: SessionToken) {
        self.lock().token = Some(token);
        tracing::debug!("Session token stored");
    }

    fn get_user(&self) -> Option<CurrentUser> {
        self.lock().user.clone()
    }

    fn set_user(&self, user: CurrentUser) {
        tracing::debug!("Cached user updated: {}", user.id);
        self.lock().user = Some(user);
    }

    fn clear_all(&self) {
        let mut session = self.lock();
        session.token = None;
        session.user = None;
        tracing::debug!("Session token and cached user cleared");
    }
}

use crate::api_client::{ApiClient, HttpTransport, ReqwestTransport};
use crate::config::OAuthConfig;
use crate::events::{SessionEvent, SessionEvents};
use crate::models::CurrentUser;
use crate::token_storage::TokenStore;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// Single source of truth for the logged-in user.
///
/// The token store is shared with the interceptors; the in-memory user is
/// not, so expiry notifications have to be applied here explicitly.
pub struct AuthSession<T = ReqwestTransport> {
    pub(in crate::auth) client: Arc<ApiClient<T>>,
    pub(in crate::auth) store: Arc<dyn TokenStore>,
    pub(in crate::auth) oauth: OAuthConfig,
    pub(in crate::auth) auth_in_flight: AtomicBool,
    events: SessionEvents,
    user: RwLock<Option<CurrentUser>>,
    expiry_rx: Mutex<broadcast::Receiver<SessionEvent>>,
}

impl<T: HttpTransport> AuthSession<T> {
    /// Creates the session and subscribes to expiry notifications for its
    /// whole lifetime. Starts unauthenticated; call `initialize` to pick up
    /// a cached session.
    pub fn new(
        client: Arc<ApiClient<T>>,
        store: Arc<dyn TokenStore>,
        events: SessionEvents,
        oauth: OAuthConfig,
    ) -> Self {
        let expiry_rx = Mutex::new(events.subscribe());
        AuthSession {
            client,
            store,
            oauth,
            auth_in_flight: AtomicBool::new(false),
            events,
            user: RwLock::new(None),
            expiry_rx,
        }
    }

    /// The current user after applying any pending expiry notification
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.sync_expiry();
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// Drains pending notifications. Returns true if any expiry was seen.
    pub fn sync_expiry(&self) -> bool {
        let mut expired = false;
        {
            let mut rx = self.expiry_rx.lock().unwrap_or_else(PoisonError::into_inner);
            loop {
                match rx.try_recv() {
                    Ok(SessionEvent::Expired) => expired = true,
                    // Only expiries travel on this channel
                    Err(TryRecvError::Lagged(_)) => expired = true,
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }
        }

        if expired {
            self.handle_expiry();
        }
        expired
    }

    /// Applies expiries as they arrive, for hosts that stay up. Returns when
    /// the event channel closes.
    ///
    /// Its own receiver only wakes the loop; events are applied through the
    /// session's receiver, so expiries that login or `initialize` already
    /// discarded as stale are not replayed here.
    pub async fn watch_expiry(&self) {
        let mut wake = self.events.subscribe();
        loop {
            match wake.recv().await {
                Ok(SessionEvent::Expired) | Err(RecvError::Lagged(_)) => {
                    self.sync_expiry();
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    fn handle_expiry(&self) {
        // The interceptor cleared the store before notifying
        if self.user_snapshot().is_some() {
            tracing::info!("Session expired, signing out");
        }
        self.set_user(None);
    }

    pub(in crate::auth) fn user_snapshot(&self) -> Option<CurrentUser> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(in crate::auth) fn set_user(&self, user: Option<CurrentUser>) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = user;
    }

    pub fn client(&self) -> &Arc<ApiClient<T>> {
        &self.client
    }
}

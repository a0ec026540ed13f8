use crate::api_client::{ApiRequest, ApiResponse};
use crate::events::{SessionEvent, SessionEvents};
use crate::token_storage::TokenStore;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use std::sync::Arc;

pub const DEFAULT_API_PREFIX: &str = "/api/";

/// Runs synchronously on every outgoing request before it is dispatched
pub trait RequestInterceptor: Send + Sync {
    fn on_request(&self, request: &mut ApiRequest);
}

/// Runs on every response the transport hands back, success or not
pub trait ResponseInterceptor: Send + Sync {
    fn on_response(&self, request: &ApiRequest, response: &ApiResponse);
}

/// Whether `path` belongs to the backend's API namespace (as opposed to
/// OAuth redirect endpoints such as `/oauth2/authorization/keycloak`).
pub fn is_api_path(path: &str, api_prefix: &str) -> bool {
    path.starts_with(api_prefix)
}

/// Attaches the stored bearer token to API-prefixed requests.
pub struct BearerTokenInterceptor {
    store: Arc<dyn TokenStore>,
    api_prefix: String,
}

impl BearerTokenInterceptor {
    pub fn new(store: Arc<dyn TokenStore>, api_prefix: impl Into<String>) -> Self {
        Self {
            store,
            api_prefix: api_prefix.into(),
        }
    }
}

impl RequestInterceptor for BearerTokenInterceptor {
    fn on_request(&self, request: &mut ApiRequest) {
        if !is_api_path(&request.path, &self.api_prefix) {
            return;
        }

        let Some(token) = self.store.get_token() else {
            return;
        };

        match HeaderValue::from_str(&token.bearer()) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers.insert(AUTHORIZATION, value);
            }
            Err(e) => {
                tracing::warn!(
                    "Stored token is not a valid header value, sending {} unauthenticated: {}",
                    request.path,
                    e
                );
            }
        }
    }
}

/// Turns a 401 on an API path into a cleared store plus `SessionEvent::Expired`.
///
/// The store is cleared before the event goes out, so a subscriber that
/// reads the store when handling the event always finds it empty. The
/// interceptor never navigates anywhere; reacting is up to subscribers.
pub struct SessionExpiryInterceptor {
    store: Arc<dyn TokenStore>,
    events: SessionEvents,
    api_prefix: String,
}

impl SessionExpiryInterceptor {
    pub fn new(
        store: Arc<dyn TokenStore>,
        events: SessionEvents,
        api_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            events,
            api_prefix: api_prefix.into(),
        }
    }
}

impl ResponseInterceptor for SessionExpiryInterceptor {
    fn on_response(&self, request: &ApiRequest, response: &ApiResponse) {
        if response.status != StatusCode::UNAUTHORIZED {
            return;
        }

        if !is_api_path(&request.path, &self.api_prefix) {
            tracing::debug!(
                "401 from non-API path {}, session left untouched",
                request.path
            );
            return;
        }

        tracing::info!(
            "Token expired or invalid ({} {}), clearing session",
            request.method,
            request.path
        );
        self.store.clear_all();
        self.events.emit(SessionEvent::Expired);
    }
}

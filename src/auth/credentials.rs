use super::{LOGIN_PATH, SIGNUP_PATH};
use crate::api_client::HttpTransport;
use crate::errors::{ApiError, AuthError};
use crate::models::{AuthResponse, CurrentUser, LoginRequest, SignupRequest};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

pub const DEFAULT_LOGIN_ERROR: &str = "Login failed. Please try again.";
pub const DEFAULT_SIGNUP_ERROR: &str = "Signup failed. Please try again.";

/// Result of a login or signup attempt that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(CurrentUser),
    /// Another attempt was pending; this call made no request
    AlreadyInProgress,
}

impl LoginOutcome {
    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            LoginOutcome::Authenticated(user) => Some(user),
            LoginOutcome::AlreadyInProgress => None,
        }
    }
}

/// Holds the in-flight flag for one attempt and releases it on drop
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl<T: HttpTransport> super::AuthSession<T> {
    /// Email/password login against the custom auth endpoint
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<LoginOutcome, AuthError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            remember_me,
        };
        self.authenticate(LOGIN_PATH, &request, DEFAULT_LOGIN_ERROR)
            .await
    }

    /// Registers a new account. The form is validated locally first and an
    /// invalid form never reaches the backend.
    pub async fn signup(&self, request: &SignupRequest) -> Result<LoginOutcome, AuthError> {
        request.validate()?;
        self.authenticate(SIGNUP_PATH, request, DEFAULT_SIGNUP_ERROR)
            .await
    }

    async fn authenticate<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<LoginOutcome, AuthError> {
        let Some(_guard) = InFlightGuard::acquire(&self.auth_in_flight) else {
            tracing::debug!("Authentication already in progress, ignoring {}", path);
            return Ok(LoginOutcome::AlreadyInProgress);
        };

        let response: AuthResponse = match self.client.post_json(path, body).await {
            Ok(response) => response,
            Err(ApiError::Status { status, message }) => {
                tracing::warn!("Authentication rejected with status {}", status);
                return Err(AuthError::CredentialsRejected {
                    message: message.unwrap_or_else(|| fallback.to_string()),
                });
            }
            Err(e) => {
                tracing::error!("Authentication request failed: {}", e);
                return Err(e.into());
            }
        };

        if !response.success {
            return Err(AuthError::CredentialsRejected {
                message: response
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| fallback.to_string()),
            });
        }

        let (Some(user), Some(token)) = (response.user, response.access_token) else {
            return Err(AuthError::InvalidResponse {
                reason: "success response without user or access token".to_string(),
            });
        };

        // Anything queued before this point refers to the previous session
        self.sync_expiry();

        self.store.set_token(token);
        self.store.set_user(user.clone());
        self.set_user(Some(user.clone()));
        tracing::info!("Signed in as {}", user.email);

        Ok(LoginOutcome::Authenticated(user))
    }
}

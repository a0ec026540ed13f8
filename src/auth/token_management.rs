use super::ME_PATH;
use crate::api_client::HttpTransport;
use crate::errors::{ApiError, AuthError};
use crate::models::{CurrentUser, ProfileUpdate};
use url::Url;

impl<T: HttpTransport> super::AuthSession<T> {
    /// Restores a cached session, then verifies it with `GET /api/me`.
    ///
    /// With no cached token this is purely local and makes no request.
    pub async fn initialize(&self) -> Option<CurrentUser> {
        if self.store.get_token().is_none() {
            tracing::debug!("No cached session token, starting signed out");
            self.set_user(None);
            return None;
        }

        // Expiries queued before this point are about an earlier token
        self.sync_expiry();

        // Optimistic until the backend confirms
        self.set_user(self.store.get_user());

        match self.client.get_json::<CurrentUser>(ME_PATH).await {
            Ok(user) => {
                tracing::info!("Session verified for {}", user.email);
                self.store.set_user(user.clone());
                self.set_user(Some(user.clone()));
                Some(user)
            }
            Err(e) => {
                tracing::warn!("Cached session could not be verified: {}", e);
                self.store.clear_all();
                self.set_user(None);
                None
            }
        }
    }

    /// Ends the session locally and returns where the caller should go next
    pub fn logout(&self) -> Result<Url, AuthError> {
        self.store.clear_all();
        self.set_user(None);
        tracing::info!("Signed out");

        Url::parse(&self.oauth.post_logout_redirect)
            .map_err(|e| AuthError::Api(ApiError::from(e)))
    }

    /// Entry point of the OAuth2 authorization-code flow on the backend
    pub fn oauth_login_url(&self) -> Result<Url, AuthError> {
        let path = format!("/oauth2/authorization/{}", self.oauth.registration_id);
        Ok(self.client.resolve(&path)?)
    }

    /// Merges a profile change into the signed-in user without a request.
    /// Does nothing when signed out.
    pub fn update_user(&self, update: &ProfileUpdate) -> Option<CurrentUser> {
        let mut user = self.current_user()?;
        if let Some(ref first_name) = update.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(ref last_name) = update.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(ref display_name) = update.display_name {
            user.display_name = display_name.clone();
        }

        self.store.set_user(user.clone());
        self.set_user(Some(user.clone()));
        Some(user)
    }
}

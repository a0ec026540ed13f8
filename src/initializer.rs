use crate::api_client::{ApiClient, HttpTransport, ReqwestTransport};
use crate::auth::AuthSession;
use crate::config::Config;
use crate::errors::AppError;
use crate::events::SessionEvents;
use crate::expenses::ExpenseApi;
use crate::interceptor::{BearerTokenInterceptor, SessionExpiryInterceptor};
use crate::token_storage::{SessionTokenStore, TokenStore};
use std::sync::Arc;
use url::Url;

/// Everything a host needs, wired to one token store and one event bus
pub struct InitializedApp<T = ReqwestTransport> {
    pub config: Config,
    pub store: Arc<dyn TokenStore>,
    pub events: SessionEvents,
    pub client: Arc<ApiClient<T>>,
    pub session: AuthSession<T>,
    pub expenses: ExpenseApi<T>,
}

/// Builds the application on the production reqwest transport
pub fn initialize_application(config: Config) -> Result<InitializedApp, AppError> {
    let client = ApiClient::new(&config.api)?;
    Ok(assemble(config, client))
}

/// Same wiring over an arbitrary transport
pub fn initialize_application_with_transport<T: HttpTransport>(
    config: Config,
    transport: T,
) -> Result<InitializedApp<T>, AppError> {
    let base_url = Url::parse(config.api_base_url()).map_err(crate::errors::ApiError::from)?;
    let client = ApiClient::with_transport(transport, base_url, &config.api.api_prefix);
    Ok(assemble(config, client))
}

fn assemble<T: HttpTransport>(config: Config, client: ApiClient<T>) -> InitializedApp<T> {
    let store: Arc<dyn TokenStore> = Arc::new(SessionTokenStore::new());
    let events = SessionEvents::new();
    let prefix = config.api.api_prefix.clone();

    let client = Arc::new(
        client
            .with_request_interceptor(Arc::new(BearerTokenInterceptor::new(
                store.clone(),
                prefix.clone(),
            )))
            .with_response_interceptor(Arc::new(SessionExpiryInterceptor::new(
                store.clone(),
                events.clone(),
                prefix,
            ))),
    );

    let session = AuthSession::new(
        client.clone(),
        store.clone(),
        events.clone(),
        config.oauth.clone(),
    );
    let expenses = ExpenseApi::new(client.clone());

    tracing::debug!("Application initialized against {}", client.base_url());

    InitializedApp {
        config,
        store,
        events,
        client,
        session,
        expenses,
    }
}

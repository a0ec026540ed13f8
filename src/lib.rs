pub mod api_client;
pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod events;
pub mod expenses;
pub mod initializer;
pub mod interceptor;
pub mod logger;
pub mod models;
pub mod token_storage;
pub mod validation;

pub use api_client::{ApiClient, ApiRequest, ApiResponse, HttpTransport, ReqwestTransport};
pub use auth::{AuthSession, LoginOutcome};
pub use config::Config;
pub use errors::{ApiError, AppError, AuthError, ConfigError};
pub use events::{SessionEvent, SessionEvents};
pub use expenses::{ExpenseApi, ExpenseQuery};
pub use initializer::{InitializedApp, initialize_application, initialize_application_with_transport};
pub use interceptor::{BearerTokenInterceptor, SessionExpiryInterceptor};
pub use models::{CurrentUser, SessionToken, SignupRequest};
pub use token_storage::{SessionTokenStore, TokenStore};

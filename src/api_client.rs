use crate::config::ApiConfig;
use crate::errors::ApiError;
use crate::interceptor::{RequestInterceptor, ResponseInterceptor};
use crate::models::ErrorResponse;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A request relative to the configured base URL
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path under the base URL, e.g. `/api/me`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }
}

/// Status and raw body as received from the transport
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn from_json(status: StatusCode, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// `message` field of a JSON error body, if any
    pub fn error_message(&self) -> Option<String> {
        serde_json::from_str::<ErrorResponse>(&self.body)
            .ok()
            .and_then(|e| e.message)
            .filter(|m| !m.trim().is_empty())
    }
}

/// The wire underneath `ApiClient`. Interceptors run around it, never inside.
pub trait HttpTransport: Send + Sync {
    fn send(
        &self,
        url: &Url,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, ApiError>> + Send;
}

/// Production transport backed by a single `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(format!("expense-session/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, url: &Url, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = self
            .client
            .request(request.method.clone(), url.clone())
            .headers(request.headers.clone());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(ApiResponse { status, body })
    }
}

/// The one HTTP client every API call goes through.
///
/// Request interceptors run in registration order before dispatch, response
/// interceptors after a response arrives. Non-2xx responses are still handed
/// to the response interceptors and then returned as `ApiError::Status`.
pub struct ApiClient<T = ReqwestTransport> {
    transport: T,
    base_url: Url,
    api_prefix: String,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl ApiClient<ReqwestTransport> {
    /// Builds the shared client from configuration (base URL, fixed timeout)
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.timeout_sec))?;
        let base_url = Url::parse(&config.base_url)?;
        Ok(Self::with_transport(transport, base_url, &config.api_prefix))
    }
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn with_transport(transport: T, base_url: Url, api_prefix: &str) -> Self {
        Self {
            transport,
            base_url,
            api_prefix: api_prefix.to_string(),
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
        }
    }

    pub fn with_request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_interceptors.push(interceptor);
        self
    }

    pub fn with_response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_interceptors.push(interceptor);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    /// Absolute URL for a path under the base URL
    pub fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let url = if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        };
        Ok(Url::parse(&url)?)
    }

    /// Runs the full pipeline for one request
    pub async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.resolve(&request.path)?;

        for interceptor in &self.request_interceptors {
            interceptor.on_request(&mut request);
        }

        tracing::debug!(
            "API Request: {} {} hasToken={}",
            request.method,
            request.path,
            request.headers.contains_key(AUTHORIZATION)
        );

        let response = match self.transport.send(&url, &request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("API request {} {} failed: {}", request.method, request.path, e);
                return Err(e);
            }
        };

        tracing::debug!("API Response: {} {}", response.status.as_u16(), request.path);

        for interceptor in &self.response_interceptors {
            interceptor.on_response(&request, &response);
        }

        if response.is_success() {
            Ok(response)
        } else {
            let message = response.error_message();
            tracing::warn!(
                "API Error: {} {} message={:?}",
                response.status.as_u16(),
                request.path,
                message
            );
            Err(ApiError::Status {
                status: response.status.as_u16(),
                message,
            })
        }
    }

    pub async fn send_json<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        let response = self.execute(request).await?;
        response.json()
    }

    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send_json(ApiRequest::get(path)).await
    }

    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(ApiRequest::post(path).with_json(body)?).await
    }

    pub async fn put_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(ApiRequest::put(path).with_json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(ApiRequest::delete(path)).await?;
        Ok(())
    }
}

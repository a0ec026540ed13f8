use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

pub const ENV_API_BASE_URL: &str = "EXPENSE_SESSION_API_BASE_URL";
pub const ENV_POST_LOGOUT_REDIRECT: &str = "EXPENSE_SESSION_POST_LOGOUT_REDIRECT";
pub const ENV_LOG_LEVEL: &str = "EXPENSE_SESSION_LOG_LEVEL";

/// バックエンドAPI設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// APIベースURL（省略可、デフォルト: http://localhost:8080）
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// 認証トークンを付与するパスのプレフィックス
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// リクエストタイムアウト（秒）
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_api_prefix() -> String {
    crate::interceptor::DEFAULT_API_PREFIX.to_string()
}

fn default_timeout_sec() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            api_prefix: default_api_prefix(),
            timeout_sec: default_timeout_sec(),
        }
    }
}

/// OAuth2 / ログアウト設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// バックエンドのOAuth2クライアント登録ID（/oauth2/authorization/{id}）
    #[serde(default = "default_registration_id")]
    pub registration_id: String,

    /// ログアウト後のリダイレクト先
    #[serde(default = "default_post_logout_redirect")]
    pub post_logout_redirect: String,
}

fn default_registration_id() -> String {
    "keycloak".to_string()
}

fn default_post_logout_redirect() -> String {
    "http://localhost:3000/login".to_string()
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            registration_id: default_registration_id(),
            post_logout_redirect: default_post_logout_redirect(),
        }
    }
}

/// ログ設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// ログレベル（省略可、デフォルト: info）
    #[serde(default = "default_log_level")]
    pub level: String,

    /// ログファイルのパス（省略時は標準エラー出力）
    #[serde(default)]
    pub file_path: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_path: None,
        }
    }
}

/// メイン設定構造体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// バックエンドAPI設定
    #[serde(default)]
    pub api: ApiConfig,

    /// OAuth2 設定
    #[serde(default)]
    pub oauth: OAuthConfig,

    /// ログ設定
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }

    pub fn log_file_path(&self) -> &Option<String> {
        &self.logging.file_path
    }

    /// 環境変数による上書きを適用する（`lookup` は通常 `std::env::var`）
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base_url) = non_empty(ENV_API_BASE_URL) {
            self.api.base_url = base_url;
        }
        if let Some(redirect) = non_empty(ENV_POST_LOGOUT_REDIRECT) {
            self.oauth.post_logout_redirect = redirect;
        }
        if let Some(level) = non_empty(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
    }

    /// 設定値の検証
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("api.base_url", &self.api.base_url),
            ("oauth.post_logout_redirect", &self.oauth.post_logout_redirect),
        ] {
            Url::parse(value).map_err(|e| ConfigError::ValidationError {
                reason: format!("{} is not a valid URL ({}): {}", name, value, e),
            })?;
        }

        if self.api.timeout_sec == 0 {
            return Err(ConfigError::ValidationError {
                reason: "api.timeout_sec must be greater than zero".to_string(),
            });
        }

        if !self.api.api_prefix.starts_with('/') {
            return Err(ConfigError::ValidationError {
                reason: format!("api.api_prefix must start with '/': {}", self.api.api_prefix),
            });
        }

        Ok(())
    }

    /// デフォルト値のまま使われている項目をログに出す
    pub fn log_summary(&self) {
        let defaults = Config::default();
        let mut using_defaults = Vec::new();
        if self.api.base_url == defaults.api.base_url {
            using_defaults.push("api.base_url");
        }
        if self.oauth.post_logout_redirect == defaults.oauth.post_logout_redirect {
            using_defaults.push("oauth.post_logout_redirect");
        }

        if !using_defaults.is_empty() {
            tracing::warn!(
                "Using default values for {:?}. For production, please set these explicitly.",
                using_defaults
            );
        }

        tracing::info!(
            "Configuration: api.base_url={}, api.timeout_sec={}, oauth.registration_id={}",
            self.api.base_url,
            self.api.timeout_sec,
            self.oauth.registration_id
        );
    }
}

/// 設定ファイルのパスを取得
pub fn config_file_path() -> PathBuf {
    let mut path = dirs::config_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    path.push("expense-session");
    path.push("config.toml");
    path
}

/// 設定ファイルを読み込む（存在しない場合はデフォルト設定）
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    } else {
        tracing::debug!("Config file {:?} not found, using defaults", path);
        Ok(Config::default())
    }
}

/// 設定ファイル・環境変数を読み込み、検証した設定を返す
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config_from(&config_file_path())?,
    };
    config.apply_env_overrides(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// 設定ファイルを保存する
pub fn save_config(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent_dir) = path.parent()
        && !parent_dir.as_os_str().is_empty()
        && !parent_dir.exists()
    {
        fs::create_dir_all(parent_dir).map_err(|e| ConfigError::WriteError { source: e })?;
    }

    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents).map_err(|e| ConfigError::WriteError { source: e })?;
    Ok(())
}

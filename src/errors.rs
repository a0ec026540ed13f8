use thiserror::Error;

/// アプリケーション全体のエラー型
#[derive(Error, Debug)]
pub enum AppError {
    /// 認証関連エラー
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// API呼び出し関連エラー
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// 設定関連エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 汎用エラー
    #[error("{message}")]
    Generic { message: String },
}

/// API呼び出し関連エラー
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTPリクエストエラー（ネットワーク到達不能など）
    #[error("HTTP request failed: {source}")]
    RequestError {
        #[source]
        source: reqwest::Error,
    },

    /// リクエストタイムアウト
    #[error("Request timed out: {source}")]
    Timeout {
        #[source]
        source: reqwest::Error,
    },

    /// 2xx 以外のレスポンス
    #[error("Request failed with status {status}{}", .message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Status { status: u16, message: Option<String> },

    /// JSONパースエラー
    #[error("Response parsing failed: {source}")]
    ParseError {
        #[source]
        source: serde_json::Error,
    },

    /// URL組み立てエラー
    #[error("Invalid URL: {source}")]
    InvalidUrl {
        #[source]
        source: url::ParseError,
    },

    /// 汎用APIエラー
    #[error("{message}")]
    Generic { message: String },
}

impl ApiError {
    /// HTTPステータスコード（レスポンスを受け取った場合のみ）
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// バックエンドが返したメッセージ
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// 認証関連エラー
#[derive(Error, Debug)]
pub enum AuthError {
    /// ログイン・サインアップがバックエンドに拒否された
    #[error("{message}")]
    CredentialsRejected { message: String },

    /// 入力値のローカル検証エラー（ネットワークには到達しない）
    #[error("Validation failed: {}", .errors.join("; "))]
    Validation { errors: Vec<String> },

    /// 想定外のレスポンス形式
    #[error("Unexpected authentication response: {reason}")]
    InvalidResponse { reason: String },

    /// API呼び出しエラー
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// 設定関連エラー
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 設定ファイル読み込みエラー
    #[error("Failed to load config file: {source}")]
    LoadError {
        #[source]
        source: std::io::Error,
    },

    /// 設定ファイルパースエラー
    #[error("Failed to parse config file: {source}")]
    ParseError {
        #[source]
        source: toml::de::Error,
    },

    /// 設定バリデーションエラー
    #[error("Configuration validation failed: {reason}")]
    ValidationError { reason: String },

    /// 設定ファイル書き込みエラー
    #[error("Failed to write config file: {source}")]
    WriteError {
        #[source]
        source: std::io::Error,
    },

    /// 設定シリアライズエラー
    #[error("Failed to serialize config: {source}")]
    SerializeError {
        #[source]
        source: toml::ser::Error,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ApiError::Timeout { source: error }
        } else {
            ApiError::RequestError { source: error }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::ParseError { source: error }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(error: url::ParseError) -> Self {
        ApiError::InvalidUrl { source: error }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::Api(error.into())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        AuthError::Api(error.into())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        ConfigError::LoadError { source: error }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(error: toml::de::Error) -> Self {
        ConfigError::ParseError { source: error }
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(error: toml::ser::Error) -> Self {
        ConfigError::SerializeError { source: error }
    }
}

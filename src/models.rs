use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque bearer credential issued by the backend on login/signup.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        SessionToken(SecretString::new(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.expose())
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

impl PartialEq for SessionToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for SessionToken {}

/// Reads the token off the wire; an empty string counts as absent
pub fn deserialize_token_option<'de, D>(deserializer: D) -> Result<Option<SessionToken>, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.is_empty()).map(SessionToken::new))
}

/// The logged-in user as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub display_name: String,
}

impl CurrentUser {
    /// Display name, falling back to "first last" and then the email
    pub fn name(&self) -> String {
        if !self.display_name.trim().is_empty() {
            return self.display_name.clone();
        }
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

// --- /api/auth ペイロード ---
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Shared response shape of `/api/auth/login` and `/api/auth/signup`.
/// Inbound only.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<CurrentUser>,
    #[serde(default, deserialize_with = "deserialize_token_option")]
    pub access_token: Option<SessionToken>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body returned by the backend, e.g. `{"message": "Invalid credentials"}`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// --- 支出データモデル ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseCategory {
    Food,
    Transportation,
    Entertainment,
    Bills,
    Shopping,
    Healthcare,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 7] = [
        ExpenseCategory::Food,
        ExpenseCategory::Transportation,
        ExpenseCategory::Entertainment,
        ExpenseCategory::Bills,
        ExpenseCategory::Shopping,
        ExpenseCategory::Healthcare,
        ExpenseCategory::Other,
    ];

    /// Wire name used in query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "FOOD",
            ExpenseCategory::Transportation => "TRANSPORTATION",
            ExpenseCategory::Entertainment => "ENTERTAINMENT",
            ExpenseCategory::Bills => "BILLS",
            ExpenseCategory::Shopping => "SHOPPING",
            ExpenseCategory::Healthcare => "HEALTHCARE",
            ExpenseCategory::Other => "OTHER",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        ExpenseCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == upper)
            .ok_or_else(|| format!("Unknown expense category: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub description: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub created_at: Option<String>, // ISO 8601
}

/// Body of `POST /api/expenses`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub amount: f64,
    pub category: ExpenseCategory,
    pub description: String,
    pub date: NaiveDate,
}

/// One page of `GET /api/expenses`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePage {
    #[serde(default)]
    pub content: Vec<Expense>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategorySummary {
    pub category: ExpenseCategory,
    pub total: f64,
}

// --- ユーザー設定 ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub currency: String,
    pub date_format: String,
    pub default_category: ExpenseCategory,
    pub enable_notifications: bool,
    pub theme: String,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            date_format: "MM/dd/yyyy".to_string(),
            default_category: ExpenseCategory::Other,
            enable_notifications: true,
            theme: "light".to_string(),
        }
    }
}

/// Partial update for `PUT /api/me`; unset fields are left out of the body
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_debug_is_redacted() {
        let token = SessionToken::new("tok1");
        assert_eq!(format!("{:?}", token), "SessionToken([REDACTED])");
        assert_eq!(token.bearer(), "Bearer tok1");
    }

    #[test]
    fn test_auth_response_deserialization() {
        let json = r#"{
            "success": true,
            "user": {"id": "1", "email": "a@b.com", "firstName": "Ada", "lastName": "Byron"},
            "accessToken": "tok1"
        }"#;
        let response: AuthResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);
        assert_eq!(response.access_token, Some(SessionToken::new("tok1")));
        let user = response.user.unwrap();
        assert_eq!(user.id, "1");
        assert_eq!(user.display_name, "");
        assert_eq!(user.name(), "Ada Byron");
        assert!(!format!("{:?}", response.access_token).contains("tok1"));
    }

    #[test]
    fn test_auth_response_failure_payload() {
        let response: AuthResponse =
            serde_json::from_str(r#"{"success": false, "message": "Invalid credentials"}"#)
                .unwrap();
        assert!(!response.success);
        assert!(response.user.is_none());
        assert!(response.access_token.is_none());
        assert_eq!(response.message.as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_empty_access_token_is_treated_as_missing() {
        let response: AuthResponse =
            serde_json::from_str(r#"{"success": true, "accessToken": ""}"#).unwrap();
        assert!(response.access_token.is_none());
    }

    #[test]
    fn test_login_request_uses_camel_case() {
        let request = LoginRequest {
            email: "a@b.com".to_string(),
            password: "pw1".to_string(),
            remember_me: true,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["rememberMe"], serde_json::json!(true));
        assert_eq!(value["email"], serde_json::json!("a@b.com"));
    }

    #[test]
    fn test_user_name_falls_back_to_email() {
        let user = CurrentUser {
            id: "1".to_string(),
            email: "a@b.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            display_name: String::new(),
        };
        assert_eq!(user.name(), "a@b.com");
    }

    #[test]
    fn test_expense_category_parsing() {
        assert_eq!("food".parse::<ExpenseCategory>(), Ok(ExpenseCategory::Food));
        assert_eq!(
            "HEALTHCARE".parse::<ExpenseCategory>(),
            Ok(ExpenseCategory::Healthcare)
        );
        assert!("groceries".parse::<ExpenseCategory>().is_err());
    }

    #[test]
    fn test_expense_page_deserialization() {
        let json = r#"{
            "content": [{
                "id": 7,
                "amount": 12.5,
                "category": "FOOD",
                "description": "Lunch",
                "date": "2024-03-14",
                "createdAt": "2024-03-14T12:00:00"
            }],
            "totalElements": 1,
            "totalPages": 1,
            "number": 0,
            "size": 10
        }"#;
        let page: ExpensePage = serde_json::from_str(json).unwrap();
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.content[0].category, ExpenseCategory::Food);
        assert_eq!(
            page.content[0].date,
            NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
        );
        assert_eq!(page.total_elements, 1);
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            display_name: Some("Ada".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, serde_json::json!({"displayName": "Ada"}));
    }

    #[test]
    fn test_user_preferences_default() {
        let prefs = UserPreferences::default();
        assert_eq!(prefs.currency, "USD");
        assert_eq!(prefs.default_category, ExpenseCategory::Other);
        assert!(prefs.enable_notifications);
    }
}

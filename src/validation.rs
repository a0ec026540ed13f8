//! Local form validation. Nothing in here touches the network.

use crate::errors::AuthError;
use crate::models::SignupRequest;
use regex::Regex;
use std::sync::LazyLock;

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_NAME_LENGTH: usize = 50;
/// Minimum `password_strength` score accepted at signup
const MIN_SIGNUP_STRENGTH: u8 = 4;

// Literal patterns, compiled once
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static LOWERCASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z]").expect("lowercase pattern"));
static UPPERCASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]").expect("uppercase pattern"));
static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]").expect("digit pattern"));
static SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).expect("special character pattern"));

/// Required, then `local@domain.tld`. The address is checked as typed, so
/// surrounding whitespace makes it invalid.
pub fn validate_email(email: &str) -> Vec<String> {
    if email.trim().is_empty() {
        return vec!["Email is required".to_string()];
    }

    if !EMAIL.is_match(email) {
        return vec!["Please enter a valid email address".to_string()];
    }

    Vec::new()
}

/// Every password rule that fails, for showing next to a password field
pub fn validate_password(password: &str) -> Vec<String> {
    if password.trim().is_empty() {
        return vec!["Password is required".to_string()];
    }

    let mut errors = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push("Password must be at least 8 characters long".to_string());
    }
    if !LOWERCASE.is_match(password) {
        errors.push("Password must contain at least one lowercase letter".to_string());
    }
    if !UPPERCASE.is_match(password) {
        errors.push("Password must contain at least one uppercase letter".to_string());
    }
    if !DIGIT.is_match(password) {
        errors.push("Password must contain at least one number".to_string());
    }
    if !SPECIAL.is_match(password) {
        errors.push("Password must contain at least one special character".to_string());
    }
    errors
}

pub fn validate_name(name: &str) -> Vec<String> {
    let name = name.trim();
    if name.is_empty() {
        return vec!["This field is required".to_string()];
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return vec!["Name must not exceed 50 characters".to_string()];
    }
    Vec::new()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordStrength {
    /// 0..=5, one point per satisfied rule
    pub score: u8,
    pub label: &'static str,
}

/// Scores a password for the strength meter shown next to the signup form
pub fn password_strength(password: &str) -> PasswordStrength {
    let checks = [
        password.chars().count() >= MIN_PASSWORD_LENGTH,
        UPPERCASE.is_match(password),
        LOWERCASE.is_match(password),
        DIGIT.is_match(password),
        SPECIAL.is_match(password),
    ];
    let score = checks.iter().filter(|passed| **passed).count() as u8;

    let label = match score {
        0 | 1 => "Weak",
        2 | 3 => "Medium",
        _ => "Strong",
    };

    PasswordStrength { score, label }
}

impl SignupRequest {
    /// All field errors at once, so the form can show them together.
    /// The password only has to reach a "Strong" score, not pass every rule.
    pub fn validate(&self) -> Result<(), AuthError> {
        let mut errors = Vec::new();
        errors.extend(validate_name(&self.first_name));
        errors.extend(validate_name(&self.last_name));
        errors.extend(validate_email(&self.email));
        if self.password.trim().is_empty() {
            errors.push("Password is required".to_string());
        } else if password_strength(&self.password).score < MIN_SIGNUP_STRENGTH {
            errors.push("Please choose a stronger password".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AuthError::Validation { errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(first: &str, last: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("a@b.com").is_empty());
        assert!(validate_email("first.last@sub.example.org").is_empty());
        assert_eq!(validate_email("  "), vec!["Email is required"]);
        assert!(validate_email("a@b.c.").is_empty());
        for bad in [
            "ab.com",
            "a@b",
            "a@.com",
            "@b.com",
            "a b@c.com",
            "a@b@c.com",
            "a@b.",
            " a@b.com",
            "a@b.com ",
        ] {
            assert_eq!(
                validate_email(bad),
                vec!["Please enter a valid email address"],
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("Str0ng!pw").is_empty());
        assert_eq!(validate_password(""), vec!["Password is required"]);

        let errors = validate_password("abc");
        assert!(errors.contains(&"Password must be at least 8 characters long".to_string()));
        assert!(errors.contains(&"Password must contain at least one uppercase letter".to_string()));
        assert!(errors.contains(&"Password must contain at least one number".to_string()));
        assert!(errors.contains(&"Password must contain at least one special character".to_string()));
        assert!(!errors.contains(&"Password must contain at least one lowercase letter".to_string()));
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("Ada").is_empty());
        assert_eq!(validate_name(""), vec!["This field is required"]);
        assert_eq!(
            validate_name(&"x".repeat(51)),
            vec!["Name must not exceed 50 characters"]
        );
    }

    #[test]
    fn test_password_strength_scoring() {
        assert_eq!(password_strength("").score, 0);
        assert_eq!(password_strength("").label, "Weak");
        assert_eq!(password_strength("abc").label, "Weak");
        assert_eq!(password_strength("abcABC").label, "Medium");
        assert_eq!(password_strength("abcABC1").label, "Medium");
        assert_eq!(
            password_strength("abcdefH1"),
            PasswordStrength {
                score: 4,
                label: "Strong"
            }
        );
        assert_eq!(
            password_strength("abcdeH1!"),
            PasswordStrength {
                score: 5,
                label: "Strong"
            }
        );
    }

    #[test]
    fn test_signup_validation_collects_all_errors() {
        assert!(signup("Ada", "Lovelace", "ada@example.com", "Analyt1c!").validate().is_ok());

        match signup("", "Lovelace", "not-an-email", "short").validate() {
            Err(AuthError::Validation { errors }) => {
                assert!(errors.contains(&"This field is required".to_string()));
                assert!(errors.contains(&"Please enter a valid email address".to_string()));
                assert!(errors.contains(&"Please choose a stronger password".to_string()));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_signup_accepts_strong_password_missing_one_rule() {
        // Four of five rules, no special character
        assert!(!validate_password("Abcdefg1").is_empty());
        assert!(signup("Ada", "Lovelace", "ada@example.com", "Abcdefg1").validate().is_ok());

        match signup("Ada", "Lovelace", "ada@example.com", "abcdefg1").validate() {
            Err(AuthError::Validation { errors }) => {
                assert_eq!(errors, vec!["Please choose a stronger password"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        match signup("Ada", "Lovelace", "ada@example.com", "").validate() {
            Err(AuthError::Validation { errors }) => {
                assert_eq!(errors, vec!["Password is required"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}

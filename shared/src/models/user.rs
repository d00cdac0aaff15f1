//! Account request and response shapes for the REST API

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Registration request body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "owner".to_string()
}

/// Successful login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

/// Account returned by registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredUser {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_validation() {
        let ok = LoginInput {
            email: "owner@busyfool.cafe".to_string(),
            password: "flatwhite".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = LoginInput {
            email: "owner".to_string(),
            password: "flatwhite".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let short_password = LoginInput {
            email: "owner@busyfool.cafe".to_string(),
            password: "latte".to_string(),
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_register_defaults_role() {
        let input: RegisterInput = serde_json::from_str(
            r#"{"name": "Sam", "email": "sam@busyfool.cafe", "password": "cortado!"}"#,
        )
        .unwrap();
        assert_eq!(input.role, "owner");
    }

    #[test]
    fn test_session_uses_camel_case_token() {
        let session: AuthSession = serde_json::from_str(r#"{"accessToken": "abc.def"}"#).unwrap();
        assert_eq!(session.access_token, "abc.def");
    }
}

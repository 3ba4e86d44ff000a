use serde::{Deserialize, Serialize};

use crate::auth::UserProfile;

/// Role assigned to self-registered operators unless they pick another
pub const DEFAULT_ROLE: &str = "user";

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: String,
}

impl Default for RegisterRequest {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            password: String::new(),
            full_name: String::new(),
            role: DEFAULT_ROLE.to_string(),
        }
    }
}

/// Body returned by both `/auth/login` and `/auth/register`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_defaults_role() {
        let request = RegisterRequest {
            username: "jdoe".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["full_name"], "");
    }

    #[test]
    fn test_parse_auth_response() {
        let json = r#"{"message":"Login successful","token":"t1","user":{"id":1,"username":"admin","email":"admin@brokermint.com","full_name":"Administrator","role":"admin"}}"#;
        let auth: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(auth.token, "t1");
        assert_eq!(auth.user.username, "admin");
        assert!(auth.user.is_admin());
        assert_eq!(auth.message.as_deref(), Some("Login successful"));
    }
}

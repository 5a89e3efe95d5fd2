use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    users::{
        dto::{validate_email, validate_name, validate_password},
        Role,
    },
};

/// OAuth2-style password form; `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// JSON alternative to [`LoginForm`].
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public self-registration; the role is always `user`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_string();
    }

    pub fn validate(&self) -> AppResult<()> {
        validate_name(&self.name)?;
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub rol: Role,
}

impl TokenResponse {
    pub fn bearer(access_token: String, rol: Role) -> Self {
        Self {
            access_token,
            token_type: "bearer".into(),
            rol,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    pub active: bool,
}

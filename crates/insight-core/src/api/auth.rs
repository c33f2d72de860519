//! Remote auth operations.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::error::{Error, Result};
use crate::http::{HttpClient, Method};
use crate::models::User;

const PASSWORD_MISMATCH_MESSAGE: &str = "The two passwords do not match!";

#[derive(Clone, PartialEq, Eq)]
pub struct SignupRequest {
    pub user_name: String,
    pub user_email: String,
    pub user_password: String,
    /// Checked locally, never transmitted.
    pub confirm_password: String,
}

impl SignupRequest {
    /// Local checks run before anything is sent.
    pub fn validate(&self) -> Result<()> {
        if self.user_name.trim().is_empty() {
            return Err(Error::Validation("Name is required".to_string()));
        }
        validate_credentials(&self.user_email, &self.user_password)?;
        if self.user_password != self.confirm_password {
            return Err(Error::Validation(PASSWORD_MISMATCH_MESSAGE.to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SignupRequest")
            .field("user_name", &self.user_name)
            .field("user_email", &self.user_email)
            .field("user_password", &"[REDACTED]")
            .field("confirm_password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub user_email: String,
    pub user_password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<()> {
        validate_credentials(&self.user_email, &self.user_password)
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LoginRequest")
            .field("user_email", &self.user_email)
            .field("user_password", &"[REDACTED]")
            .finish()
    }
}

/// Signup/login success payload.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user: User,
    pub access_token: String,
    #[serde(default)]
    pub message: String,
}

impl fmt::Debug for AuthPayload {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthPayload")
            .field("user", &self.user)
            .field("access_token", &"[REDACTED]")
            .field("message", &self.message)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProfilePayload {
    Wrapped { user: User },
    Bare(User),
}

/// Signup, login, logout, and profile operations against `/auth`.
#[derive(Debug, Clone)]
pub struct AuthApi {
    http: Arc<HttpClient>,
}

impl AuthApi {
    pub const fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthPayload> {
        request.validate()?;

        let body = json!({
            "userName": request.user_name.trim(),
            "userEmail": request.user_email.trim(),
            "userPassword": request.user_password,
        });
        self.http
            .send_json(Method::POST, "/auth/signup", Some(&body))
            .await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthPayload> {
        request.validate()?;

        let body = json!({
            "userEmail": request.user_email.trim(),
            "userPassword": request.user_password,
        });
        self.http
            .send_json(Method::POST, "/auth/login", Some(&body))
            .await
    }

    /// Returns the server's confirmation message.
    pub async fn logout(&self) -> Result<String> {
        let payload: MessagePayload = self
            .http
            .send_json(Method::POST, "/auth/logout", None)
            .await?;
        Ok(payload.message)
    }

    pub async fn profile(&self) -> Result<User> {
        let payload: ProfilePayload = self
            .http
            .send_json(Method::GET, "/auth/profile", None)
            .await?;
        Ok(match payload {
            ProfilePayload::Wrapped { user } | ProfilePayload::Bare(user) => user,
        })
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(Error::Validation("Email is required".to_string()));
    }
    if password.trim().is_empty() {
        return Err(Error::Validation("Password is required".to_string()));
    }
    Ok(())
}

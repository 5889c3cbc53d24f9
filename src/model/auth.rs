use serde::{Deserialize, Serialize};

use super::{null_as_default, require_non_blank, EntityId, Validate};
use crate::config::SecureString;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(serialize_with = "expose_secret")]
    pub password: SecureString,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecureString::new(password.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    #[serde(serialize_with = "expose_secret")]
    pub password: SecureString,
    #[serde(serialize_with = "expose_secret")]
    pub confirm_password: SecureString,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    pub email: String,
    pub mobile_number: String,
    #[serde(serialize_with = "expose_secret")]
    pub new_password: SecureString,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_blank(&self.email, "Please provide a valid email")?;
        require_non_blank(&self.username, "Please provide a valid username")?;
        require_non_blank(self.password.expose(), "Please provide a password")?;
        if self.password != self.confirm_password {
            return Err("Passwords do not match".to_string());
        }
        Ok(())
    }
}

impl Validate for PasswordResetRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_blank(&self.email, "Please provide a valid email")?;
        require_non_blank(&self.mobile_number, "Please provide a valid mobile number")?;
        require_non_blank(self.new_password.expose(), "Please provide a new password")
    }
}

/// Response of login/register/reset calls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<EntityId>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: EntityId,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_type: String,
}

fn expose_secret<S>(secret: &SecureString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(secret.expose())
}

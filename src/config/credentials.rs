//! Sensitive values that must never end up in logs.

/// A session token or password. Debug and Display print a mask.
#[derive(Clone, PartialEq, Eq)]
pub struct SecureString(String);

impl SecureString {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Raw value, for request headers and bodies only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString(••••••••)")
    }
}

impl std::fmt::Display for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "••••••••")
    }
}

/// Build the bearer `Authorization` header value for a token.
pub fn bearer_header(token: &SecureString) -> Option<String> {
    if token.is_empty() {
        return None;
    }
    Some(format!("Bearer {}", token.expose()))
}

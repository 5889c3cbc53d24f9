//! Process-wide sign-in state.
//!
//! The gateway reads the credential and caller identity from here for
//! every request and tears the session down on any 401.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::SecureString;
use crate::model::{AuthResponse, EntityId};

/// Identity of the signed-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    pub user_id: EntityId,
    pub token: SecureString,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl SessionInfo {
    /// Build from a login response; `None` when it lacks a token or id.
    pub fn from_auth(response: &AuthResponse) -> Option<Self> {
        let token = response.token.as_ref().filter(|t| !t.is_empty())?;
        Some(Self {
            user_id: response.user_id?,
            token: SecureString::new(token.clone()),
            username: response.username.clone(),
            email: response.email.clone(),
        })
    }
}

/// On-disk form used by the CLI to keep a session between runs.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    user_id: EntityId,
    token: String,
    username: Option<String>,
    email: Option<String>,
}

/// Shared handle to the current session. Clones observe the same state.
#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<Option<SessionInfo>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, info: SessionInfo) {
        tracing::info!(user_id = info.user_id, "Signed in");
        *self.inner.write() = Some(info);
    }

    /// Discard credential and cached identity.
    pub fn teardown(&self) {
        if let Some(info) = self.inner.write().take() {
            tracing::info!(user_id = info.user_id, "Session torn down");
        }
    }

    pub fn current(&self) -> Option<SessionInfo> {
        self.inner.read().clone()
    }

    pub fn user_id(&self) -> Option<EntityId> {
        self.inner.read().as_ref().map(|info| info.user_id)
    }

    pub fn token(&self) -> Option<SecureString> {
        self.inner.read().as_ref().map(|info| info.token.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Restore a session written by [`Session::save_to`].
    ///
    /// A missing or unreadable file yields a signed-out session.
    pub fn load_from(path: &Path) -> Self {
        let session = Session::new();
        let Ok(content) = fs::read_to_string(path) else {
            return session;
        };
        match serde_json::from_str::<PersistedSession>(&content) {
            Ok(saved) => {
                *session.inner.write() = Some(SessionInfo {
                    user_id: saved.user_id,
                    token: SecureString::new(saved.token),
                    username: saved.username,
                    email: saved.email,
                });
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable session file");
            }
        }
        session
    }

    /// Write the session to `path`, or remove the file when signed out.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let Some(info) = self.current() else {
            return match fs::remove_file(path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            };
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let saved = PersistedSession {
            user_id: info.user_id,
            token: info.token.expose().to_string(),
            username: info.username,
            email: info.email,
        };
        let content = serde_json::to_string_pretty(&saved)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, content)
    }
}

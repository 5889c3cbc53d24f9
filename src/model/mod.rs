//! Client-side cache representations of backend entities.
//!
//! The backend is the source of truth; these types only mirror its JSON
//! payloads (camelCase) and carry the few invariants the client enforces
//! locally when it caches them.

mod auth;
mod board;
mod business;
mod connection;
mod invitation;
mod pin;

use serde::{Deserialize, Deserializer};

pub use auth::{AuthResponse, LoginRequest, PasswordResetRequest, RegisterRequest, UserProfile};
pub use board::{Board, BoardRequest, BoardType};
pub use business::{BusinessProfile, BusinessProfileRequest};
pub use connection::Connection;
pub use invitation::{Invitation, InvitationRequest, InvitationResponse, InvitationStatus, InvitationType};
pub use pin::{Pin, PinRequest};

/// Numeric identifier assigned by the backend.
pub type EntityId = i64;

/// Anything a [`ResourceStore`](crate::store::ResourceStore) can cache.
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> EntityId;
}

/// Local validation of a request payload before it is sent.
///
/// Returns a user-facing message on failure.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Nullable backend fields may arrive as explicit `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn null_as_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

pub(crate) fn default_true() -> bool {
    true
}

fn require_non_blank(value: &str, message: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(message.to_string());
    }
    Ok(())
}

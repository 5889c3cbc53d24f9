//! Entity stores: cached server state plus the calls that change it.
//!
//! Each typed store is a thin facade over a [`ResourceStore`] wired to
//! one gateway trait. Stores are constructed once (see
//! [`Client`](crate::client::Client)) and cloned wherever needed; clones
//! share the same cache.

mod boards;
mod business;
mod connections;
mod error;
mod invitations;
mod pins;
mod resource;

pub use boards::BoardStore;
pub use business::BusinessStore;
pub use connections::ConnectionStore;
pub use error::StoreError;
pub use invitations::InvitationStore;
pub use pins::PinStore;
pub use resource::{ResourceStore, StoreSnapshot};

pub(crate) use resource::OnError;

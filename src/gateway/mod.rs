//! Backend gateway: the per-entity operations the stores consume.
//!
//! Stores only see these traits. [`HttpGateway`] implements all of them
//! against the REST backend; tests substitute in-memory fakes.

mod error;
mod http;
mod session;

use async_trait::async_trait;

use crate::model::{
    AuthResponse, Board, BoardRequest, BusinessProfile, BusinessProfileRequest, Connection,
    EntityId, Invitation, InvitationRequest, InvitationResponse, LoginRequest,
    PasswordResetRequest, Pin, PinRequest, RegisterRequest, UserProfile,
};

pub use error::{GatewayError, GatewayResult};
pub use http::HttpGateway;
pub use session::{Session, SessionInfo};

/// Parameterization of a pin collection fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinScope {
    Public,
    ByUser(EntityId),
    Search(String),
}

/// Parameterization of a board collection fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardScope {
    ByUser(EntityId),
    Search(String),
}

/// Which side of the follow graph to list for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionScope {
    Followers(EntityId),
    Following(EntityId),
}

#[async_trait]
pub trait PinApi: Send + Sync {
    async fn list_pins(&self, scope: &PinScope) -> GatewayResult<Vec<Pin>>;
    async fn get_pin(&self, id: EntityId) -> GatewayResult<Pin>;
    async fn create_pin(&self, request: &PinRequest) -> GatewayResult<Pin>;
    async fn update_pin(&self, id: EntityId, request: &PinRequest) -> GatewayResult<Pin>;
    async fn delete_pin(&self, id: EntityId) -> GatewayResult<()>;
}

#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn list_boards(&self, scope: &BoardScope) -> GatewayResult<Vec<Board>>;
    async fn get_board(&self, id: EntityId) -> GatewayResult<Board>;
    async fn create_board(&self, request: &BoardRequest) -> GatewayResult<Board>;
    async fn update_board(&self, id: EntityId, request: &BoardRequest) -> GatewayResult<Board>;
    async fn delete_board(&self, id: EntityId) -> GatewayResult<()>;
    /// Save a pin to a board. Returns the board as the server now sees it.
    async fn add_pin_to_board(&self, board_id: EntityId, pin_id: EntityId) -> GatewayResult<Board>;
}

#[async_trait]
pub trait ConnectionApi: Send + Sync {
    async fn list_connections(&self, scope: ConnectionScope) -> GatewayResult<Vec<Connection>>;
    /// Follow `user_id` as the signed-in user.
    async fn follow(&self, user_id: EntityId) -> GatewayResult<Connection>;
    async fn unfollow(&self, user_id: EntityId) -> GatewayResult<()>;
}

#[async_trait]
pub trait InvitationApi: Send + Sync {
    /// Inbox of `user_id`.
    async fn list_invitations(&self, user_id: EntityId) -> GatewayResult<Vec<Invitation>>;
    async fn create_invitation(&self, request: &InvitationRequest) -> GatewayResult<Invitation>;
    async fn respond_to_invitation(
        &self,
        id: EntityId,
        response: InvitationResponse,
    ) -> GatewayResult<Invitation>;
}

#[async_trait]
pub trait BusinessApi: Send + Sync {
    async fn list_profiles(&self) -> GatewayResult<Vec<BusinessProfile>>;
    async fn get_profile(&self, id: EntityId) -> GatewayResult<BusinessProfile>;
    async fn create_profile(&self, request: &BusinessProfileRequest) -> GatewayResult<BusinessProfile>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> GatewayResult<AuthResponse>;
    async fn register(&self, request: &RegisterRequest) -> GatewayResult<AuthResponse>;
    async fn reset_password(&self, request: &PasswordResetRequest) -> GatewayResult<AuthResponse>;
    async fn get_user(&self, user_id: EntityId) -> GatewayResult<UserProfile>;
}

/// A gateway serving every entity.
pub trait Backend: PinApi + BoardApi + ConnectionApi + InvitationApi + BusinessApi + AuthApi {}

impl<T> Backend for T where T: PinApi + BoardApi + ConnectionApi + InvitationApi + BusinessApi + AuthApi {}

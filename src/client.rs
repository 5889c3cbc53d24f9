//! Wiring of the session, the stores, the coordinator and the login guard.

use std::sync::Arc;

use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::gateway::{AuthApi, Backend, GatewayResult, HttpGateway, Session, SessionInfo};
use crate::guard::{FileAttemptStorage, GuardPolicy, LoginError, LoginGuard, SystemClock};
use crate::model::{
    AuthResponse, EntityId, LoginRequest, PasswordResetRequest, RegisterRequest, UserProfile,
    Validate,
};
use crate::store::{BoardStore, BusinessStore, ConnectionStore, InvitationStore, PinStore, StoreError};

/// One instance of every store, sharing a session and a backend.
///
/// Cloning is cheap and every clone observes the same caches.
#[derive(Clone)]
pub struct Client {
    session: Session,
    auth: Arc<dyn AuthApi>,
    pins: PinStore,
    boards: BoardStore,
    connections: ConnectionStore,
    invitations: InvitationStore,
    businesses: BusinessStore,
    coordinator: Coordinator,
    guard: LoginGuard,
}

impl Client {
    pub fn new<B: Backend + 'static>(backend: Arc<B>, session: Session, guard: LoginGuard) -> Self {
        let pins = PinStore::new(backend.clone());
        let boards = BoardStore::new(backend.clone());
        let connections = ConnectionStore::new(backend.clone());
        let invitations = InvitationStore::new(backend.clone());
        let businesses = BusinessStore::new(backend.clone());
        let coordinator = Coordinator::new(
            session.clone(),
            connections.clone(),
            invitations.clone(),
            boards.clone(),
        );

        Self {
            session,
            auth: backend,
            pins,
            boards,
            connections,
            invitations,
            businesses,
            coordinator,
            guard,
        }
    }

    /// Build against the REST backend with a file-backed login guard.
    pub fn from_config(config: &Config, session: Session) -> GatewayResult<Self> {
        let gateway = HttpGateway::new(&config.api, session.clone())?;
        let storage = FileAttemptStorage::new(config.attempt_record_path());
        let guard = LoginGuard::load(
            Arc::new(storage),
            Arc::new(SystemClock),
            GuardPolicy::from(&config.login_guard),
        );
        tracing::debug!(base_url = %config.api.base_url, "Client configured");
        Ok(Self::new(Arc::new(gateway), session, guard))
    }

    /// Log in through the guard. On success the session is signed in.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, LoginError> {
        self.guard
            .login(self.auth.as_ref(), &self.session, request)
            .await
    }

    /// Create an account. When the backend answers with a token the new
    /// user is signed in straight away.
    ///
    /// Registration does not go through the login guard.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, StoreError> {
        request
            .validate()
            .map_err(|message| StoreError::Invalid { message })?;
        let response = self.auth.register(request).await.map_err(|e| {
            tracing::warn!(error = %e, "Registration failed");
            StoreError::from_gateway(e, "Registration failed")
        })?;

        match SessionInfo::from_auth(&response) {
            Some(info) => self.session.sign_in(info),
            None => tracing::debug!("Registration response carried no session"),
        }
        Ok(response)
    }

    /// Set a new password for the account matching email and mobile number.
    pub async fn reset_password(&self, request: &PasswordResetRequest) -> Result<AuthResponse, StoreError> {
        request
            .validate()
            .map_err(|message| StoreError::Invalid { message })?;
        self.auth.reset_password(request).await.map_err(|e| {
            tracing::warn!(error = %e, "Password reset failed");
            StoreError::from_gateway(e, "Failed to reset password")
        })
    }

    /// Public profile of `user_id`. Not cached.
    pub async fn user_profile(&self, user_id: EntityId) -> Result<UserProfile, StoreError> {
        self.auth
            .get_user(user_id)
            .await
            .map_err(|e| StoreError::from_gateway(e, "Failed to fetch user profile"))
    }

    /// End the session and drop every cached entity.
    pub fn logout(&self) {
        self.session.teardown();
        self.pins.cache().clear();
        self.boards.cache().clear();
        self.connections.clear();
        self.invitations.cache().clear();
        self.businesses.cache().clear();
    }

    pub fn current_user_id(&self) -> Option<EntityId> {
        self.session.user_id()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn auth(&self) -> &dyn AuthApi {
        self.auth.as_ref()
    }

    pub fn pins(&self) -> &PinStore {
        &self.pins
    }

    pub fn boards(&self) -> &BoardStore {
        &self.boards
    }

    pub fn connections(&self) -> &ConnectionStore {
        &self.connections
    }

    pub fn invitations(&self) -> &InvitationStore {
        &self.invitations
    }

    pub fn businesses(&self) -> &BusinessStore {
        &self.businesses
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn guard(&self) -> &LoginGuard {
        &self.guard
    }
}

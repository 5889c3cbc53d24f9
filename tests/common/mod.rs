//! Shared test utilities and fake backends.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use pinclient::config::SecureString;
use pinclient::gateway::{
    AuthApi, BoardApi, BoardScope, BusinessApi, ConnectionApi, ConnectionScope, GatewayError,
    GatewayResult, InvitationApi, PinApi, PinScope, Session, SessionInfo,
};
use pinclient::guard::{GuardPolicy, LoginGuard, ManualClock, MemoryAttemptStorage};
use pinclient::model::{
    AuthResponse, Board, BoardRequest, BoardType, BusinessProfile, BusinessProfileRequest,
    Connection, EntityId, Invitation, InvitationRequest, InvitationResponse, InvitationStatus,
    InvitationType, LoginRequest, PasswordResetRequest, Pin, PinRequest, RegisterRequest,
    UserProfile,
};
use pinclient::Client;
use tokio::sync::Notify;

pub const ACTING_USER: EntityId = 7;
pub const EMAIL: &str = "ann@example.com";
pub const PASSWORD: &str = "correct horse";
pub const MOBILE: &str = "555-0100";
pub const TAKEN_EMAIL: &str = "taken@example.com";

/// In-memory backend serving every entity, with call counters, queued
/// failures and optional gates that hold a call until released.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
    gates: Mutex<HashMap<&'static str, Arc<Notify>>>,
}

#[derive(Default)]
struct FakeState {
    pins: Vec<Pin>,
    boards: Vec<Board>,
    edges: Vec<Connection>,
    invitations: Vec<Invitation>,
    profiles: Vec<BusinessProfile>,
    next_id: EntityId,
    calls: Vec<&'static str>,
    failures: HashMap<&'static str, VecDeque<GatewayError>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        let backend = Self::default();
        backend.state.lock().next_id = 1000;
        Arc::new(backend)
    }

    /// Make the next call to `op` fail with `err`.
    pub fn fail_next(&self, op: &'static str, err: GatewayError) {
        self.state
            .lock()
            .failures
            .entry(op)
            .or_default()
            .push_back(err);
    }

    /// Hold every call to `op` until the returned handle is notified.
    pub fn gate(&self, op: &'static str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().insert(op, notify.clone());
        notify
    }

    pub fn calls(&self, op: &str) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == op).count()
    }

    pub fn seed_pins(&self, pins: Vec<Pin>) {
        self.state.lock().pins = pins;
    }

    pub fn seed_boards(&self, boards: Vec<Board>) {
        self.state.lock().boards = boards;
    }

    pub fn seed_edges(&self, edges: Vec<Connection>) {
        self.state.lock().edges = edges;
    }

    pub fn seed_invitations(&self, invitations: Vec<Invitation>) {
        self.state.lock().invitations = invitations;
    }

    pub fn seed_profiles(&self, profiles: Vec<BusinessProfile>) {
        self.state.lock().profiles = profiles;
    }

    pub fn board(&self, id: EntityId) -> Option<Board> {
        self.state.lock().boards.iter().find(|b| b.id == id).cloned()
    }

    async fn enter(&self, op: &'static str) -> GatewayResult<()> {
        let gate = self.gates.lock().get(op).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let mut state = self.state.lock();
        state.calls.push(op);
        match state.failures.get_mut(op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> EntityId {
        let mut state = self.state.lock();
        state.next_id += 1;
        state.next_id
    }
}

fn not_found(what: &str) -> GatewayError {
    GatewayError::remote(404, format!("{} not found", what))
}

#[async_trait]
impl PinApi for FakeBackend {
    async fn list_pins(&self, scope: &PinScope) -> GatewayResult<Vec<Pin>> {
        self.enter("list_pins").await?;
        let pins = self.state.lock().pins.clone();
        Ok(match scope {
            PinScope::Public => pins,
            PinScope::ByUser(user) => pins.into_iter().filter(|p| p.owner_user_id == *user).collect(),
            PinScope::Search(keyword) => pins
                .into_iter()
                .filter(|p| p.title.to_lowercase().contains(&keyword.to_lowercase()))
                .collect(),
        })
    }

    async fn get_pin(&self, id: EntityId) -> GatewayResult<Pin> {
        self.enter("get_pin").await?;
        let state = self.state.lock();
        state.pins.iter().find(|p| p.id == id).cloned().ok_or_else(|| not_found("Pin"))
    }

    async fn create_pin(&self, request: &PinRequest) -> GatewayResult<Pin> {
        self.enter("create_pin").await?;
        let mut created = pin(self.next_id(), &request.title);
        created.image_url = request.image_url.clone();
        created.is_public = request.is_public;
        created.is_draft = request.is_draft;
        self.state.lock().pins.insert(0, created.clone());
        Ok(created)
    }

    async fn update_pin(&self, id: EntityId, request: &PinRequest) -> GatewayResult<Pin> {
        self.enter("update_pin").await?;
        let mut state = self.state.lock();
        let existing = state.pins.iter_mut().find(|p| p.id == id).ok_or_else(|| not_found("Pin"))?;
        existing.title = request.title.clone();
        existing.image_url = request.image_url.clone();
        Ok(existing.clone())
    }

    async fn delete_pin(&self, id: EntityId) -> GatewayResult<()> {
        self.enter("delete_pin").await?;
        self.state.lock().pins.retain(|p| p.id != id);
        Ok(())
    }
}

#[async_trait]
impl BoardApi for FakeBackend {
    async fn list_boards(&self, scope: &BoardScope) -> GatewayResult<Vec<Board>> {
        self.enter("list_boards").await?;
        let boards = self.state.lock().boards.clone();
        Ok(match scope {
            BoardScope::ByUser(user) => boards.into_iter().filter(|b| b.owner_user_id == *user).collect(),
            BoardScope::Search(keyword) => boards.into_iter().filter(|b| b.name.contains(keyword.as_str())).collect(),
        })
    }

    async fn get_board(&self, id: EntityId) -> GatewayResult<Board> {
        self.enter("get_board").await?;
        self.board(id).ok_or_else(|| not_found("Board"))
    }

    async fn create_board(&self, request: &BoardRequest) -> GatewayResult<Board> {
        self.enter("create_board").await?;
        let created = board(self.next_id(), &request.name);
        self.state.lock().boards.insert(0, created.clone());
        Ok(created)
    }

    async fn update_board(&self, id: EntityId, request: &BoardRequest) -> GatewayResult<Board> {
        self.enter("update_board").await?;
        let mut state = self.state.lock();
        let existing = state.boards.iter_mut().find(|b| b.id == id).ok_or_else(|| not_found("Board"))?;
        existing.name = request.name.clone();
        Ok(existing.clone())
    }

    async fn delete_board(&self, id: EntityId) -> GatewayResult<()> {
        self.enter("delete_board").await?;
        self.state.lock().boards.retain(|b| b.id != id);
        Ok(())
    }

    async fn add_pin_to_board(&self, board_id: EntityId, pin_id: EntityId) -> GatewayResult<Board> {
        self.enter("add_pin_to_board").await?;
        let mut state = self.state.lock();
        let saved = state.pins.iter().find(|p| p.id == pin_id).cloned().ok_or_else(|| not_found("Pin"))?;
        let target = state.boards.iter_mut().find(|b| b.id == board_id).ok_or_else(|| not_found("Board"))?;
        target.pins.get_or_insert_with(Vec::new).push(saved);
        target.pin_count += 1;
        Ok(target.clone())
    }
}

#[async_trait]
impl ConnectionApi for FakeBackend {
    async fn list_connections(&self, scope: ConnectionScope) -> GatewayResult<Vec<Connection>> {
        self.enter("list_connections").await?;
        let edges = self.state.lock().edges.clone();
        Ok(match scope {
            ConnectionScope::Followers(user) => edges.into_iter().filter(|e| e.following_id == user).collect(),
            ConnectionScope::Following(user) => edges.into_iter().filter(|e| e.follower_id == user).collect(),
        })
    }

    async fn follow(&self, user_id: EntityId) -> GatewayResult<Connection> {
        self.enter("follow").await?;
        let created = edge(self.next_id(), ACTING_USER, user_id);
        self.state.lock().edges.push(created.clone());
        Ok(created)
    }

    async fn unfollow(&self, user_id: EntityId) -> GatewayResult<()> {
        self.enter("unfollow").await?;
        self.state
            .lock()
            .edges
            .retain(|e| !(e.follower_id == ACTING_USER && e.following_id == user_id));
        Ok(())
    }
}

#[async_trait]
impl InvitationApi for FakeBackend {
    async fn list_invitations(&self, user_id: EntityId) -> GatewayResult<Vec<Invitation>> {
        self.enter("list_invitations").await?;
        let state = self.state.lock();
        Ok(state.invitations.iter().filter(|i| i.invitee_id == user_id).cloned().collect())
    }

    async fn create_invitation(&self, request: &InvitationRequest) -> GatewayResult<Invitation> {
        self.enter("create_invitation").await?;
        let mut created = invitation(self.next_id(), InvitationStatus::Pending);
        created.inviter_id = ACTING_USER;
        created.invitee_id = request.invitee_id;
        created.board_id = request.board_id;
        created.invitation_type = request.invitation_type;
        self.state.lock().invitations.push(created.clone());
        Ok(created)
    }

    async fn respond_to_invitation(
        &self,
        id: EntityId,
        response: InvitationResponse,
    ) -> GatewayResult<Invitation> {
        self.enter("respond_to_invitation").await?;
        let mut state = self.state.lock();
        let target = state.invitations.iter_mut().find(|i| i.id == id).ok_or_else(|| not_found("Invitation"))?;
        target.status = match response {
            InvitationResponse::Accept => InvitationStatus::Accepted,
            InvitationResponse::Decline => InvitationStatus::Declined,
        };
        Ok(target.clone())
    }
}

#[async_trait]
impl BusinessApi for FakeBackend {
    async fn list_profiles(&self) -> GatewayResult<Vec<BusinessProfile>> {
        self.enter("list_profiles").await?;
        Ok(self.state.lock().profiles.clone())
    }

    async fn get_profile(&self, id: EntityId) -> GatewayResult<BusinessProfile> {
        self.enter("get_profile").await?;
        let state = self.state.lock();
        state.profiles.iter().find(|p| p.id == id).cloned().ok_or_else(|| not_found("Profile"))
    }

    async fn create_profile(&self, request: &BusinessProfileRequest) -> GatewayResult<BusinessProfile> {
        self.enter("create_profile").await?;
        let created = profile(self.next_id(), &request.business_name);
        self.state.lock().profiles.insert(0, created.clone());
        Ok(created)
    }
}

#[async_trait]
impl AuthApi for FakeBackend {
    async fn login(&self, request: &LoginRequest) -> GatewayResult<AuthResponse> {
        self.enter("login").await?;
        if request.email != EMAIL || request.password.expose() != PASSWORD {
            return Err(GatewayError::remote(401, "Invalid credentials"));
        }
        Ok(AuthResponse {
            token: Some("token-123".to_string()),
            user_id: Some(ACTING_USER),
            email: Some(EMAIL.to_string()),
            username: Some("ann".to_string()),
            message: None,
        })
    }

    async fn register(&self, request: &RegisterRequest) -> GatewayResult<AuthResponse> {
        self.enter("register").await?;
        if request.email == TAKEN_EMAIL {
            return Err(GatewayError::remote(409, "Email already registered"));
        }
        Ok(AuthResponse {
            token: Some("token-new".to_string()),
            user_id: Some(self.next_id()),
            email: Some(request.email.clone()),
            username: Some(request.username.clone()),
            message: Some("Registration successful".to_string()),
        })
    }

    async fn reset_password(&self, request: &PasswordResetRequest) -> GatewayResult<AuthResponse> {
        self.enter("reset_password").await?;
        if request.email != EMAIL || request.mobile_number != MOBILE {
            return Err(GatewayError::remote(400, "Unknown account"));
        }
        Ok(AuthResponse {
            token: None,
            user_id: None,
            email: Some(EMAIL.to_string()),
            username: None,
            message: Some("Password reset successful".to_string()),
        })
    }

    async fn get_user(&self, user_id: EntityId) -> GatewayResult<UserProfile> {
        self.enter("get_user").await?;
        Ok(UserProfile {
            id: user_id,
            email: format!("user{}@example.com", user_id),
            username: format!("user{}", user_id),
            first_name: None,
            last_name: None,
            bio: None,
            account_type: "PERSONAL".to_string(),
        })
    }
}

// -- Fixtures -----------------------------------------------------------------

pub fn pin(id: EntityId, title: &str) -> Pin {
    Pin {
        id,
        title: title.to_string(),
        description: None,
        image_url: format!("https://img.example.com/{}.png", id),
        link: None,
        owner_user_id: ACTING_USER,
        board_id: None,
        is_public: true,
        is_draft: false,
        is_sponsored: false,
        sponsor_name: None,
        promotion_link: None,
        campaign_id: None,
        saves_count: 0,
        comments_count: 0,
        keywords: Vec::new(),
        parent_pin_id: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn board(id: EntityId, name: &str) -> Board {
    Board {
        id,
        name: name.to_string(),
        description: None,
        owner_user_id: ACTING_USER,
        is_private: false,
        collaborator_ids: Vec::new(),
        cover_image: None,
        board_type: BoardType::Default,
        pin_count: 0,
        pins: Some(Vec::new()),
        created_at: None,
        updated_at: None,
    }
}

pub fn edge(id: EntityId, follower: EntityId, following: EntityId) -> Connection {
    Connection {
        id,
        follower_id: follower,
        following_id: following,
        created_at: None,
    }
}

pub fn invitation(id: EntityId, status: InvitationStatus) -> Invitation {
    Invitation {
        id,
        inviter_id: 99,
        invitee_id: ACTING_USER,
        board_id: Some(1),
        invitation_type: InvitationType::BoardCollaboration,
        status,
        created_at: None,
        updated_at: None,
    }
}

pub fn profile(id: EntityId, name: &str) -> BusinessProfile {
    BusinessProfile {
        id,
        user_id: ACTING_USER,
        business_name: name.to_string(),
        description: None,
        website: None,
        logo: None,
        category: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn register_request(email: &str, password: &str, confirm: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        username: "bo".to_string(),
        password: SecureString::new(password.to_string()),
        confirm_password: SecureString::new(confirm.to_string()),
        first_name: "Bo".to_string(),
        last_name: "Diaz".to_string(),
        mobile_number: Some(MOBILE.to_string()),
    }
}

/// A session signed in as [`ACTING_USER`].
pub fn signed_in_session() -> Session {
    let session = Session::new();
    let info = SessionInfo::from_auth(&AuthResponse {
        token: Some("token-123".to_string()),
        user_id: Some(ACTING_USER),
        email: Some(EMAIL.to_string()),
        username: Some("ann".to_string()),
        message: None,
    })
    .expect("fixture carries token and id");
    session.sign_in(info);
    session
}

/// Buffer collecting formatted log lines for the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    /// Route every event at DEBUG and above into this buffer until the
    /// guard is dropped.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Lines logged at `level` ("WARN", "DEBUG", ...) containing `needle`.
    pub fn count(&self, level: &str, needle: &str) -> usize {
        String::from_utf8_lossy(&self.0.lock())
            .lines()
            .filter(|line| line.contains(level) && line.contains(needle))
            .count()
    }
}

/// A guard on a manual clock and in-memory storage.
pub fn memory_guard() -> (LoginGuard, ManualClock, MemoryAttemptStorage) {
    let clock = ManualClock::new(1_700_000_000_000);
    let storage = MemoryAttemptStorage::new();
    let guard = LoginGuard::load(
        Arc::new(storage.clone()),
        Arc::new(clock.clone()),
        GuardPolicy::default(),
    );
    (guard, clock, storage)
}

/// A client over a fresh fake backend, signed in as [`ACTING_USER`].
pub fn fake_client() -> (Client, Arc<FakeBackend>) {
    let backend = FakeBackend::new();
    let (guard, _, _) = memory_guard();
    let client = Client::new(backend.clone(), signed_in_session(), guard);
    (client, backend)
}

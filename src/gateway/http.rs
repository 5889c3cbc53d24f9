use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{bearer_header, ApiConfig};
use crate::gateway::{
    AuthApi, BoardApi, BoardScope, BusinessApi, ConnectionApi, ConnectionScope, GatewayError,
    GatewayResult, InvitationApi, PinApi, PinScope, Session,
};
use crate::model::{
    AuthResponse, Board, BoardRequest, BusinessProfile, BusinessProfileRequest, Connection,
    EntityId, Invitation, InvitationRequest, InvitationResponse, LoginRequest,
    PasswordResetRequest, Pin, PinRequest, RegisterRequest, UserProfile,
};

const USER_ID_HEADER: &str = "X-User-Id";

/// reqwest-backed gateway for the REST backend.
///
/// Attaches the bearer credential and caller identity from the shared
/// [`Session`] to every call, and tears the session down on any 401.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    session: Session,
}

impl HttpGateway {
    pub fn new(config: &ApiConfig, session: Session) -> GatewayResult<Self> {
        let mut builder = Client::builder().connect_timeout(config.connect_timeout());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| GatewayError::Transport {
            message: format!("Failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> GatewayResult<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path)).map_err(|e| {
            GatewayError::Transport {
                message: format!("Invalid URL for '{}': {}", path, e),
            }
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn request(&self, method: Method, path: &str, query: &[(&str, &str)]) -> GatewayResult<RequestBuilder> {
        let url = self.url(path, query)?;
        let mut builder = self.client.request(method, url);

        if let Some(info) = self.session.current() {
            if let Some(value) = bearer_header(&info.token) {
                builder = builder.header(reqwest::header::AUTHORIZATION, value);
            }
            builder = builder.header(USER_ID_HEADER, info.user_id.to_string());
        }

        Ok(builder)
    }

    /// Send and classify the response. Non-2xx becomes `GatewayError::Remote`.
    async fn execute(&self, builder: RequestBuilder) -> GatewayResult<Response> {
        let response = builder.send().await.map_err(|e| GatewayError::Transport {
            message: e.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status.as_u16() == 401 {
            tracing::warn!(url = %response.url(), "Backend rejected credentials, ending session");
            self.session.teardown();
        }

        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Remote {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> GatewayResult<T> {
        let response = self.execute(builder).await?;
        response.json::<T>().await.map_err(|e| GatewayError::Decode {
            message: e.to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> GatewayResult<T> {
        self.json(self.request(Method::GET, path, query)?).await
    }

    async fn send_json<T, B>(&self, method: Method, path: &str, body: &B) -> GatewayResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        self.json(self.request(method, path, &[])?.json(body)).await
    }

    async fn delete(&self, path: &str) -> GatewayResult<()> {
        self.execute(self.request(Method::DELETE, path, &[])?).await?;
        Ok(())
    }
}

/// Extract the human-readable message from an error body, if any.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .filter(|message| !message.trim().is_empty())
        .map(str::to_string)
}

#[async_trait]
impl PinApi for HttpGateway {
    async fn list_pins(&self, scope: &PinScope) -> GatewayResult<Vec<Pin>> {
        match scope {
            PinScope::Public => self.get("/content/pins/public", &[]).await,
            PinScope::ByUser(user_id) => {
                self.get(&format!("/content/pins/user/{}", user_id), &[]).await
            }
            PinScope::Search(keyword) => {
                self.get("/content/pins/search", &[("keyword", keyword.as_str())])
                    .await
            }
        }
    }

    async fn get_pin(&self, id: EntityId) -> GatewayResult<Pin> {
        self.get(&format!("/content/pins/{}", id), &[]).await
    }

    async fn create_pin(&self, request: &PinRequest) -> GatewayResult<Pin> {
        self.send_json(Method::POST, "/content/pins", request).await
    }

    async fn update_pin(&self, id: EntityId, request: &PinRequest) -> GatewayResult<Pin> {
        self.send_json(Method::PUT, &format!("/content/pins/{}", id), request)
            .await
    }

    async fn delete_pin(&self, id: EntityId) -> GatewayResult<()> {
        self.delete(&format!("/content/pins/{}", id)).await
    }
}

#[async_trait]
impl BoardApi for HttpGateway {
    async fn list_boards(&self, scope: &BoardScope) -> GatewayResult<Vec<Board>> {
        match scope {
            BoardScope::ByUser(user_id) => {
                self.get(&format!("/content/boards/user/{}", user_id), &[])
                    .await
            }
            BoardScope::Search(keyword) => {
                self.get("/content/boards/search", &[("keyword", keyword.as_str())])
                    .await
            }
        }
    }

    async fn get_board(&self, id: EntityId) -> GatewayResult<Board> {
        self.get(&format!("/content/boards/{}", id), &[]).await
    }

    async fn create_board(&self, request: &BoardRequest) -> GatewayResult<Board> {
        self.send_json(Method::POST, "/content/boards", request).await
    }

    async fn update_board(&self, id: EntityId, request: &BoardRequest) -> GatewayResult<Board> {
        self.send_json(Method::PUT, &format!("/content/boards/{}", id), request)
            .await
    }

    async fn delete_board(&self, id: EntityId) -> GatewayResult<()> {
        self.delete(&format!("/content/boards/{}", id)).await
    }

    async fn add_pin_to_board(&self, board_id: EntityId, pin_id: EntityId) -> GatewayResult<Board> {
        let path = format!("/content/boards/{}/pins/{}", board_id, pin_id);
        self.json(self.request(Method::POST, &path, &[])?).await
    }
}

#[async_trait]
impl ConnectionApi for HttpGateway {
    async fn list_connections(&self, scope: ConnectionScope) -> GatewayResult<Vec<Connection>> {
        let path = match scope {
            ConnectionScope::Followers(user_id) => {
                format!("/collaboration/connections/followers/{}", user_id)
            }
            ConnectionScope::Following(user_id) => {
                format!("/collaboration/connections/following/{}", user_id)
            }
        };
        self.get(&path, &[]).await
    }

    async fn follow(&self, user_id: EntityId) -> GatewayResult<Connection> {
        let path = format!("/collaboration/connections/follow/{}", user_id);
        self.json(self.request(Method::POST, &path, &[])?).await
    }

    async fn unfollow(&self, user_id: EntityId) -> GatewayResult<()> {
        self.delete(&format!("/collaboration/connections/unfollow/{}", user_id))
            .await
    }
}

#[async_trait]
impl InvitationApi for HttpGateway {
    async fn list_invitations(&self, user_id: EntityId) -> GatewayResult<Vec<Invitation>> {
        self.get(&format!("/collaboration/invitations/user/{}", user_id), &[])
            .await
    }

    async fn create_invitation(&self, request: &InvitationRequest) -> GatewayResult<Invitation> {
        self.send_json(Method::POST, "/collaboration/invitations", request)
            .await
    }

    async fn respond_to_invitation(
        &self,
        id: EntityId,
        response: InvitationResponse,
    ) -> GatewayResult<Invitation> {
        let path = format!("/collaboration/invitations/{}/respond", id);
        let builder = self.request(Method::PUT, &path, &[("response", response.as_str())])?;
        self.json(builder).await
    }
}

#[async_trait]
impl BusinessApi for HttpGateway {
    async fn list_profiles(&self) -> GatewayResult<Vec<BusinessProfile>> {
        self.get("/business/profiles", &[]).await
    }

    async fn get_profile(&self, id: EntityId) -> GatewayResult<BusinessProfile> {
        self.get(&format!("/business/profiles/{}", id), &[]).await
    }

    async fn create_profile(&self, request: &BusinessProfileRequest) -> GatewayResult<BusinessProfile> {
        self.send_json(Method::POST, "/business/profiles", request).await
    }
}

#[async_trait]
impl AuthApi for HttpGateway {
    async fn login(&self, request: &LoginRequest) -> GatewayResult<AuthResponse> {
        self.send_json(Method::POST, "/auth/login", request).await
    }

    async fn register(&self, request: &RegisterRequest) -> GatewayResult<AuthResponse> {
        self.send_json(Method::POST, "/auth/register", request).await
    }

    async fn reset_password(&self, request: &PasswordResetRequest) -> GatewayResult<AuthResponse> {
        self.send_json(Method::POST, "/auth/reset-password", request)
            .await
    }

    async fn get_user(&self, user_id: EntityId) -> GatewayResult<UserProfile> {
        self.get(&format!("/auth/profile/{}", user_id), &[]).await
    }
}

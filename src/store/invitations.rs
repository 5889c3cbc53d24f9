use std::sync::Arc;

use crate::gateway::InvitationApi;
use crate::model::{EntityId, Invitation, InvitationRequest, InvitationResponse};
use crate::store::{OnError, ResourceStore, StoreError, StoreSnapshot};

/// The signed-in user's inbox of pending invitations.
#[derive(Clone)]
pub struct InvitationStore {
    api: Arc<dyn InvitationApi>,
    cache: ResourceStore<Invitation>,
}

impl InvitationStore {
    pub fn new(api: Arc<dyn InvitationApi>) -> Self {
        Self {
            api,
            cache: ResourceStore::new("invitations"),
        }
    }

    /// Load the inbox of `user_id`, keeping only pending invitations.
    pub async fn fetch_invitations(&self, user_id: EntityId) -> Result<Vec<Invitation>, StoreError> {
        self.cache
            .fetch_collection("Failed to fetch invitations", async {
                let all = self.api.list_invitations(user_id).await?;
                Ok(all.into_iter().filter(Invitation::is_pending).collect())
            })
            .await
    }

    /// Send an invitation. The inbox is the invitee's, so nothing is cached.
    pub async fn send_invitation(&self, request: &InvitationRequest) -> Result<Invitation, StoreError> {
        self.cache.check(request)?;
        self.cache
            .execute(
                "Failed to send invitation",
                OnError::Record,
                self.api.create_invitation(request),
                |_, _| {},
            )
            .await
    }

    /// Answer an invitation and drop it from the inbox once confirmed.
    pub async fn respond(
        &self,
        invitation_id: EntityId,
        response: InvitationResponse,
    ) -> Result<Invitation, StoreError> {
        self.cache
            .execute(
                "Failed to respond to invitation",
                OnError::Record,
                self.api.respond_to_invitation(invitation_id, response),
                move |state, _: &Invitation| state.remove(invitation_id),
            )
            .await
    }

    pub fn clear_error(&self) {
        self.cache.clear_error();
    }

    pub fn cache(&self) -> &ResourceStore<Invitation> {
        &self.cache
    }

    pub fn snapshot(&self) -> StoreSnapshot<Invitation> {
        self.cache.snapshot()
    }
}

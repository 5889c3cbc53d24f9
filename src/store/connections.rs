use std::sync::Arc;

use parking_lot::RwLock;

use crate::gateway::{ConnectionApi, ConnectionScope, GatewayResult};
use crate::model::{Connection, EntityId};
use crate::store::{OnError, ResourceStore, StoreError};

/// Follow graph around a user, kept as two independent slices.
///
/// Neither slice ever holds two edges with the same (follower, following)
/// pair.
#[derive(Clone)]
pub struct ConnectionStore {
    api: Arc<dyn ConnectionApi>,
    followers: ResourceStore<Connection>,
    following: ResourceStore<Connection>,
    /// User whose follows the `following` slice currently lists.
    following_of: Arc<RwLock<Option<EntityId>>>,
}

impl ConnectionStore {
    pub fn new(api: Arc<dyn ConnectionApi>) -> Self {
        Self {
            api,
            followers: ResourceStore::new("followers"),
            following: ResourceStore::new("following"),
            following_of: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn fetch_followers(&self, user_id: EntityId) -> Result<Vec<Connection>, StoreError> {
        self.followers
            .fetch_collection(
                "Failed to fetch followers",
                self.list(ConnectionScope::Followers(user_id)),
            )
            .await
    }

    pub async fn fetch_following(&self, user_id: EntityId) -> Result<Vec<Connection>, StoreError> {
        self.load_following(user_id, "Failed to fetch following", OnError::Record)
            .await
    }

    /// Reload the `following` slice without touching its error field.
    pub(crate) async fn refresh_following(&self, user_id: EntityId) -> Result<Vec<Connection>, StoreError> {
        self.load_following(user_id, "Failed to fetch my following list", OnError::LogOnly)
            .await
    }

    async fn load_following(
        &self,
        user_id: EntityId,
        fallback: &str,
        on_error: OnError,
    ) -> Result<Vec<Connection>, StoreError> {
        let owner = Arc::clone(&self.following_of);
        self.following
            .execute(
                fallback,
                on_error,
                self.list(ConnectionScope::Following(user_id)),
                move |state, items: &Vec<Connection>| {
                    state.items = items.clone();
                    *owner.write() = Some(user_id);
                },
            )
            .await
    }

    async fn list(&self, scope: ConnectionScope) -> GatewayResult<Vec<Connection>> {
        let fetched = self.api.list_connections(scope).await?;
        Ok(dedup_pairs(fetched))
    }

    /// Follow `user_id`. The confirmed edge is recorded in `following`
    /// only when that slice lists the follower's own follows.
    pub async fn follow(&self, user_id: EntityId) -> Result<Connection, StoreError> {
        let owner = Arc::clone(&self.following_of);
        self.following
            .execute(
                "Failed to follow user",
                OnError::Record,
                self.api.follow(user_id),
                move |state, edge: &Connection| {
                    if *owner.read() != Some(edge.follower_id) {
                        return;
                    }
                    if !state.items.iter().any(|c| c.same_pair(edge)) {
                        state.items.insert(0, edge.clone());
                    }
                },
            )
            .await
    }

    /// Unfollow `user_id` and drop every edge to it from `following`.
    pub async fn unfollow(&self, user_id: EntityId) -> Result<(), StoreError> {
        self.following
            .execute(
                "Failed to unfollow user",
                OnError::Record,
                self.api.unfollow(user_id),
                move |state, _: &()| state.items.retain(|c| c.following_id != user_id),
            )
            .await
    }

    pub fn is_following(&self, user_id: EntityId) -> bool {
        self.following
            .items()
            .iter()
            .any(|c| c.following_id == user_id)
    }

    pub fn clear_error(&self) {
        self.followers.clear_error();
        self.following.clear_error();
    }

    pub fn followers(&self) -> &ResourceStore<Connection> {
        &self.followers
    }

    pub fn following(&self) -> &ResourceStore<Connection> {
        &self.following
    }

    pub fn is_busy(&self) -> bool {
        self.followers.is_busy() || self.following.is_busy()
    }

    pub(crate) fn clear(&self) {
        self.followers.clear();
        self.following.clear();
        *self.following_of.write() = None;
    }
}

/// Keep the first edge of each (follower, following) pair.
fn dedup_pairs(edges: Vec<Connection>) -> Vec<Connection> {
    let mut unique: Vec<Connection> = Vec::with_capacity(edges.len());
    for edge in edges {
        if !unique.iter().any(|kept| kept.same_pair(&edge)) {
            unique.push(edge);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(id: EntityId, follower: EntityId, following: EntityId) -> Connection {
        Connection {
            id,
            follower_id: follower,
            following_id: following,
            created_at: None,
        }
    }

    #[test]
    fn test_dedup_keeps_first_of_each_pair() {
        let edges = vec![edge(1, 7, 42), edge(2, 7, 43), edge(3, 7, 42)];
        let ids: Vec<_> = dedup_pairs(edges).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}

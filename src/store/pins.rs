use std::sync::Arc;

use crate::gateway::{PinApi, PinScope};
use crate::model::{EntityId, Pin, PinRequest};
use crate::store::{ResourceStore, StoreError, StoreSnapshot};

/// Cached pins for the current view.
///
/// Every pin entering the cache is normalized (sponsored pins are public
/// and never drafts), and the public feed never contains drafts.
#[derive(Clone)]
pub struct PinStore {
    api: Arc<dyn PinApi>,
    cache: ResourceStore<Pin>,
}

impl PinStore {
    pub fn new(api: Arc<dyn PinApi>) -> Self {
        Self {
            api,
            cache: ResourceStore::new("pins"),
        }
    }

    pub async fn fetch_public_pins(&self) -> Result<Vec<Pin>, StoreError> {
        self.fetch(PinScope::Public, "Failed to fetch public pins").await
    }

    pub async fn fetch_user_pins(&self, user_id: EntityId) -> Result<Vec<Pin>, StoreError> {
        self.fetch(PinScope::ByUser(user_id), "Failed to fetch user pins")
            .await
    }

    pub async fn search_pins(&self, keyword: &str) -> Result<Vec<Pin>, StoreError> {
        self.fetch(PinScope::Search(keyword.to_string()), "Failed to search pins")
            .await
    }

    async fn fetch(&self, scope: PinScope, fallback: &str) -> Result<Vec<Pin>, StoreError> {
        self.cache
            .fetch_collection(fallback, async {
                let pins = self.api.list_pins(&scope).await?;
                let pins = pins.into_iter().map(Pin::normalized);
                Ok(match scope {
                    PinScope::Public => pins.filter(Pin::is_publicly_listable).collect(),
                    _ => pins.collect(),
                })
            })
            .await
    }

    pub async fn fetch_pin_by_id(&self, id: EntityId) -> Result<Pin, StoreError> {
        self.cache
            .fetch_one("Failed to fetch pin details", async {
                self.api.get_pin(id).await.map(Pin::normalized)
            })
            .await
    }

    pub async fn create_pin(&self, request: &PinRequest) -> Result<Pin, StoreError> {
        self.cache.check(request)?;
        self.cache
            .create("Failed to create pin", async {
                self.api.create_pin(request).await.map(Pin::normalized)
            })
            .await
    }

    pub async fn update_pin(&self, id: EntityId, request: &PinRequest) -> Result<Pin, StoreError> {
        self.cache.check(request)?;
        self.cache
            .update(id, "Failed to update pin", async {
                self.api.update_pin(id, request).await.map(Pin::normalized)
            })
            .await
    }

    pub async fn delete_pin(&self, id: EntityId) -> Result<(), StoreError> {
        self.cache
            .delete(id, "Failed to delete pin", self.api.delete_pin(id))
            .await
    }

    pub fn clear_error(&self) {
        self.cache.clear_error();
    }

    pub fn cache(&self) -> &ResourceStore<Pin> {
        &self.cache
    }

    pub fn snapshot(&self) -> StoreSnapshot<Pin> {
        self.cache.snapshot()
    }
}

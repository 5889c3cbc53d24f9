use std::sync::Arc;

use crate::gateway::BusinessApi;
use crate::model::{BusinessProfile, BusinessProfileRequest, EntityId};
use crate::store::{ResourceStore, StoreError, StoreSnapshot};

#[derive(Clone)]
pub struct BusinessStore {
    api: Arc<dyn BusinessApi>,
    cache: ResourceStore<BusinessProfile>,
}

impl BusinessStore {
    pub fn new(api: Arc<dyn BusinessApi>) -> Self {
        Self {
            api,
            cache: ResourceStore::new("business_profiles"),
        }
    }

    pub async fn fetch_profiles(&self) -> Result<Vec<BusinessProfile>, StoreError> {
        self.cache
            .fetch_collection("Failed to fetch business profiles", self.api.list_profiles())
            .await
    }

    pub async fn fetch_profile(&self, id: EntityId) -> Result<BusinessProfile, StoreError> {
        self.cache
            .fetch_one("Failed to fetch business profile data", self.api.get_profile(id))
            .await
    }

    pub async fn create_profile(&self, request: &BusinessProfileRequest) -> Result<BusinessProfile, StoreError> {
        self.cache.check(request)?;
        self.cache
            .create("Failed to create business profile", self.api.create_profile(request))
            .await
    }

    pub fn clear_error(&self) {
        self.cache.clear_error();
    }

    pub fn cache(&self) -> &ResourceStore<BusinessProfile> {
        &self.cache
    }

    pub fn snapshot(&self) -> StoreSnapshot<BusinessProfile> {
        self.cache.snapshot()
    }
}

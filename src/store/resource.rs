//! Generic cache + CRUD unit shared by every entity store.
//!
//! The cache is only written after the backend confirms a call
//! (optimistic-after-confirm). A failed call leaves items and selection
//! exactly as they were, records the error message and releases the busy
//! slot. Overlapping calls are not ordered: each applies its effect when
//! its own response arrives.

use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::gateway::GatewayResult;
use crate::model::{Entity, EntityId, Validate};
use crate::store::StoreError;

/// Point-in-time copy of a store's state.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot<T> {
    pub items: Vec<T>,
    pub selected: Option<T>,
    pub busy: bool,
    pub error: Option<String>,
}

pub(crate) struct StoreState<T> {
    pub(crate) items: Vec<T>,
    pub(crate) selected: Option<T>,
    in_flight: usize,
    error: Option<String>,
}

/// What to do with the error field when a call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OnError {
    /// Set the store's error field (user-initiated calls).
    Record,
    /// Only log (background refetches).
    LogOnly,
}

/// Handle to one named slice of cached state. Clones share the slice.
pub struct ResourceStore<T> {
    name: &'static str,
    state: Arc<RwLock<StoreState<T>>>,
}

impl<T> Clone for ResourceStore<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Entity> ResourceStore<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Arc::new(RwLock::new(StoreState {
                items: Vec::new(),
                selected: None,
                in_flight: 0,
                error: None,
            })),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Replace the cached list with the result of `call`.
    ///
    /// Not coalesced: with overlapping fetches the last response wins.
    pub async fn fetch_collection<F>(&self, fallback: &str, call: F) -> Result<Vec<T>, StoreError>
    where
        F: Future<Output = GatewayResult<Vec<T>>> + Send,
    {
        self.execute(fallback, OnError::Record, call, |state, items: &Vec<T>| {
            state.items = items.clone();
        })
        .await
    }

    /// Replace the selected entity with the result of `call`.
    pub async fn fetch_one<F>(&self, fallback: &str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = GatewayResult<T>> + Send,
    {
        self.execute(fallback, OnError::Record, call, |state, entity: &T| {
            state.selected = Some(entity.clone());
        })
        .await
    }

    /// Issue a create and prepend the confirmed entity.
    pub async fn create<F>(&self, fallback: &str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = GatewayResult<T>> + Send,
    {
        self.execute(fallback, OnError::Record, call, |state, entity: &T| {
            state.items.insert(0, entity.clone());
        })
        .await
    }

    /// Issue an update and replace the matching list element and selection.
    pub async fn update<F>(&self, id: EntityId, fallback: &str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = GatewayResult<T>> + Send,
    {
        self.execute(fallback, OnError::Record, call, move |state, entity: &T| {
            for item in state.items.iter_mut().filter(|item| item.id() == id) {
                *item = entity.clone();
            }
            if state.selected.as_ref().is_some_and(|s| s.id() == id) {
                state.selected = Some(entity.clone());
            }
        })
        .await
    }

    /// Issue a delete and evict the entity from list and selection.
    pub async fn delete<F>(&self, id: EntityId, fallback: &str, call: F) -> Result<(), StoreError>
    where
        F: Future<Output = GatewayResult<()>> + Send,
    {
        self.execute(fallback, OnError::Record, call, move |state, _: &()| {
            state.remove(id);
        })
        .await
    }

    /// Run `call` with the busy flag held; on success apply `effect` to the
    /// cache, on failure leave the cache alone.
    pub(crate) async fn execute<R, F, A>(
        &self,
        fallback: &str,
        on_error: OnError,
        call: F,
        effect: A,
    ) -> Result<R, StoreError>
    where
        F: Future<Output = GatewayResult<R>> + Send,
        A: FnOnce(&mut StoreState<T>, &R) + Send,
    {
        {
            let mut state = self.state.write();
            state.in_flight += 1;
            if on_error == OnError::Record {
                state.error = None;
            }
        }
        let busy = Arc::clone(&self.state);
        let _busy = scopeguard::guard((), move |_| {
            let mut state = busy.write();
            state.in_flight = state.in_flight.saturating_sub(1);
        });

        match call.await {
            Ok(value) => {
                let mut state = self.state.write();
                effect(&mut state, &value);
                tracing::debug!(store = self.name, items = state.items.len(), "Cache updated");
                Ok(value)
            }
            Err(err) => {
                let store_err = StoreError::from_gateway(err.clone(), fallback);
                match on_error {
                    OnError::Record => {
                        tracing::warn!(store = self.name, error = %err, "{}", fallback);
                        self.state.write().error = Some(store_err.message().to_string());
                    }
                    OnError::LogOnly => {
                        tracing::debug!(store = self.name, error = %err, "{}", fallback);
                    }
                }
                Err(store_err)
            }
        }
    }

    /// Validate a request locally; on failure record the error without
    /// touching the cache or the busy flag.
    pub fn check<R: Validate>(&self, request: &R) -> Result<(), StoreError> {
        request.validate().map_err(|message| {
            self.state.write().error = Some(message.clone());
            StoreError::Invalid { message }
        })
    }

    /// Clear the last error without touching data or the busy flag.
    pub fn clear_error(&self) {
        self.state.write().error = None;
    }

    /// Evict everything cached. The busy flag is left to in-flight calls.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.items.clear();
        state.selected = None;
        state.error = None;
    }

    pub fn items(&self) -> Vec<T> {
        self.state.read().items.clone()
    }

    pub fn selected(&self) -> Option<T> {
        self.state.read().selected.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state.read().in_flight > 0
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.state.read().items.iter().any(|item| item.id() == id)
    }

    pub fn snapshot(&self) -> StoreSnapshot<T> {
        let state = self.state.read();
        StoreSnapshot {
            items: state.items.clone(),
            selected: state.selected.clone(),
            busy: state.in_flight > 0,
            error: state.error.clone(),
        }
    }
}

impl<T: Entity> StoreState<T> {
    pub(crate) fn remove(&mut self, id: EntityId) {
        self.items.retain(|item| item.id() != id);
        if self.selected.as_ref().is_some_and(|s| s.id() == id) {
            self.selected = None;
        }
    }
}

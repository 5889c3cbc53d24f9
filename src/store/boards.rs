use std::sync::Arc;

use crate::gateway::{BoardApi, BoardScope};
use crate::model::{Board, BoardRequest, EntityId};
use crate::store::{OnError, ResourceStore, StoreError, StoreSnapshot};

#[derive(Clone)]
pub struct BoardStore {
    api: Arc<dyn BoardApi>,
    cache: ResourceStore<Board>,
}

impl BoardStore {
    pub fn new(api: Arc<dyn BoardApi>) -> Self {
        Self {
            api,
            cache: ResourceStore::new("boards"),
        }
    }

    pub async fn fetch_user_boards(&self, user_id: EntityId) -> Result<Vec<Board>, StoreError> {
        self.cache
            .fetch_collection(
                "Failed to fetch user boards",
                self.api.list_boards(&BoardScope::ByUser(user_id)),
            )
            .await
    }

    pub async fn search_boards(&self, keyword: &str) -> Result<Vec<Board>, StoreError> {
        let scope = BoardScope::Search(keyword.to_string());
        self.cache
            .fetch_collection("Failed to search boards", self.api.list_boards(&scope))
            .await
    }

    pub async fn fetch_board_by_id(&self, id: EntityId) -> Result<Board, StoreError> {
        let board = self
            .cache
            .fetch_one("Failed to fetch board details", self.api.get_board(id))
            .await?;
        if board.pin_count_diverges() {
            tracing::debug!(
                board_id = id,
                pin_count = board.pin_count,
                embedded = board.pins.as_ref().map_or(0, Vec::len),
                "Board pin count differs from embedded pins"
            );
        }
        Ok(board)
    }

    pub async fn create_board(&self, request: &BoardRequest) -> Result<Board, StoreError> {
        self.cache.check(request)?;
        self.cache
            .create("Failed to create board", self.api.create_board(request))
            .await
    }

    pub async fn update_board(&self, id: EntityId, request: &BoardRequest) -> Result<Board, StoreError> {
        self.cache.check(request)?;
        self.cache
            .update(id, "Failed to update board", self.api.update_board(id, request))
            .await
    }

    pub async fn delete_board(&self, id: EntityId) -> Result<(), StoreError> {
        self.cache
            .delete(id, "Failed to delete board", self.api.delete_board(id))
            .await
    }

    /// Save a pin to a board.
    ///
    /// The board cache is left as it was: the cached board (and its pin
    /// count) stays stale until it is fetched again.
    pub async fn add_pin_to_board(&self, board_id: EntityId, pin_id: EntityId) -> Result<Board, StoreError> {
        self.cache
            .execute(
                "Failed to save pin to board",
                OnError::Record,
                self.api.add_pin_to_board(board_id, pin_id),
                |_, _| {},
            )
            .await
    }

    pub fn clear_error(&self) {
        self.cache.clear_error();
    }

    pub fn cache(&self) -> &ResourceStore<Board> {
        &self.cache
    }

    pub fn snapshot(&self) -> StoreSnapshot<Board> {
        self.cache.snapshot()
    }
}

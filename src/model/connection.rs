use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Entity, EntityId};

/// A follow edge: `follower_id` follows `following_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: EntityId,
    pub follower_id: EntityId,
    pub following_id: EntityId,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Connection {
    /// Two edges with the same pair describe the same relationship.
    pub fn same_pair(&self, other: &Connection) -> bool {
        self.follower_id == other.follower_id && self.following_id == other.following_id
    }
}

impl Entity for Connection {
    fn id(&self) -> EntityId {
        self.id
    }
}

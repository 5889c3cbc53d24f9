use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{null_as_default, require_non_blank, Entity, EntityId, Pin, Validate};

/// Layout flavour of a board. Unknown or missing values read as `Default`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "Option<String>")]
pub enum BoardType {
    #[default]
    Default,
    Showcase,
}

impl From<Option<String>> for BoardType {
    fn from(value: Option<String>) -> Self {
        match value.as_deref().map(str::to_ascii_uppercase).as_deref() {
            Some("SHOWCASE") => BoardType::Showcase,
            _ => BoardType::Default,
        }
    }
}

/// A board as returned by the content service.
///
/// `pin_count` is server-authoritative; the embedded `pins` list may be
/// stale or absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "userId")]
    pub owner_user_id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_private: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub collaborator_ids: Vec<EntityId>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub board_type: BoardType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pin_count: u32,
    #[serde(default)]
    pub pins: Option<Vec<Pin>>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Board {
    pub fn is_collaborative(&self) -> bool {
        !self.collaborator_ids.is_empty()
    }

    /// True when the embedded list is present and disagrees with `pin_count`.
    pub fn pin_count_diverges(&self) -> bool {
        self.pins
            .as_ref()
            .is_some_and(|pins| pins.len() != self.pin_count as usize)
    }

    /// Membership as seen by this (possibly stale) copy of the board.
    pub fn contains_pin(&self, pin_id: EntityId) -> bool {
        self.pins
            .as_ref()
            .is_some_and(|pins| pins.iter().any(|p| p.id == pin_id))
    }
}

impl Entity for Board {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Payload for creating or updating a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_private: bool,
}

impl BoardRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            is_private: false,
        }
    }
}

impl Validate for BoardRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_blank(&self.name, "Please provide a valid board name")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_type_parsing() {
        assert_eq!(BoardType::from(Some("SHOWCASE".to_string())), BoardType::Showcase);
        assert_eq!(BoardType::from(Some("showcase".to_string())), BoardType::Showcase);
        assert_eq!(BoardType::from(Some("DEFAULT".to_string())), BoardType::Default);
        assert_eq!(BoardType::from(Some("gallery".to_string())), BoardType::Default);
        assert_eq!(BoardType::from(None), BoardType::Default);
    }

    #[test]
    fn test_divergent_pin_count_is_tolerated() {
        let json = r#"{"id": 4, "name": "Trips", "userId": 9, "isPrivate": null,
            "boardType": null, "pinCount": 3,
            "pins": [{"id": 1, "title": "a", "imageUrl": "u", "userId": 9}]}"#;
        let board: Board = serde_json::from_str(json).unwrap();

        assert_eq!(board.pin_count, 3);
        assert!(board.pin_count_diverges());
        assert!(board.contains_pin(1));
        assert!(!board.contains_pin(2));
        assert!(!board.is_private);
        assert_eq!(board.board_type, BoardType::Default);
    }

    #[test]
    fn test_missing_pin_list_never_diverges() {
        let json = r#"{"id": 4, "name": "Trips", "userId": 9, "pinCount": 12}"#;
        let board: Board = serde_json::from_str(json).unwrap();
        assert!(!board.pin_count_diverges());
        assert!(!board.contains_pin(1));
    }

    #[test]
    fn test_collaborative_flag() {
        let json = r#"{"id": 4, "name": "Shared", "userId": 9, "collaboratorIds": [10, 11]}"#;
        let board: Board = serde_json::from_str(json).unwrap();
        assert!(board.is_collaborative());
    }
}

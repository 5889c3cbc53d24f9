use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{default_true, null_as_default, null_as_true, require_non_blank, Entity, EntityId, Validate};

/// A pin as returned by the content service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(rename = "userId")]
    pub owner_user_id: EntityId,
    #[serde(default)]
    pub board_id: Option<EntityId>,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub is_public: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_draft: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_sponsored: bool,
    #[serde(default)]
    pub sponsor_name: Option<String>,
    #[serde(default)]
    pub promotion_link: Option<String>,
    #[serde(default)]
    pub campaign_id: Option<EntityId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub saves_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub parent_pin_id: Option<EntityId>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Pin {
    /// Sponsored pins are always public and never drafts.
    pub fn normalized(mut self) -> Self {
        if self.is_sponsored {
            self.is_public = true;
            self.is_draft = false;
        }
        self
    }

    /// Whether this pin may appear in a public listing.
    pub fn is_publicly_listable(&self) -> bool {
        self.is_public && !self.is_draft
    }
}

impl Entity for Pin {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Payload for creating or updating a pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_id: Option<EntityId>,
    pub is_public: bool,
    pub is_draft: bool,
}

impl PinRequest {
    pub fn new(title: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            image_url: image_url.into(),
            link: None,
            board_id: None,
            is_public: true,
            is_draft: false,
        }
    }
}

impl Validate for PinRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_blank(&self.title, "Please provide a valid title")?;
        require_non_blank(&self.image_url, "Please provide a valid image URL")
    }
}

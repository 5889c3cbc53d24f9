use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, Validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationType {
    BoardCollaboration,
    Connection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

impl InvitationStatus {
    /// Anything other than `Pending` is final.
    pub fn is_terminal(self) -> bool {
        !matches!(self, InvitationStatus::Pending)
    }
}

/// The invitee's answer to an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationResponse {
    Accept,
    Decline,
}

impl InvitationResponse {
    /// Value of the `response` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            InvitationResponse::Accept => "ACCEPTED",
            InvitationResponse::Decline => "DECLINED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "accept" | "accepted" => Some(InvitationResponse::Accept),
            "decline" | "declined" => Some(InvitationResponse::Decline),
            _ => None,
        }
    }
}

impl fmt::Display for InvitationResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: EntityId,
    pub inviter_id: EntityId,
    pub invitee_id: EntityId,
    #[serde(default)]
    pub board_id: Option<EntityId>,
    pub invitation_type: InvitationType,
    pub status: InvitationStatus,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Invitation {
    pub fn is_pending(&self) -> bool {
        !self.status.is_terminal()
    }
}

impl Entity for Invitation {
    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationRequest {
    pub invitee_id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_id: Option<EntityId>,
    pub invitation_type: InvitationType,
}

impl InvitationRequest {
    pub fn board(invitee_id: EntityId, board_id: EntityId) -> Self {
        Self {
            invitee_id,
            board_id: Some(board_id),
            invitation_type: InvitationType::BoardCollaboration,
        }
    }

    pub fn connection(invitee_id: EntityId) -> Self {
        Self {
            invitee_id,
            board_id: None,
            invitation_type: InvitationType::Connection,
        }
    }
}

impl Validate for InvitationRequest {
    fn validate(&self) -> Result<(), String> {
        if self.invitation_type == InvitationType::BoardCollaboration && self.board_id.is_none() {
            return Err("A board invitation needs a board".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminality() {
        assert!(!InvitationStatus::Pending.is_terminal());
        assert!(InvitationStatus::Accepted.is_terminal());
        assert!(InvitationStatus::Declined.is_terminal());
    }

    #[test]
    fn test_wire_format() {
        let json = r#"{"id": 5, "boardId": 2, "inviterId": 1, "inviteeId": 3,
            "invitationType": "BOARD_COLLABORATION", "status": "PENDING",
            "createdAt": "2024-02-01T08:00:00", "updatedAt": null}"#;
        let inv: Invitation = serde_json::from_str(json).unwrap();
        assert_eq!(inv.invitation_type, InvitationType::BoardCollaboration);
        assert!(inv.is_pending());
    }

    #[test]
    fn test_response_parsing() {
        assert_eq!(InvitationResponse::parse("accept"), Some(InvitationResponse::Accept));
        assert_eq!(InvitationResponse::parse("DECLINED"), Some(InvitationResponse::Decline));
        assert_eq!(InvitationResponse::parse("maybe"), None);
        assert_eq!(InvitationResponse::Accept.to_string(), "ACCEPTED");
    }

    #[test]
    fn test_board_invitation_requires_board() {
        let mut request = InvitationRequest::board(3, 2);
        assert!(request.validate().is_ok());
        request.board_id = None;
        assert!(request.validate().is_err());
        assert!(InvitationRequest::connection(3).validate().is_ok());
    }
}

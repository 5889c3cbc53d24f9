//! Cross-store reconciliation after relationship-affecting mutations.
//!
//! Stores never write into each other. Mutations that change the follow
//! graph, an inbox or a board's contents go through the [`Coordinator`],
//! which runs the mutation on the owning store and then refetches the
//! dependent slices listed in [`REFETCH_TABLE`]. Refetches start only
//! after the mutation is confirmed; a failed refetch is logged and does
//! not fail the mutation.

use crate::gateway::Session;
use crate::model::{Board, Connection, EntityId, Invitation, InvitationResponse};
use crate::store::{BoardStore, ConnectionStore, InvitationStore, StoreError};

/// A confirmed change to relationship state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipChange {
    Followed(EntityId),
    Unfollowed(EntityId),
    InvitationResponded(EntityId),
    PinSavedToBoard { board_id: EntityId, pin_id: EntityId },
}

/// Kind of change, used as the refetch table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Followed,
    Unfollowed,
    InvitationResponded,
    PinSavedToBoard,
}

impl RelationshipChange {
    pub fn kind(&self) -> ChangeKind {
        match self {
            RelationshipChange::Followed(_) => ChangeKind::Followed,
            RelationshipChange::Unfollowed(_) => ChangeKind::Unfollowed,
            RelationshipChange::InvitationResponded(_) => ChangeKind::InvitationResponded,
            RelationshipChange::PinSavedToBoard { .. } => ChangeKind::PinSavedToBoard,
        }
    }
}

/// A store slice to reload after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefetchTarget {
    /// The signed-in user's `following` slice.
    ActingUserFollowing,
}

/// Which slices each change invalidates.
///
/// Invitation responses are handled by local removal in the inbox. A
/// saved pin refetches nothing: cached boards stay stale until they are
/// fetched again.
pub const REFETCH_TABLE: &[(ChangeKind, &[RefetchTarget])] = &[
    (ChangeKind::Followed, &[RefetchTarget::ActingUserFollowing]),
    (ChangeKind::Unfollowed, &[RefetchTarget::ActingUserFollowing]),
    (ChangeKind::InvitationResponded, &[]),
    (ChangeKind::PinSavedToBoard, &[]),
];

/// Refetches owed after `change`.
pub fn refetch_plan(change: &RelationshipChange) -> &'static [RefetchTarget] {
    let kind = change.kind();
    REFETCH_TABLE
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

/// Runs relationship mutations and the refetches they owe.
#[derive(Clone)]
pub struct Coordinator {
    session: Session,
    connections: ConnectionStore,
    invitations: InvitationStore,
    boards: BoardStore,
}

impl Coordinator {
    pub fn new(
        session: Session,
        connections: ConnectionStore,
        invitations: InvitationStore,
        boards: BoardStore,
    ) -> Self {
        Self {
            session,
            connections,
            invitations,
            boards,
        }
    }

    pub async fn follow_user(&self, user_id: EntityId) -> Result<Connection, StoreError> {
        let edge = self.connections.follow(user_id).await?;
        self.reconcile(RelationshipChange::Followed(user_id)).await;
        Ok(edge)
    }

    pub async fn unfollow_user(&self, user_id: EntityId) -> Result<(), StoreError> {
        self.connections.unfollow(user_id).await?;
        self.reconcile(RelationshipChange::Unfollowed(user_id)).await;
        Ok(())
    }

    pub async fn respond_to_invitation(
        &self,
        invitation_id: EntityId,
        response: InvitationResponse,
    ) -> Result<Invitation, StoreError> {
        let invitation = self.invitations.respond(invitation_id, response).await?;
        self.reconcile(RelationshipChange::InvitationResponded(invitation_id))
            .await;
        Ok(invitation)
    }

    pub async fn add_pin_to_board(&self, board_id: EntityId, pin_id: EntityId) -> Result<Board, StoreError> {
        let board = self.boards.add_pin_to_board(board_id, pin_id).await?;
        self.reconcile(RelationshipChange::PinSavedToBoard { board_id, pin_id })
            .await;
        Ok(board)
    }

    /// Run every refetch owed after a confirmed `change`.
    pub async fn reconcile(&self, change: RelationshipChange) {
        for target in refetch_plan(&change) {
            match target {
                RefetchTarget::ActingUserFollowing => {
                    let Some(user_id) = self.session.user_id() else {
                        tracing::warn!(?change, "No signed-in user, skipping following refetch");
                        continue;
                    };
                    if let Err(e) = self.connections.refresh_following(user_id).await {
                        tracing::warn!(?change, user_id, error = %e, "Refetch after relationship change failed");
                    }
                }
            }
        }
    }
}

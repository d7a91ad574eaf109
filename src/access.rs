//! Access control for event-scoped operations.
//!
//! Every handler that touches a specific event resolves the caller's
//! [`Relationship`] to it through [`authorize`] and asks the relationship
//! whether the requested [`Action`] is allowed. Absent events are reported as
//! `NotFound`, existing events the caller may not act on as `Forbidden`.

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    events::{repo::EventRepo, repo_types::Event},
    invitations::{
        repo::InvitationRepo,
        repo_types::{Invitation, InvitationStatus},
    },
    store::Store,
};

/// How a user relates to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relationship {
    Organizer,
    InvitedAccepted,
    InvitedPending,
    InvitedDeclined,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    Edit,
    Delete,
    /// Send, revoke or list invitations.
    ManageInvitations,
    /// Accept or decline one's own invitation.
    Respond,
    MarkAttendance,
}

impl Relationship {
    /// First match wins: organizer, then invitation status, then none.
    pub fn classify(
        organizer_id: Uuid,
        user_id: Uuid,
        invitation: Option<InvitationStatus>,
    ) -> Self {
        if organizer_id == user_id {
            return Relationship::Organizer;
        }
        match invitation {
            Some(InvitationStatus::Accepted) => Relationship::InvitedAccepted,
            Some(InvitationStatus::Pending) => Relationship::InvitedPending,
            Some(InvitationStatus::Declined) => Relationship::InvitedDeclined,
            None => Relationship::None,
        }
    }

    pub fn permits(self, action: Action) -> bool {
        use Relationship as R;
        match action {
            Action::View => self != R::None,
            Action::Edit | Action::Delete | Action::ManageInvitations => self == R::Organizer,
            // An accepted invitee passes here; the invitation lifecycle then
            // rejects the second answer with InvalidState.
            Action::Respond => matches!(self, R::InvitedAccepted | R::InvitedPending | R::InvitedDeclined),
            Action::MarkAttendance => matches!(self, R::Organizer | R::InvitedAccepted),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Relationship::Organizer => "organizer",
            Relationship::InvitedAccepted => "invited-accepted",
            Relationship::InvitedPending => "invited-pending",
            Relationship::InvitedDeclined => "invited-declined",
            Relationship::None => "none",
        }
    }
}

/// An event together with the caller's relationship to it.
#[derive(Debug, Clone)]
pub struct EventAccess {
    pub event: Event,
    pub relationship: Relationship,
    /// The caller's invitation, if they have one.
    pub invitation: Option<Invitation>,
}

/// Resolves the caller's relationship to an already loaded event.
pub async fn relationship_to(
    store: &dyn Store,
    user_id: Uuid,
    event: &Event,
) -> AppResult<(Relationship, Option<Invitation>)> {
    if event.organizer_id == user_id {
        return Ok((Relationship::Organizer, None));
    }
    let invitation = store.find_invitation_for(event.id, user_id).await?;
    let relationship = Relationship::classify(
        event.organizer_id,
        user_id,
        invitation.as_ref().map(|i| i.status),
    );
    Ok((relationship, invitation))
}

/// Loads the event and checks that `user_id` may perform `action` on it.
pub async fn authorize(
    store: &dyn Store,
    user_id: Uuid,
    event_id: Uuid,
    action: Action,
) -> AppResult<EventAccess> {
    let event = store
        .find_event(event_id)
        .await?
        .ok_or(AppError::NotFound("event"))?;
    let (relationship, invitation) = relationship_to(store, user_id, &event).await?;

    if !relationship.permits(action) {
        warn!(%user_id, %event_id, ?action, relationship = relationship.as_str(), "access denied");
        return Err(AppError::Forbidden);
    }
    debug!(%user_id, %event_id, ?action, relationship = relationship.as_str(), "access granted");
    Ok(EventAccess {
        event,
        relationship,
        invitation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use super::Relationship as R;

    #[test]
    fn organizer_wins_over_invitation() {
        let user = Uuid::new_v4();
        assert_eq!(
            Relationship::classify(user, user, Some(InvitationStatus::Declined)),
            R::Organizer
        );
    }

    #[test]
    fn classify_by_invitation_status() {
        let (org, user) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(
            Relationship::classify(org, user, Some(InvitationStatus::Accepted)),
            R::InvitedAccepted
        );
        assert_eq!(
            Relationship::classify(org, user, Some(InvitationStatus::Pending)),
            R::InvitedPending
        );
        assert_eq!(
            Relationship::classify(org, user, Some(InvitationStatus::Declined)),
            R::InvitedDeclined
        );
        assert_eq!(Relationship::classify(org, user, None), R::None);
    }

    #[test]
    fn permission_matrix() {
        let table = [
            (Action::View, [true, true, true, true, false]),
            (Action::Edit, [true, false, false, false, false]),
            (Action::Delete, [true, false, false, false, false]),
            (Action::ManageInvitations, [true, false, false, false, false]),
            (Action::Respond, [false, true, true, true, false]),
            (Action::MarkAttendance, [true, true, false, false, false]),
        ];
        let rels = [R::Organizer, R::InvitedAccepted, R::InvitedPending, R::InvitedDeclined, R::None];
        for (action, expected) in table {
            for (rel, allowed) in rels.iter().zip(expected) {
                assert_eq!(rel.permits(action), allowed, "{rel:?} {action:?}");
            }
        }
    }

    #[test]
    fn none_is_denied_everything() {
        for action in [
            Action::View,
            Action::Edit,
            Action::Delete,
            Action::ManageInvitations,
            Action::Respond,
            Action::MarkAttendance,
        ] {
            assert!(!R::None.permits(action), "{action:?}");
        }
    }

    fn arb_status() -> impl Strategy<Value = Option<InvitationStatus>> {
        prop::sample::select(vec![
            None,
            Some(InvitationStatus::Pending),
            Some(InvitationStatus::Accepted),
            Some(InvitationStatus::Declined),
        ])
    }

    proptest! {
        /// Only the organizer may edit, delete or manage invitations.
        #[test]
        fn prop_only_organizer_mutates(
            same_user in any::<bool>(),
            status in arb_status(),
            org_bits in any::<u128>(),
            user_bits in any::<u128>(),
        ) {
            let organizer = Uuid::from_u128(org_bits);
            let user = if same_user { organizer } else { Uuid::from_u128(user_bits) };
            let rel = Relationship::classify(organizer, user, status);
            let is_organizer = organizer == user;
            for action in [Action::Edit, Action::Delete, Action::ManageInvitations] {
                prop_assert_eq!(rel.permits(action), is_organizer);
            }
        }

        /// Whoever may mark attendance may also view the event.
        #[test]
        fn prop_attendance_implies_view(
            status in arb_status(),
            org_bits in any::<u128>(),
            user_bits in any::<u128>(),
        ) {
            let rel = Relationship::classify(
                Uuid::from_u128(org_bits),
                Uuid::from_u128(user_bits),
                status,
            );
            if rel.permits(Action::MarkAttendance) {
                prop_assert!(rel.permits(Action::View));
            }
        }
    }
}

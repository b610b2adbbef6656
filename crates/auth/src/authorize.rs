use serde::Serialize;
use thiserror::Error;

use crate::{Action, Principal, PrincipalId};

/// Ownership facts about the target of an action.
///
/// The caller looks these up (the policy never touches storage). Which
/// variant fits depends on the action; a misfit fails closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// No target facts: creations, or role-only checks.
    None,
    /// A residence or activity.
    Listing { owner: PrincipalId },
    /// A booking: who requested it and who owns the booked listing.
    Booking {
        requester: PrincipalId,
        resource_owner: PrincipalId,
    },
    /// A review, bookmark or notification.
    Owned { owner: PrincipalId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    InsufficientRole,
    NotOwner,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::InsufficientRole => "insufficient_role",
            DenyReason::NotOwner => "not_owner",
        }
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self, action: Action) -> Result<(), AuthzError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AuthzError { action, reason }),
        }
    }

    fn require(cond: bool, reason: DenyReason) -> Self {
        if cond { Decision::Allow } else { Decision::Deny(reason) }
    }
}

/// A denied decision in error form, for `?`-style call sites.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("forbidden: {action} ({})", .reason.as_str())]
pub struct AuthzError {
    pub action: Action,
    pub reason: DenyReason,
}

/// Role gate only.
///
/// Needs nothing about the target, so the boundary can run it before any
/// lookup and answer identically for existing and missing records.
pub fn screen(principal: &Principal, action: Action) -> Decision {
    match action.required_role() {
        Some(role) if principal.role() != role => Decision::Deny(DenyReason::InsufficientRole),
        _ => Decision::Allow,
    }
}

/// Authorize `principal` to perform `action` on `target`.
///
/// - No IO
/// - No panics
/// - The role gate runs before ownership facts are read
pub fn authorize(principal: &Principal, action: Action, target: &Target) -> Decision {
    if let Decision::Deny(reason) = screen(principal, action) {
        return Decision::Deny(reason);
    }

    match (action, target) {
        (Action::CreateResource, _) => Decision::Allow,

        (Action::UpdateResource | Action::DeleteResource, Target::None) => Decision::Allow,
        (Action::UpdateResource | Action::DeleteResource, Target::Listing { owner }) => {
            Decision::require(principal.is(*owner), DenyReason::NotOwner)
        }

        (
            Action::ConfirmBooking | Action::RejectBooking,
            Target::Booking { resource_owner, .. },
        ) => Decision::require(principal.is(*resource_owner), DenyReason::NotOwner),

        (Action::CancelBooking, Target::Booking { requester, .. }) => {
            Decision::require(principal.is(*requester), DenyReason::NotOwner)
        }

        (
            Action::ViewBooking | Action::UpdateBooking | Action::DeleteBooking,
            Target::Booking {
                requester,
                resource_owner,
            },
        ) => Decision::require(
            principal.is(*requester) || principal.is(*resource_owner),
            DenyReason::NotOwner,
        ),

        (Action::MutateOwnEntity, Target::Owned { owner }) => {
            Decision::require(principal.is(*owner), DenyReason::NotOwner)
        }

        _ => Decision::Deny(DenyReason::NotOwner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use proptest::prelude::*;

    fn user() -> Principal {
        Principal::new(PrincipalId::new(), Role::User)
    }

    fn provider() -> Principal {
        Principal::new(PrincipalId::new(), Role::Provider)
    }

    fn booking(requester: &Principal, owner: &Principal) -> Target {
        Target::Booking {
            requester: requester.id(),
            resource_owner: owner.id(),
        }
    }

    #[test]
    fn users_cannot_manage_listings() {
        let u = user();
        for action in [Action::CreateResource, Action::UpdateResource, Action::DeleteResource] {
            assert_eq!(
                authorize(&u, action, &Target::Listing { owner: u.id() }),
                Decision::Deny(DenyReason::InsufficientRole)
            );
        }
    }

    #[test]
    fn provider_manages_only_own_listing() {
        let p = provider();
        let other = provider();
        assert!(authorize(&p, Action::CreateResource, &Target::None).is_allowed());
        assert!(authorize(&p, Action::UpdateResource, &Target::Listing { owner: p.id() }).is_allowed());
        assert_eq!(
            authorize(&p, Action::DeleteResource, &Target::Listing { owner: other.id() }),
            Decision::Deny(DenyReason::NotOwner)
        );
    }

    #[test]
    fn confirm_requires_owning_provider() {
        let u = user();
        let owner = provider();
        let stranger = provider();
        let target = booking(&u, &owner);

        assert!(authorize(&owner, Action::ConfirmBooking, &target).is_allowed());
        assert_eq!(
            authorize(&stranger, Action::ConfirmBooking, &target),
            Decision::Deny(DenyReason::NotOwner)
        );
        assert_eq!(
            authorize(&u, Action::RejectBooking, &target),
            Decision::Deny(DenyReason::InsufficientRole)
        );
    }

    #[test]
    fn only_requester_cancels() {
        let u = user();
        let owner = provider();
        let target = booking(&u, &owner);

        assert!(authorize(&u, Action::CancelBooking, &target).is_allowed());
        assert_eq!(
            authorize(&owner, Action::CancelBooking, &target),
            Decision::Deny(DenyReason::NotOwner)
        );
    }

    #[test]
    fn generic_booking_access_for_either_party() {
        let u = user();
        let owner = provider();
        let stranger = user();
        let target = booking(&u, &owner);

        for action in [Action::ViewBooking, Action::UpdateBooking, Action::DeleteBooking] {
            assert!(authorize(&u, action, &target).is_allowed());
            assert!(authorize(&owner, action, &target).is_allowed());
            assert_eq!(
                authorize(&stranger, action, &target),
                Decision::Deny(DenyReason::NotOwner)
            );
        }
    }

    #[test]
    fn owned_entities_are_owner_only() {
        let u = user();
        let other = user();
        assert!(authorize(&u, Action::MutateOwnEntity, &Target::Owned { owner: u.id() }).is_allowed());
        assert_eq!(
            authorize(&other, Action::MutateOwnEntity, &Target::Owned { owner: u.id() }),
            Decision::Deny(DenyReason::NotOwner)
        );
    }

    #[test]
    fn mismatched_target_fails_closed() {
        let p = provider();
        assert_eq!(
            authorize(&p, Action::ConfirmBooking, &Target::Listing { owner: p.id() }),
            Decision::Deny(DenyReason::NotOwner)
        );
        assert_eq!(
            authorize(&p, Action::MutateOwnEntity, &Target::None),
            Decision::Deny(DenyReason::NotOwner)
        );
    }

    #[test]
    fn into_result_carries_action_and_reason() {
        let err = Decision::Deny(DenyReason::NotOwner)
            .into_result(Action::CancelBooking)
            .unwrap_err();
        assert_eq!(err.reason, DenyReason::NotOwner);
        assert_eq!(err.to_string(), "forbidden: cancel-booking (not_owner)");
    }

    fn any_target() -> impl Strategy<Value = Target> {
        prop_oneof![
            Just(Target::None),
            any::<u128>().prop_map(|n| Target::Listing {
                owner: PrincipalId::from_uuid(uuid::Uuid::from_u128(n))
            }),
            (any::<u128>(), any::<u128>()).prop_map(|(a, b)| Target::Booking {
                requester: PrincipalId::from_uuid(uuid::Uuid::from_u128(a)),
                resource_owner: PrincipalId::from_uuid(uuid::Uuid::from_u128(b)),
            }),
            any::<u128>().prop_map(|n| Target::Owned {
                owner: PrincipalId::from_uuid(uuid::Uuid::from_u128(n))
            }),
        ]
    }

    proptest! {
        /// Property: a non-provider is refused every provider-gated action
        /// with the same reason, whatever the target looks like.
        #[test]
        fn role_denial_is_independent_of_target(
            action in proptest::sample::select(Action::ALL.to_vec()),
            target in any_target(),
            id in any::<u128>(),
        ) {
            let u = Principal::new(PrincipalId::from_uuid(uuid::Uuid::from_u128(id)), Role::User);
            if action.required_role() == Some(Role::Provider) {
                prop_assert_eq!(
                    authorize(&u, action, &target),
                    Decision::Deny(DenyReason::InsufficientRole)
                );
                prop_assert_eq!(screen(&u, action), Decision::Deny(DenyReason::InsufficientRole));
            }
        }

        /// Property: whenever `screen` denies, `authorize` denies identically.
        #[test]
        fn authorize_never_overrides_screen(
            action in proptest::sample::select(Action::ALL.to_vec()),
            target in any_target(),
            provider in any::<bool>(),
        ) {
            let role = if provider { Role::Provider } else { Role::User };
            let p = Principal::new(PrincipalId::new(), role);
            if let Decision::Deny(reason) = screen(&p, action) {
                prop_assert_eq!(authorize(&p, action, &target), Decision::Deny(reason));
            }
        }
    }
}

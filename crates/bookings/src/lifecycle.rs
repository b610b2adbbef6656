//! Booking state machine.
//!
//! ```text
//!              confirm (owning provider)
//!   pending ─────────────────────────────▶ confirmed
//!      │  \                                   │
//!      │   \ reject (owning provider)         │ cancel (requester)
//!      │    ▶ rejected                        ▼
//!      └──────────── cancel (requester) ────▶ cancelled
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stayhub_auth::{Action, DenyReason, Principal, PrincipalId};
use stayhub_core::Aggregate;

use crate::booking::{Booking, BookingEvent, BookingStatus, StatusChanged};

/// Lifecycle event requested by an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEvent {
    Confirm,
    Reject,
    Cancel,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 3] = [
        LifecycleEvent::Confirm,
        LifecycleEvent::Reject,
        LifecycleEvent::Cancel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::Confirm => "confirm",
            LifecycleEvent::Reject => "reject",
            LifecycleEvent::Cancel => "cancel",
        }
    }

    /// Authorization action guarding this event.
    pub fn action(&self) -> Action {
        match self {
            LifecycleEvent::Confirm => Action::ConfirmBooking,
            LifecycleEvent::Reject => Action::RejectBooking,
            LifecycleEvent::Cancel => Action::CancelBooking,
        }
    }

    pub fn allowed_from(&self, status: BookingStatus) -> bool {
        match self {
            LifecycleEvent::Confirm | LifecycleEvent::Reject => status == BookingStatus::Pending,
            LifecycleEvent::Cancel => {
                matches!(status, BookingStatus::Pending | BookingStatus::Confirmed)
            }
        }
    }

    /// Wrap a decided status change in the event it produces.
    pub fn record(&self, changed: StatusChanged) -> BookingEvent {
        match self {
            LifecycleEvent::Confirm => BookingEvent::Confirmed(changed),
            LifecycleEvent::Reject => BookingEvent::Rejected(changed),
            LifecycleEvent::Cancel => BookingEvent::Cancelled(changed),
        }
    }

    pub fn target_status(&self) -> BookingStatus {
        match self {
            LifecycleEvent::Confirm => BookingStatus::Confirmed,
            LifecycleEvent::Reject => BookingStatus::Rejected,
            LifecycleEvent::Cancel => BookingStatus::Cancelled,
        }
    }
}

impl core::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a lifecycle event was refused. The two kinds stay distinguishable so
/// the boundary can answer 409 and 403 respectively.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("invalid transition: cannot {event} a {from} booking")]
    InvalidTransition {
        from: BookingStatus,
        event: LifecycleEvent,
    },

    #[error("not authorized ({})", .0.as_str())]
    NotAuthorized(DenyReason),
}

/// A successful lifecycle step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Successor booking; the input booking is left untouched.
    pub booking: Booking,
    /// Fact to persist/publish.
    pub event: BookingEvent,
    /// Counterparty the notification collaborator should inform.
    pub notify: PrincipalId,
}

/// Apply `event` to `booking` on behalf of `actor`, stamped with the current
/// time.
pub fn transition(
    booking: &Booking,
    event: LifecycleEvent,
    actor: &Principal,
) -> Result<Transition, Rejection> {
    transition_at(booking, event, actor, Utc::now())
}

/// [`transition`] with an explicit business time.
pub fn transition_at(
    booking: &Booking,
    event: LifecycleEvent,
    actor: &Principal,
    occurred_at: DateTime<Utc>,
) -> Result<Transition, Rejection> {
    let changed = booking.decide_status_change(event, actor, occurred_at)?;
    let notify = changed.counterparty;
    let fact = event.record(changed);

    let mut next = booking.clone();
    next.apply(&fact);

    Ok(Transition {
        booking: next,
        event: fact,
        notify,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::{BookedResource, RequestBooking};
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use stayhub_auth::Role;
    use stayhub_core::{AggregateRoot, BookingId, ListingId, ListingKind};

    struct Fixture {
        user: Principal,
        provider: Principal,
        booking: Booking,
    }

    fn fixture() -> Fixture {
        let user = Principal::new(PrincipalId::new(), Role::User);
        let provider = Principal::new(PrincipalId::new(), Role::Provider);
        let (booking, _) = Booking::request(&RequestBooking {
            booking_id: BookingId::new(),
            requester: user,
            resource: BookedResource {
                listing_id: ListingId::new(),
                kind: ListingKind::Activity,
                owner: provider.id(),
            },
            check_in: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 9, 2).unwrap(),
            guests: 1,
            note: None,
            occurred_at: Utc::now(),
        })
        .unwrap();

        Fixture {
            user,
            provider,
            booking,
        }
    }

    fn in_status(f: &Fixture, status: BookingStatus) -> Booking {
        match status {
            BookingStatus::Pending => f.booking.clone(),
            BookingStatus::Confirmed => {
                transition(&f.booking, LifecycleEvent::Confirm, &f.provider).unwrap().booking
            }
            BookingStatus::Rejected => {
                transition(&f.booking, LifecycleEvent::Reject, &f.provider).unwrap().booking
            }
            BookingStatus::Cancelled => {
                transition(&f.booking, LifecycleEvent::Cancel, &f.user).unwrap().booking
            }
        }
    }

    #[test]
    fn provider_confirms_once() {
        let f = fixture();
        let confirmed = transition(&f.booking, LifecycleEvent::Confirm, &f.provider).unwrap();
        assert_eq!(confirmed.booking.status(), BookingStatus::Confirmed);
        assert_eq!(confirmed.notify, f.user.id());
        assert_eq!(f.booking.status(), BookingStatus::Pending);

        let again = transition(&confirmed.booking, LifecycleEvent::Confirm, &f.provider).unwrap_err();
        assert_eq!(
            again,
            Rejection::InvalidTransition {
                from: BookingStatus::Confirmed,
                event: LifecycleEvent::Confirm,
            }
        );
    }

    #[test]
    fn cancelled_booking_cannot_be_confirmed() {
        let f = fixture();
        let cancelled = transition(&f.booking, LifecycleEvent::Cancel, &f.user).unwrap();
        assert_eq!(cancelled.booking.status(), BookingStatus::Cancelled);
        assert_eq!(cancelled.notify, f.provider.id());

        let err = transition(&cancelled.booking, LifecycleEvent::Confirm, &f.provider).unwrap_err();
        assert!(matches!(err, Rejection::InvalidTransition { .. }));
    }

    #[test]
    fn requester_without_provider_role_cannot_reject() {
        let f = fixture();
        let err = transition(&f.booking, LifecycleEvent::Reject, &f.user).unwrap_err();
        assert_eq!(err, Rejection::NotAuthorized(DenyReason::InsufficientRole));
    }

    #[test]
    fn user_role_is_refused_confirm_and_reject_on_confirmed_booking() {
        let f = fixture();
        let confirmed = in_status(&f, BookingStatus::Confirmed);
        for event in [LifecycleEvent::Reject, LifecycleEvent::Confirm] {
            assert_eq!(
                transition(&confirmed, event, &f.user).unwrap_err(),
                Rejection::NotAuthorized(DenyReason::InsufficientRole)
            );
        }
    }

    #[test]
    fn owning_provider_rejecting_confirmed_booking_is_invalid_transition() {
        let f = fixture();
        let confirmed = in_status(&f, BookingStatus::Confirmed);
        assert_eq!(
            transition(&confirmed, LifecycleEvent::Reject, &f.provider).unwrap_err(),
            Rejection::InvalidTransition {
                from: BookingStatus::Confirmed,
                event: LifecycleEvent::Reject,
            }
        );
    }

    #[test]
    fn foreign_provider_is_not_authorized() {
        let f = fixture();
        let stranger = Principal::new(PrincipalId::new(), Role::Provider);
        for event in [LifecycleEvent::Confirm, LifecycleEvent::Reject] {
            assert_eq!(
                transition(&f.booking, event, &stranger).unwrap_err(),
                Rejection::NotAuthorized(DenyReason::NotOwner)
            );
        }
    }

    #[test]
    fn requester_can_cancel_confirmed_booking_once() {
        let f = fixture();
        let confirmed = in_status(&f, BookingStatus::Confirmed);
        let cancelled = transition(&confirmed, LifecycleEvent::Cancel, &f.user).unwrap();
        assert_eq!(cancelled.booking.status(), BookingStatus::Cancelled);
        assert_eq!(cancelled.booking.version(), 3);

        assert!(matches!(
            transition(&cancelled.booking, LifecycleEvent::Cancel, &f.user),
            Err(Rejection::InvalidTransition { .. })
        ));
    }

    #[test]
    fn provider_cannot_cancel() {
        let f = fixture();
        let confirmed = in_status(&f, BookingStatus::Confirmed);
        assert_eq!(
            transition(&confirmed, LifecycleEvent::Cancel, &f.provider).unwrap_err(),
            Rejection::NotAuthorized(DenyReason::NotOwner)
        );
    }

    #[test]
    fn rejection_messages_are_readable() {
        let err = Rejection::InvalidTransition {
            from: BookingStatus::Rejected,
            event: LifecycleEvent::Cancel,
        };
        assert_eq!(err.to_string(), "invalid transition: cannot cancel a rejected booking");
        assert_eq!(
            Rejection::NotAuthorized(DenyReason::NotOwner).to_string(),
            "not authorized (not_owner)"
        );
    }

    proptest! {
        /// Property: from a final status every event is an invalid transition,
        /// whoever the actor is.
        #[test]
        fn final_statuses_refuse_every_event(
            status in proptest::sample::select(vec![BookingStatus::Rejected, BookingStatus::Cancelled]),
            event in proptest::sample::select(LifecycleEvent::ALL.to_vec()),
            actor_kind in 0u8..4,
        ) {
            let f = fixture();
            let booking = in_status(&f, status);
            let actor = match actor_kind {
                0 => f.user,
                1 => f.provider,
                2 => Principal::new(PrincipalId::new(), Role::User),
                _ => Principal::new(PrincipalId::new(), Role::Provider),
            };

            let is_invalid_transition = matches!(
                transition(&booking, event, &actor),
                Err(Rejection::InvalidTransition { .. })
            );
            prop_assert!(is_invalid_transition);
        }

        /// Property: outside the final statuses, a `user` asking to confirm
        /// or reject is refused on role, whether or not they requested it.
        #[test]
        fn user_role_never_confirms_or_rejects(
            status in proptest::sample::select(vec![BookingStatus::Pending, BookingStatus::Confirmed]),
            event in proptest::sample::select(vec![LifecycleEvent::Confirm, LifecycleEvent::Reject]),
            is_requester in any::<bool>(),
        ) {
            let f = fixture();
            let booking = in_status(&f, status);
            let actor = if is_requester {
                f.user
            } else {
                Principal::new(PrincipalId::new(), Role::User)
            };

            prop_assert_eq!(
                transition(&booking, event, &actor).unwrap_err(),
                Rejection::NotAuthorized(DenyReason::InsufficientRole)
            );
        }

        /// Property: a successful transition lands exactly on the event's
        /// target status and bumps the version by one.
        #[test]
        fn success_moves_to_target_status(
            status in proptest::sample::select(BookingStatus::ALL.to_vec()),
            event in proptest::sample::select(LifecycleEvent::ALL.to_vec()),
            by_provider in any::<bool>(),
        ) {
            let f = fixture();
            let booking = in_status(&f, status);
            let actor = if by_provider { f.provider } else { f.user };

            if let Ok(t) = transition(&booking, event, &actor) {
                prop_assert!(event.allowed_from(status));
                prop_assert_eq!(t.booking.status(), event.target_status());
                prop_assert_eq!(t.booking.version(), booking.version() + 1);
            }
        }
    }
}

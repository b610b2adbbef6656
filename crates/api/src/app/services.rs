use stayhub_auth::{Principal, PrincipalId};
use stayhub_bookings::{
    Booking, BookingCommand, BookingError, BookingEvent, LifecycleEvent, RequestBooking, transition,
};
use stayhub_catalog::{Bookmark, Listing, Review};
use stayhub_core::{
    Aggregate, AggregateRoot, BookingId, DomainError, ExpectedVersion, ListingId,
    NotificationId, ReviewId,
};
use stayhub_infra::{InMemoryStore, KeyedStore, StoreError, VersionedStore};
use stayhub_notifications::Notification;

/// Attempts per booking change before a persistent version race is reported.
const MAX_COMMIT_ATTEMPTS: usize = 5;

/// Store handles shared by all handlers.
pub struct AppServices {
    pub listings: InMemoryStore<ListingId, Listing>,
    pub bookings: VersionedStore<BookingId, Booking>,
    pub reviews: InMemoryStore<ReviewId, Review>,
    /// Keyed by (owner, listing) so uniqueness is enforced on insert.
    pub bookmarks: InMemoryStore<(PrincipalId, ListingId), Bookmark>,
    pub notifications: InMemoryStore<NotificationId, Notification>,
}

/// Successor state decided for a booking, plus what to announce.
struct Change {
    booking: Booking,
    event: BookingEvent,
    notify: Option<PrincipalId>,
}

impl Default for AppServices {
    fn default() -> Self {
        Self::new()
    }
}

impl AppServices {
    pub fn new() -> Self {
        Self {
            listings: InMemoryStore::new(),
            bookings: VersionedStore::new(),
            reviews: InMemoryStore::new(),
            bookmarks: InMemoryStore::new(),
            notifications: InMemoryStore::new(),
        }
    }

    /// Store a new pending booking and notify the listing owner.
    pub fn request_booking(&self, cmd: &RequestBooking) -> Result<Booking, DomainError> {
        let (booking, event) = Booking::request(cmd)?;
        self.bookings.insert(booking.id_typed(), booking.clone())?;

        tracing::info!(
            booking_id = %booking.id_typed(),
            listing_id = %booking.resource().listing_id,
            requester = %booking.requester(),
            "booking requested"
        );
        self.notify(&event, booking.resource().owner);
        Ok(booking)
    }

    /// Confirm, reject or cancel a booking.
    ///
    /// The decision is re-taken against fresh state whenever a concurrent
    /// writer got there first, so the loser of a race sees the transition
    /// its rival already made.
    pub fn change_status(
        &self,
        id: BookingId,
        event: LifecycleEvent,
        actor: &Principal,
    ) -> Result<Booking, BookingError> {
        self.commit_change(id, |current| {
            let t = transition(current, event, actor)?;
            Ok(Change {
                booking: t.booking,
                event: t.event,
                notify: Some(t.notify),
            })
        })
    }

    /// Apply a generic booking command (amendments).
    pub fn handle_booking(&self, id: BookingId, command: &BookingCommand) -> Result<Booking, BookingError> {
        self.commit_change(id, |current| {
            let events = current.handle(command)?;
            let mut next = current.clone();
            let mut last = None;
            for e in events {
                next.apply(&e);
                last = Some(e);
            }
            let event = last.ok_or_else(|| DomainError::invariant("command produced no events"))?;
            Ok(Change {
                booking: next,
                event,
                notify: None,
            })
        })
    }

    /// Delete a settled booking on behalf of either party.
    pub fn remove_booking(&self, id: BookingId, actor: &Principal) -> Result<Booking, BookingError> {
        let current = self
            .bookings
            .get(&id)
            .map_err(DomainError::from)?
            .ok_or(DomainError::NotFound)?;

        current.ensure_removable(actor)?;

        // Final statuses never change, so the version still matches unless the
        // booking was removed concurrently.
        self.bookings
            .remove(&id, ExpectedVersion::exact(current.version()))
            .map_err(DomainError::from)?;

        tracing::info!(booking_id = %id, by = %actor.id(), status = %current.status(), "booking deleted");
        Ok(current)
    }

    fn commit_change<F>(&self, id: BookingId, decide: F) -> Result<Booking, BookingError>
    where
        F: Fn(&Booking) -> Result<Change, BookingError>,
    {
        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let current = self
                .bookings
                .get(&id)
                .map_err(DomainError::from)?
                .ok_or(DomainError::NotFound)?;

            let change = decide(&current)?;

            match self.bookings.commit(
                &id,
                change.booking.clone(),
                ExpectedVersion::exact(current.version()),
            ) {
                Ok(()) => {
                    tracing::info!(
                        booking_id = %id,
                        status = %change.booking.status(),
                        version = change.booking.version(),
                        "booking updated"
                    );
                    if let Some(recipient) = change.notify {
                        self.notify(&change.event, recipient);
                    }
                    return Ok(change.booking);
                }
                Err(StoreError::Concurrency(msg)) => {
                    tracing::debug!(booking_id = %id, attempt, %msg, "booking changed concurrently; retrying");
                }
                Err(e) => return Err(DomainError::from(e).into()),
            }
        }

        Err(DomainError::conflict("booking is being modified concurrently").into())
    }

    /// Hand a booking event to the notification inbox. Failures are logged, not
    /// propagated: the booking change has already been committed.
    fn notify(&self, event: &BookingEvent, recipient: PrincipalId) {
        let Some(notification) = Notification::from_booking_event(event, recipient) else {
            return;
        };
        if let Err(e) = self.notifications.insert(notification.id, notification) {
            tracing::warn!(error = %e, %recipient, "failed to store notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use stayhub_auth::Role;
    use stayhub_bookings::{BookedResource, BookingStatus, Rejection};
    use stayhub_core::ListingKind;
    use std::sync::{Arc, Barrier};

    fn seed(services: &AppServices) -> (Principal, Principal, Booking) {
        let user = Principal::new(PrincipalId::new(), Role::User);
        let provider = Principal::new(PrincipalId::new(), Role::Provider);
        let booking = services
            .request_booking(&RequestBooking {
                booking_id: BookingId::new(),
                requester: user,
                resource: BookedResource {
                    listing_id: ListingId::new(),
                    kind: ListingKind::Residence,
                    owner: provider.id(),
                },
                check_in: NaiveDate::from_ymd_opt(2026, 12, 20).unwrap(),
                check_out: NaiveDate::from_ymd_opt(2026, 12, 27).unwrap(),
                guests: 2,
                note: None,
                occurred_at: Utc::now(),
            })
            .unwrap();
        (user, provider, booking)
    }

    fn inbox(services: &AppServices, recipient: PrincipalId) -> Vec<Notification> {
        services
            .notifications
            .list_where(&|n| n.recipient == recipient)
            .unwrap()
    }

    #[test]
    fn request_and_confirm_notify_the_counterparty() {
        let services = AppServices::new();
        let (user, provider, booking) = seed(&services);
        assert_eq!(inbox(&services, provider.id()).len(), 1);

        let confirmed = services
            .change_status(booking.id_typed(), LifecycleEvent::Confirm, &provider)
            .unwrap();
        assert_eq!(confirmed.status(), BookingStatus::Confirmed);
        assert_eq!(inbox(&services, user.id()).len(), 1);
    }

    #[test]
    fn unknown_booking_is_not_found() {
        let services = AppServices::new();
        let provider = Principal::new(PrincipalId::new(), Role::Provider);
        let err = services
            .change_status(BookingId::new(), LifecycleEvent::Confirm, &provider)
            .unwrap_err();
        assert_eq!(err, BookingError::Domain(DomainError::NotFound));
    }

    #[test]
    fn rejected_transition_leaves_store_untouched() {
        let services = AppServices::new();
        let (user, _provider, booking) = seed(&services);

        let err = services
            .change_status(booking.id_typed(), LifecycleEvent::Reject, &user)
            .unwrap_err();
        assert!(matches!(err, BookingError::Rejected(Rejection::NotAuthorized(_))));

        let stored = services.bookings.get(&booking.id_typed()).unwrap().unwrap();
        assert_eq!(stored, booking);
    }

    #[test]
    fn provider_cannot_delete_a_confirmed_booking() {
        let services = AppServices::new();
        let (user, provider, booking) = seed(&services);
        let id = booking.id_typed();
        services.change_status(id, LifecycleEvent::Confirm, &provider).unwrap();

        let err = services.remove_booking(id, &provider).unwrap_err();
        assert!(matches!(err, BookingError::Domain(DomainError::InvariantViolation(_))));
        assert!(services.bookings.get(&id).unwrap().is_some());

        services.change_status(id, LifecycleEvent::Cancel, &user).unwrap();
        services.remove_booking(id, &provider).unwrap();
        assert!(services.bookings.get(&id).unwrap().is_none());
    }

    #[test]
    fn concurrent_confirm_and_reject_have_exactly_one_winner() {
        let services = Arc::new(AppServices::new());
        let (_user, provider, booking) = seed(&services);
        let id = booking.id_typed();

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [LifecycleEvent::Confirm, LifecycleEvent::Reject]
            .into_iter()
            .map(|event| {
                let services = Arc::clone(&services);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    services.change_status(id, event, &provider)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);

        let loser = results.into_iter().find_map(Result::err).unwrap();
        assert!(matches!(
            loser,
            BookingError::Rejected(Rejection::InvalidTransition { .. })
        ));

        let stored = services.bookings.get(&id).unwrap().unwrap();
        assert_eq!(stored.version(), 2);
    }
}

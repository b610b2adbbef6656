use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stayhub_auth::{Action, AuthzError, Decision, Principal, PrincipalId, Target, authorize, screen};
use stayhub_core::{Aggregate, AggregateRoot, BookingId, DomainError, DomainResult, ListingId, ListingKind};
use stayhub_events::Event;

use crate::lifecycle::{LifecycleEvent, Rejection};

/// Booking status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Rejected,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// No lifecycle event leaves this status.
    pub fn is_final(&self) -> bool {
        matches!(self, BookingStatus::Rejected | BookingStatus::Cancelled)
    }
}

impl core::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the booked listing taken when the booking is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedResource {
    pub listing_id: ListingId,
    pub kind: ListingKind,
    pub owner: PrincipalId,
}

/// Aggregate root: Booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    id: BookingId,
    requester: PrincipalId,
    resource: BookedResource,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guests: u32,
    note: Option<String>,
    status: BookingStatus,
    requested_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl Booking {
    /// Validate a booking request and build the new pending booking.
    pub fn request(cmd: &RequestBooking) -> DomainResult<(Self, BookingEvent)> {
        if cmd.requester.is(cmd.resource.owner) {
            return Err(DomainError::validation("cannot book your own listing"));
        }
        validate_stay(cmd.check_in, cmd.check_out, cmd.guests)?;

        let event = BookingEvent::Requested(BookingRequested {
            booking_id: cmd.booking_id,
            requester: cmd.requester.id(),
            resource: cmd.resource,
            check_in: cmd.check_in,
            check_out: cmd.check_out,
            guests: cmd.guests,
            note: cmd.note.clone(),
            occurred_at: cmd.occurred_at,
        });

        let booking = Self::replay(core::slice::from_ref(&event))?;
        Ok((booking, event))
    }

    /// Rebuild a booking from its event history.
    pub fn replay(events: &[BookingEvent]) -> DomainResult<Self> {
        let (first, rest) = events
            .split_first()
            .ok_or_else(|| DomainError::invariant("empty booking history"))?;

        let BookingEvent::Requested(e) = first else {
            return Err(DomainError::invariant("booking history must start with a request"));
        };

        let mut booking = Self {
            id: e.booking_id,
            requester: e.requester,
            resource: e.resource,
            check_in: e.check_in,
            check_out: e.check_out,
            guests: e.guests,
            note: e.note.clone(),
            status: BookingStatus::Pending,
            requested_at: e.occurred_at,
            updated_at: e.occurred_at,
            version: 1,
        };
        for event in rest {
            booking.apply(event);
        }
        Ok(booking)
    }

    pub fn id_typed(&self) -> BookingId {
        self.id
    }

    pub fn requester(&self) -> PrincipalId {
        self.requester
    }

    pub fn resource(&self) -> &BookedResource {
        &self.resource
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn guests(&self) -> u32 {
        self.guests
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn status(&self) -> BookingStatus {
        self.status
    }

    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Ownership facts for authorization checks against this booking.
    pub fn target(&self) -> Target {
        Target::Booking {
            requester: self.requester,
            resource_owner: self.resource.owner,
        }
    }

    /// True when `principal` is either party to the booking.
    pub fn involves(&self, principal: PrincipalId) -> bool {
        self.requester == principal || self.resource.owner == principal
    }
}

fn validate_stay(check_in: NaiveDate, check_out: NaiveDate, guests: u32) -> DomainResult<()> {
    if check_out <= check_in {
        return Err(DomainError::validation("check_out must be after check_in"));
    }
    if guests == 0 {
        return Err(DomainError::validation("guests must be at least 1"));
    }
    Ok(())
}

impl AggregateRoot for Booking {
    type Id = BookingId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RequestBooking. Starts a new booking in `pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBooking {
    pub booking_id: BookingId,
    pub requester: Principal,
    pub resource: BookedResource,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeStatus (confirm / reject / cancel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeStatus {
    pub event: LifecycleEvent,
    pub actor: Principal,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AmendBooking. Generic update of stay details; never touches status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmendBooking {
    pub actor: Principal,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: Option<u32>,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingCommand {
    ChangeStatus(ChangeStatus),
    Amend(AmendBooking),
}

/// Event: BookingRequested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequested {
    pub booking_id: BookingId,
    pub requester: PrincipalId,
    pub resource: BookedResource,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event payload shared by confirm, reject and cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChanged {
    pub booking_id: BookingId,
    pub from: BookingStatus,
    pub actor: PrincipalId,
    /// Counterparty to notify.
    pub counterparty: PrincipalId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: BookingAmended. Carries the full set of new stay details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingAmended {
    pub booking_id: BookingId,
    pub actor: PrincipalId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingEvent {
    Requested(BookingRequested),
    Confirmed(StatusChanged),
    Rejected(StatusChanged),
    Cancelled(StatusChanged),
    Amended(BookingAmended),
}

impl BookingEvent {
    pub fn booking_id(&self) -> BookingId {
        match self {
            BookingEvent::Requested(e) => e.booking_id,
            BookingEvent::Confirmed(e) | BookingEvent::Rejected(e) | BookingEvent::Cancelled(e) => {
                e.booking_id
            }
            BookingEvent::Amended(e) => e.booking_id,
        }
    }
}

impl Event for BookingEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BookingEvent::Requested(_) => "booking.requested",
            BookingEvent::Confirmed(_) => "booking.confirmed",
            BookingEvent::Rejected(_) => "booking.rejected",
            BookingEvent::Cancelled(_) => "booking.cancelled",
            BookingEvent::Amended(_) => "booking.amended",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            BookingEvent::Requested(e) => e.occurred_at,
            BookingEvent::Confirmed(e) | BookingEvent::Rejected(e) | BookingEvent::Cancelled(e) => {
                e.occurred_at
            }
            BookingEvent::Amended(e) => e.occurred_at,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// A generic (non-lifecycle) booking operation was denied.
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl Aggregate for Booking {
    type Command = BookingCommand;
    type Event = BookingEvent;
    type Error = BookingError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            BookingEvent::Requested(e) => {
                self.requester = e.requester;
                self.resource = e.resource;
                self.check_in = e.check_in;
                self.check_out = e.check_out;
                self.guests = e.guests;
                self.note = e.note.clone();
                self.status = BookingStatus::Pending;
                self.requested_at = e.occurred_at;
                self.updated_at = e.occurred_at;
            }
            BookingEvent::Confirmed(e) => {
                self.status = BookingStatus::Confirmed;
                self.updated_at = e.occurred_at;
            }
            BookingEvent::Rejected(e) => {
                self.status = BookingStatus::Rejected;
                self.updated_at = e.occurred_at;
            }
            BookingEvent::Cancelled(e) => {
                self.status = BookingStatus::Cancelled;
                self.updated_at = e.occurred_at;
            }
            BookingEvent::Amended(e) => {
                self.check_in = e.check_in;
                self.check_out = e.check_out;
                self.guests = e.guests;
                self.note = e.note.clone();
                self.updated_at = e.occurred_at;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            BookingCommand::ChangeStatus(cmd) => {
                let changed = self.decide_status_change(cmd.event, &cmd.actor, cmd.occurred_at)?;
                Ok(vec![cmd.event.record(changed)])
            }
            BookingCommand::Amend(cmd) => Ok(vec![self.handle_amend(cmd)?]),
        }
    }
}

impl Booking {
    /// Guard order:
    ///
    /// 1. final statuses refuse every event, whoever asks;
    /// 2. the role gate, so a non-provider never confirms or rejects;
    /// 3. the event must be legal from the current status;
    /// 4. ownership of the booking.
    pub(crate) fn decide_status_change(
        &self,
        event: LifecycleEvent,
        actor: &Principal,
        occurred_at: DateTime<Utc>,
    ) -> Result<StatusChanged, Rejection> {
        let invalid = Rejection::InvalidTransition {
            from: self.status,
            event,
        };

        if self.status.is_final() {
            return Err(invalid);
        }

        if let Decision::Deny(reason) = screen(actor, event.action()) {
            return Err(Rejection::NotAuthorized(reason));
        }

        if !event.allowed_from(self.status) {
            return Err(invalid);
        }

        if let Decision::Deny(reason) = authorize(actor, event.action(), &self.target()) {
            return Err(Rejection::NotAuthorized(reason));
        }

        Ok(StatusChanged {
            booking_id: self.id,
            from: self.status,
            actor: actor.id(),
            counterparty: match event {
                LifecycleEvent::Confirm | LifecycleEvent::Reject => self.requester,
                LifecycleEvent::Cancel => self.resource.owner,
            },
            occurred_at,
        })
    }

    /// Deletion is for settled records only; a live booking leaves through
    /// `cancel` or `reject` so the counterparty hears about it.
    pub fn ensure_removable(&self, actor: &Principal) -> Result<(), BookingError> {
        authorize(actor, Action::DeleteBooking, &self.target()).into_result(Action::DeleteBooking)?;

        if !self.status.is_final() {
            return Err(DomainError::invariant(format!(
                "a {} booking must be cancelled or rejected before it can be deleted",
                self.status
            ))
            .into());
        }
        Ok(())
    }

    fn handle_amend(&self, cmd: &AmendBooking) -> Result<BookingEvent, BookingError> {
        authorize(&cmd.actor, Action::UpdateBooking, &self.target())
            .into_result(Action::UpdateBooking)?;

        if self.status != BookingStatus::Pending {
            return Err(DomainError::invariant("only pending bookings can be amended").into());
        }

        let check_in = cmd.check_in.unwrap_or(self.check_in);
        let check_out = cmd.check_out.unwrap_or(self.check_out);
        let guests = cmd.guests.unwrap_or(self.guests);
        validate_stay(check_in, check_out, guests)?;

        Ok(BookingEvent::Amended(BookingAmended {
            booking_id: self.id,
            actor: cmd.actor.id(),
            check_in,
            check_out,
            guests,
            note: cmd.note.clone().or_else(|| self.note.clone()),
            occurred_at: cmd.occurred_at,
        }))
    }
}

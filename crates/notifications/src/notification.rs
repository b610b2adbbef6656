use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stayhub_auth::PrincipalId;
use stayhub_bookings::BookingEvent;
use stayhub_core::{BookingId, Entity, NotificationId, Owned};
use stayhub_events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BookingRequested,
    BookingConfirmed,
    BookingRejected,
    BookingCancelled,
}

impl NotificationKind {
    fn message(&self) -> &'static str {
        match self {
            NotificationKind::BookingRequested => "You have a new booking request.",
            NotificationKind::BookingConfirmed => "Your booking has been confirmed.",
            NotificationKind::BookingRejected => "Your booking has been rejected.",
            NotificationKind::BookingCancelled => "A booking for your listing was cancelled.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: PrincipalId,
    pub kind: NotificationKind,
    pub booking_id: BookingId,
    pub message: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build the notification a booking event warrants for `recipient`.
    ///
    /// Amendments are not announced.
    pub fn from_booking_event(event: &BookingEvent, recipient: PrincipalId) -> Option<Self> {
        let kind = match event {
            BookingEvent::Requested(_) => NotificationKind::BookingRequested,
            BookingEvent::Confirmed(_) => NotificationKind::BookingConfirmed,
            BookingEvent::Rejected(_) => NotificationKind::BookingRejected,
            BookingEvent::Cancelled(_) => NotificationKind::BookingCancelled,
            BookingEvent::Amended(_) => return None,
        };

        Some(Self {
            id: NotificationId::new(),
            recipient,
            kind,
            booking_id: event.booking_id(),
            message: kind.message().to_string(),
            read_at: None,
            created_at: event.occurred_at(),
        })
    }

    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    /// Mark as read. Returns false if it already was; the first read time is kept.
    pub fn mark_read(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_read() {
            return false;
        }
        self.read_at = Some(now);
        true
    }
}

/// Mark every notification read; returns how many were unread.
pub fn mark_all_read<'a>(
    notifications: impl IntoIterator<Item = &'a mut Notification>,
    now: DateTime<Utc>,
) -> usize {
    notifications
        .into_iter()
        .map(|n| n.mark_read(now))
        .filter(|newly_read| *newly_read)
        .count()
}

impl Entity for Notification {
    type Id = NotificationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Owned for Notification {
    type Owner = PrincipalId;

    fn owner(&self) -> PrincipalId {
        self.recipient
    }
}

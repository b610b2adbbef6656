//! Booking lifecycle domain module.
//!
//! Bookings are modeled as an aggregate with an explicit state machine.
//! [`transition`] is the single entry point for confirm, reject and cancel;
//! it is pure and returns the successor booking plus the event to publish.

pub mod booking;
pub mod lifecycle;

pub use booking::{
    AmendBooking, Booking, BookingAmended, BookingCommand, BookingError, BookingEvent,
    BookingRequested, BookingStatus, BookedResource, ChangeStatus, RequestBooking, StatusChanged,
};
pub use lifecycle::{LifecycleEvent, Rejection, Transition, transition, transition_at};

//! Domain events: immutable facts emitted by aggregates.

pub mod event;

pub use event::Event;

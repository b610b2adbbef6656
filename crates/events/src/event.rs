use chrono::{DateTime, Utc};

/// A domain fact.
///
/// Events are immutable and versioned. Downstream collaborators (the
/// notification inbox, audit logs) react to them; aggregates never call those
/// collaborators directly.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. "booking.confirmed").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// Business time of the fact.
    fn occurred_at(&self) -> DateTime<Utc>;
}

//! Aggregate traits and optimistic concurrency expectations.

/// Aggregate root marker + minimal interface.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Number of events applied so far; grows by exactly one per applied event.
    fn version(&self) -> u64;
}

/// Version a write expects to find in storage: the version of the state the
/// caller's decision was based on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExpectedVersion(u64);

impl ExpectedVersion {
    pub fn exact(version: u64) -> Self {
        Self(version)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn matches(self, actual: u64) -> bool {
        self.0 == actual
    }
}

/// Decide/evolve split for aggregates.
///
/// - `handle(&self, cmd)` decides which events a command produces, without
///   mutating anything.
/// - `apply(&mut self, event)` evolves state from one event.
///
/// Neither method may perform IO.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    fn apply(&mut self, event: &Self::Event);

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_only_the_exact_version() {
        let expected = ExpectedVersion::exact(3);
        assert!(expected.matches(3));
        assert!(!expected.matches(2));
        assert!(!expected.matches(4));
        assert_eq!(expected.get(), 3);
    }
}

//! Entity trait: records that keep their identity while their attributes change.

/// Entity marker + minimal interface.
///
/// Users and sessions are both entities: a user keeps its id across profile
/// updates, a session keeps its id from login until logout.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// create a new one with the new values. `PartCount` is the canonical example
/// here: two counts of 3 are the same count, wherever they appear.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

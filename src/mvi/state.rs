//! Base trait for application state.

/// Marker trait for application state snapshots.
///
/// States should be:
/// - Immutable (a transition builds a new value instead of mutating)
/// - Self-contained (all data needed to project the view)
/// - Comparable (PartialEq for detecting no-op transitions)
pub trait AppState: Clone + PartialEq + std::fmt::Debug + Send + Sync + 'static {}

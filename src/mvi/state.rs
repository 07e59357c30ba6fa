//! Base trait for view state.

use std::fmt;

/// Marker trait for everything a presentation surface needs at one instant.
///
/// View states should be:
/// - Plain data (no handles to controllers, flows, routers or services)
/// - Cloneable, so the binding can keep the last rendered frame
/// - Comparable, so tests and surfaces can detect changes
pub trait ViewState: Clone + PartialEq + fmt::Debug + 'static {}

//! Base trait for intents (user/system actions).

use std::fmt;

/// Marker trait for intent objects.
///
/// Intents represent:
/// - User actions forwarded by a presentation binding
/// - System events (lifecycle, dependency completions)
/// - Navigation requests
pub trait Intent: fmt::Debug + 'static {}

//! Model-View-Intent primitives shared by every screen and state machine.
//!
//! # Architecture
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ ViewState ──→ Binding
//!    ↑                                              │
//!    └──────────────────────────────────────────────┘
//! ```
//!
//! - **ViewState**: immutable snapshot a presentation surface renders
//! - **Intent**: user actions or system events
//! - **Reducer**: pure function that transforms state based on intents

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::ViewState;

/// Run a reducer against a state slot in place.
///
/// `$slot` is any place expression (`self.form`, `*guard`); the state type
/// must implement `Default` so the old value can be moved out.
macro_rules! dispatch_mvi {
    ($slot:expr, $reducer:ty, $intent:expr) => {
        $slot = <$reducer as $crate::mvi::Reducer>::reduce(std::mem::take(&mut $slot), $intent)
    };
}

pub(crate) use dispatch_mvi;

//! Application lifecycle feature module.
//!
//! # Architecture
//!
//! Uses MVI (Model-View-Intent) pattern:
//! - `state.rs` - Lifecycle state enum (NotRunning → Active ⇄ Background → Terminated)
//! - `intent.rs` - Platform events (Launch, Foreground, Background, Terminate, ...)
//! - `reducer.rs` - State transitions (pure, no side effects)

mod intent;
mod reducer;
mod state;

pub use intent::{Activity, LaunchOptions, LifecycleEvent};
pub use reducer::LifecycleReducer;
pub use state::LifecycleState;

//! The root unit and the platform lifecycle boundary.

mod lifecycle;
mod root;

pub use lifecycle::{Activity, LaunchOptions, LifecycleEvent, LifecycleReducer, LifecycleState};
pub use root::{Navigation, RootUnit};

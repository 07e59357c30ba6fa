//! Application lifecycle state.

use std::fmt;

/// Where the application is in its platform lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Built but not launched yet.
    #[default]
    NotRunning,
    /// In the foreground, presenting.
    Active,
    /// Still alive, not presenting.
    Background,
    /// Terminated. Every later event is ignored.
    Terminated,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::NotRunning => "not_running",
            LifecycleState::Active => "active",
            LifecycleState::Background => "background",
            LifecycleState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

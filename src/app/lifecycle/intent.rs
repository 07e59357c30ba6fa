//! Platform lifecycle events.

use crate::mvi::Intent;

/// What the platform handed over at launch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchOptions {
    /// Deep link the app was opened with.
    pub url: Option<String>,
    pub payload: serde_json::Value,
}

impl LaunchOptions {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            payload: serde_json::Value::Null,
        }
    }
}

/// A user activity handed over by the platform (handoff, search result,
/// shortcut). `kind` is resolved like a transition identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub kind: String,
    pub payload: serde_json::Value,
}

impl Activity {
    pub fn new(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }
}

/// Lifecycle events forwarded verbatim down the active chain.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    Launch(LaunchOptions),
    Foreground,
    Background,
    Terminate,
    Continue(Activity),
    OpenUrl(String),
}

impl Intent for LifecycleEvent {}

impl LifecycleEvent {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Launch(_) => "launch",
            LifecycleEvent::Foreground => "foreground",
            LifecycleEvent::Background => "background",
            LifecycleEvent::Terminate => "terminate",
            LifecycleEvent::Continue(_) => "continue",
            LifecycleEvent::OpenUrl(_) => "open_url",
        }
    }
}

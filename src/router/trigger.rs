//! Route identifiers and the triggers that resolve to them.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a route in a router's table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RouteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RouteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for RouteId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// An externally sourced transition: an identifier plus whatever the
/// source attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub identifier: String,
    pub source: Option<String>,
    pub payload: serde_json::Value,
}

impl Transition {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            source: None,
            payload: serde_json::Value::Null,
        }
    }

    pub fn from_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Anything that can ask a router for a flow.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// Explicit programmatic navigation.
    Route(RouteId),
    Transition(Transition),
    /// Deep link such as `flowkit://gallery/item`.
    Link(String),
}

impl Trigger {
    pub fn link(url: impl Into<String>) -> Self {
        Trigger::Link(url.into())
    }

    /// The route-table key this trigger resolves by.
    ///
    /// For links this is the first path segment after an optional
    /// `scheme://`, ignoring query and fragment.
    pub fn route_key(&self) -> Option<&str> {
        match self {
            Trigger::Route(id) => Some(id.as_str()),
            Trigger::Transition(transition) => Some(transition.identifier.as_str()),
            Trigger::Link(url) => link_key(url),
        }
    }

    /// Payload carried by the trigger, `Null` for plain routes and links.
    pub fn payload(&self) -> &serde_json::Value {
        static NULL: serde_json::Value = serde_json::Value::Null;
        match self {
            Trigger::Transition(transition) => &transition.payload,
            Trigger::Route(_) | Trigger::Link(_) => &NULL,
        }
    }
}

fn link_key(url: &str) -> Option<&str> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = rest.split(['?', '#']).next().unwrap_or_default();
    path.split('/').find(|segment| !segment.is_empty())
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Route(id) => write!(f, "{id}"),
            Trigger::Transition(transition) => match &transition.source {
                Some(source) => write!(f, "transition:{}@{source}", transition.identifier),
                None => write!(f, "transition:{}", transition.identifier),
            },
            Trigger::Link(url) => f.write_str(url),
        }
    }
}

impl From<&str> for Trigger {
    fn from(value: &str) -> Self {
        Trigger::Route(RouteId::from(value))
    }
}

impl From<RouteId> for Trigger {
    fn from(value: RouteId) -> Self {
        Trigger::Route(value)
    }
}

impl From<Transition> for Trigger {
    fn from(value: Transition) -> Self {
        Trigger::Transition(value)
    }
}

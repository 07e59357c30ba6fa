//! Hierarchical screen ownership and navigation.
//!
//! ```text
//! RootUnit ─→ Switchboard ─→ RoutingUnit* ─→ FlowUnit* ─→ LogicUnit ─→ child LogicUnit*
//!                                                             │
//!                                                    PresentationBinding ─→ Surface
//! ```
//!
//! Ownership only ever points down this tree; every upward link is weak.
//! Business dependencies sit beside it, shared through trait objects and
//! replaceable through [`harness::SubstitutionEnvironment`].

pub mod app;
pub mod compose;
pub mod config;
pub mod deps;
pub mod error;
pub mod flow;
pub mod harness;
pub mod logging;
pub mod mvi;
pub mod router;
pub mod screens;
pub mod unit;

//! Substitution environment: build the real object graph with chosen
//! dependencies replaced, then drive it like a user would.
//!
//! ```text
//! configure(deps) ──→ inject() ──→ root / router / controller / view_state
//!        ↑  (repeatable)    │
//!        └── AlreadyInjected┘
//! ```
//!
//! Only interfaces are substitutable. Controllers, flows and routers are
//! always the production ones.

use std::rc::Rc;
use std::sync::Arc;

use crate::app::RootUnit;
use crate::compose::CompositionFactory;
use crate::config::Config;
use crate::deps::{Dependencies, ImageService};
use crate::error::EnvironmentError;
use crate::flow::FlowUnit;
use crate::router::RoutingUnit;
use crate::unit::{find, Controller, PumpReport, Screen};

/// Upper bound on pump rounds in [`SubstitutionEnvironment::settle`].
const MAX_SETTLE_ROUNDS: usize = 64;

pub struct SubstitutionEnvironment {
    config: Config,
    substitutions: Dependencies,
    root: Option<RootUnit>,
}

impl Default for SubstitutionEnvironment {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl SubstitutionEnvironment {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            substitutions: Dependencies::new(),
            root: None,
        }
    }

    /// Add substitutions. Later calls win for the same interface.
    pub fn configure(&mut self, substitutions: Dependencies) -> Result<&mut Self, EnvironmentError> {
        if self.root.is_some() {
            return Err(EnvironmentError::AlreadyInjected);
        }
        self.substitutions.merge(substitutions);
        Ok(self)
    }

    /// Substitute a single interface.
    pub fn substitute<T>(&mut self, service: Arc<T>) -> Result<&mut Self, EnvironmentError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.configure(Dependencies::new().with(service))
    }

    /// Wire the graph. Substitutions are resolved first; every other
    /// interface gets its production implementation.
    pub fn inject(&mut self) -> Result<&RootUnit, EnvironmentError> {
        if self.root.is_some() {
            return Err(EnvironmentError::AlreadyInjected);
        }
        tracing::debug!(substituted = ?self.substitutions.interfaces(), "Injecting environment");
        let root = CompositionFactory::new(self.config.clone())
            .with_dependencies(self.substitutions.clone())
            .build()?;
        Ok(self.root.insert(root))
    }

    pub fn is_injected(&self) -> bool {
        self.root.is_some()
    }

    /// Interface names supplied as substitutions.
    pub fn substituted(&self) -> Vec<&'static str> {
        self.substitutions.interfaces()
    }

    pub fn root(&self) -> Result<&RootUnit, EnvironmentError> {
        self.root.as_ref().ok_or(EnvironmentError::NotInjected)
    }

    pub fn router(&self, name: &str) -> Result<Rc<RoutingUnit>, EnvironmentError> {
        self.root()?
            .switchboard()
            .router(name)
            .ok_or_else(|| EnvironmentError::RouterNotFound {
                name: name.to_string(),
            })
    }

    pub fn active_flow(&self) -> Result<Rc<FlowUnit>, EnvironmentError> {
        self.root()?
            .active_flow()
            .ok_or(EnvironmentError::NoActiveFlow)
    }

    /// The live controller for screen `S` in the active flow, children
    /// included.
    pub fn controller<S: Screen>(&self) -> Result<Rc<Controller<S>>, EnvironmentError> {
        let flow = self.active_flow()?;
        flow.current()
            .and_then(|unit| find::<S>(&unit))
            .ok_or(EnvironmentError::UnitNotFound { screen: S::NAME })
    }

    /// Freshly derived view state of screen `S`.
    pub fn view_state<S: Screen>(&self) -> Result<S::State, EnvironmentError> {
        Ok(self.controller::<S>()?.view_state())
    }

    /// Last view state the binding of screen `S` rendered.
    pub fn rendered<S: Screen>(&self) -> Result<Option<S::State>, EnvironmentError> {
        Ok(self.controller::<S>()?.binding().current())
    }

    /// Emit `intent` through the binding of screen `S`, as a user would,
    /// then settle outstanding dependency work.
    pub fn press<S: Screen>(&self, intent: S::Intent) -> Result<PumpReport, EnvironmentError> {
        let controller = self.controller::<S>()?;
        if !controller.binding().emit(intent) {
            return Err(EnvironmentError::IntentDropped { screen: S::NAME });
        }
        drop(controller);
        self.settle()
    }

    /// Wait for in-flight image fetches and pump completions until the
    /// postbox is idle.
    pub fn settle(&self) -> Result<PumpReport, EnvironmentError> {
        let root = self.root()?;
        let images = root.dependencies().resolve::<dyn ImageService>().ok();
        let mut total = PumpReport::default();
        for _ in 0..MAX_SETTLE_ROUNDS {
            if let Some(images) = &images {
                images.settle();
            }
            let report = root.pump();
            if report.is_idle() {
                break;
            }
            total.applied += report.applied;
            total.discarded += report.discarded;
        }
        Ok(total)
    }
}

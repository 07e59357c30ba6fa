//! Composition: turns a [`Config`] and a dependency table into a live
//! [`RootUnit`].
//!
//! This is the only place that knows which screens make up which flow and
//! which production implementation backs which interface.

use std::sync::Arc;

use crate::app::RootUnit;
use crate::config::{Config, FlowKind, RouteConfig};
use crate::deps::{
    Dependencies, DiskImageService, ImageService, Library, LogSurfaceProvider, MemoryLibrary,
    MemorySessionStore, SessionStore,
};
use crate::error::CompositionError;
use crate::flow::FlowSpec;
use crate::router::{Route, RouteId, RouterPlan, Switchboard};
use crate::screens::{
    CredentialsScreen, GalleryScreen, QuotaScreen, SettingsScreen, WelcomeScreen,
};
use crate::unit::{composite, factory, Postbox, SurfaceProvider, UnitEnv};

/// Builds the whole object graph once.
///
/// Dependencies supplied through [`with_dependencies`](Self::with_dependencies)
/// win; every interface left out gets its production implementation.
pub struct CompositionFactory {
    config: Config,
    dependencies: Dependencies,
}

impl CompositionFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            dependencies: Dependencies::new(),
        }
    }

    pub fn with_dependencies(mut self, dependencies: Dependencies) -> Self {
        self.dependencies.merge(dependencies);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn build(self) -> Result<RootUnit, CompositionError> {
        let Self {
            config,
            mut dependencies,
        } = self;
        config.validate()?;
        provide_production(&config, &mut dependencies);

        let postbox = Postbox::new();
        let surfaces = dependencies.resolve::<dyn SurfaceProvider>()?;
        let env = UnitEnv::new(&postbox, surfaces);
        let plans = router_plans(&config, &dependencies)?;
        let switchboard = Switchboard::new(plans, env)?;

        tracing::info!(
            routers = switchboard.routers().len(),
            routes = config.routes.len(),
            interfaces = ?dependencies.interfaces(),
            "Composed application"
        );
        Ok(RootUnit::new(
            switchboard,
            postbox,
            dependencies,
            RouteId::from(config.app.initial_route.as_str()),
            config.app.fallback_route.as_deref().map(RouteId::from),
        ))
    }
}

/// Fill every interface `dependencies` does not provide yet with its
/// production implementation.
pub fn provide_production(config: &Config, dependencies: &mut Dependencies) {
    if !dependencies.contains::<dyn ImageService>() {
        dependencies.provide::<dyn ImageService>(Arc::new(DiskImageService::new(&config.assets.dir)));
    }
    if !dependencies.contains::<dyn SessionStore>() {
        let accounts = config
            .accounts
            .iter()
            .map(|account| (account.user.clone(), account.password.clone()));
        dependencies.provide::<dyn SessionStore>(Arc::new(MemorySessionStore::new(accounts)));
    }
    if !dependencies.contains::<dyn Library>() {
        dependencies.provide::<dyn Library>(Arc::new(MemoryLibrary::default()));
    }
    if !dependencies.contains::<dyn SurfaceProvider>() {
        dependencies.provide::<dyn SurfaceProvider>(Arc::new(LogSurfaceProvider));
    }
}

/// Group configured routes into one plan per router, in first-seen order.
pub fn router_plans(
    config: &Config,
    dependencies: &Dependencies,
) -> Result<Vec<RouterPlan>, CompositionError> {
    let mut plans: Vec<RouterPlan> = Vec::new();
    for route in &config.routes {
        let entry = Route::new(route.id.as_str(), flow_spec(route, dependencies)?, route.policy);
        match plans.iter_mut().find(|plan| plan.name() == route.router) {
            Some(plan) => plan.add(entry),
            None => plans.push(RouterPlan::new(route.router.as_str()).route(entry)),
        }
    }
    Ok(plans)
}

fn flow_spec(route: &RouteConfig, deps: &Dependencies) -> Result<FlowSpec, CompositionError> {
    let spec = match route.flow {
        FlowKind::Login => {
            let sessions = deps.resolve::<dyn SessionStore>()?;
            let welcome_sessions = Arc::clone(&sessions);
            FlowSpec::new("login")
                .step(factory(move |mount| {
                    let screen = CredentialsScreen::new(Arc::clone(&sessions));
                    let user = mount
                        .trigger()
                        .and_then(|trigger| trigger.payload()["user"].as_str());
                    match user {
                        Some(user) => screen.with_user(user),
                        None => screen,
                    }
                }))
                .step(factory(move |_| {
                    WelcomeScreen::new(Arc::clone(&welcome_sessions))
                }))
        }
        FlowKind::Gallery => {
            let images = deps.resolve::<dyn ImageService>()?;
            let library = deps.resolve::<dyn Library>()?;
            let sessions = deps.resolve::<dyn SessionStore>()?;
            let quota_library = Arc::clone(&library);
            FlowSpec::new("gallery").step(composite(
                move |_| {
                    GalleryScreen::new(
                        Arc::clone(&images),
                        Arc::clone(&library),
                        Arc::clone(&sessions),
                    )
                },
                vec![factory(move |_| QuotaScreen::new(Arc::clone(&quota_library)))],
            ))
        }
        FlowKind::Settings => {
            let sessions = deps.resolve::<dyn SessionStore>()?;
            let library = deps.resolve::<dyn Library>()?;
            FlowSpec::new("settings").step(factory(move |_| {
                SettingsScreen::new(Arc::clone(&sessions), Arc::clone(&library))
            }))
        }
    };
    Ok(match &route.then {
        Some(then) => spec.then(then.as_str()),
        None => spec,
    })
}

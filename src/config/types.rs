use serde::{Deserialize, Serialize};

use crate::router::RoutePolicy;

/// Root configuration container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default = "default_accounts")]
    pub accounts: Vec<AccountConfig>,
    #[serde(default = "default_routes")]
    pub routes: Vec<RouteConfig>,
}

/// Application-level navigation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Route dispatched on a plain launch.
    #[serde(default = "default_initial_route")]
    pub initial_route: String,
    /// Route dispatched when a trigger does not resolve (optional).
    #[serde(default)]
    pub fallback_route: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Directory the image service reads from (default: "./assets").
    #[serde(default = "default_assets_dir")]
    pub dir: String,
}

/// An account the in-memory session store accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub user: String,
    pub password: String,
}

/// Which screen sequence a route runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Login,
    Gallery,
    Settings,
}

/// One route table entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub id: String,
    pub flow: FlowKind,
    #[serde(default)]
    pub policy: RoutePolicy,
    /// Router that claims this route (default: "main").
    #[serde(default = "default_router")]
    pub router: String,
    /// Route handed off to when the flow finishes.
    #[serde(default)]
    pub then: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            logging: LoggingConfig::default(),
            assets: AssetsConfig::default(),
            accounts: default_accounts(),
            routes: default_routes(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_route: default_initial_route(),
            fallback_route: Some("home".to_string()),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: default_assets_dir(),
        }
    }
}

fn default_initial_route() -> String {
    "login".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_assets_dir() -> String {
    "./assets".to_string()
}

fn default_router() -> String {
    "main".to_string()
}

fn default_accounts() -> Vec<AccountConfig> {
    vec![AccountConfig {
        user: "demo".to_string(),
        password: "demo".to_string(),
    }]
}

fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig {
            id: "login".to_string(),
            flow: FlowKind::Login,
            policy: RoutePolicy::PerTrigger,
            router: default_router(),
            then: Some("home".to_string()),
        },
        RouteConfig {
            id: "home".to_string(),
            flow: FlowKind::Gallery,
            policy: RoutePolicy::Singleton,
            router: default_router(),
            then: None,
        },
        RouteConfig {
            id: "settings".to_string(),
            flow: FlowKind::Settings,
            policy: RoutePolicy::Singleton,
            router: default_router(),
            then: Some("home".to_string()),
        },
    ]
}
